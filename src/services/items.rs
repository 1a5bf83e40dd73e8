//! Item catalog service: CRUD, search, owner views with usage summaries,
//! and post-rental comments.

use std::collections::HashMap;

use crate::{
    clock::Clock,
    error::{AppError, AppResult},
    models::{
        booking::{project_usage, Booking},
        comment::{CommentDetails, CreateComment},
        item::{CreateItem, Item, ItemDetails, UpdateItem},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct ItemsService {
    repository: Repository,
    clock: Clock,
}

impl ItemsService {
    pub fn new(repository: Repository, clock: Clock) -> Self {
        Self { repository, clock }
    }

    /// List a new item owned by the caller
    pub async fn create(&self, user_id: i64, dto: CreateItem) -> AppResult<Item> {
        self.repository.users.ensure_exists(user_id).await?;
        self.repository
            .items
            .create(user_id, &dto.name, &dto.description, dto.available)
            .await
    }

    /// Partially update an item; only the owner may change it
    pub async fn update(&self, user_id: i64, item_id: i64, dto: UpdateItem) -> AppResult<Item> {
        let mut item = self.repository.items.get_by_id(item_id).await?;

        if item.owner_id != user_id {
            return Err(AppError::Authorization(
                "User is not owner of this item".to_string(),
            ));
        }

        if let Some(name) = dto.name {
            item.name = name;
        }
        if let Some(description) = dto.description {
            item.description = description;
        }
        if let Some(available) = dto.available {
            item.available = available;
        }

        self.repository
            .items
            .update(item.id, &item.name, &item.description, item.available)
            .await
    }

    /// Item view with comments; the owner additionally sees the last/next
    /// approved-booking usage summary, recomputed against a fresh "now".
    pub async fn get_details(&self, user_id: i64, item_id: i64) -> AppResult<ItemDetails> {
        self.repository.users.ensure_exists(user_id).await?;
        let item = self.repository.items.get_by_id(item_id).await?;
        let comments = self.repository.comments.list_for_item(item_id).await?;

        let (last_booking, next_booking) = if item.owner_id == user_id {
            let bookings = self.repository.bookings.list_approved_for_item(item_id).await?;
            project_usage(&bookings, self.clock.now())
        } else {
            (None, None)
        };

        Ok(ItemDetails {
            id: item.id,
            name: item.name,
            description: item.description,
            available: item.available,
            last_booking,
            next_booking,
            comments,
        })
    }

    /// The caller's own items, each with comments and usage summary
    pub async fn list_owner_items(&self, user_id: i64) -> AppResult<Vec<ItemDetails>> {
        self.repository.users.ensure_exists(user_id).await?;

        let items = self.repository.items.list_by_owner(user_id).await?;
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let item_ids: Vec<i64> = items.iter().map(|i| i.id).collect();

        let mut comments_by_item: HashMap<i64, Vec<CommentDetails>> = HashMap::new();
        for (item_id, comment) in self.repository.comments.list_for_items(&item_ids).await? {
            comments_by_item.entry(item_id).or_default().push(comment);
        }

        let mut bookings_by_item: HashMap<i64, Vec<Booking>> = HashMap::new();
        for booking in self
            .repository
            .bookings
            .list_approved_for_items(&item_ids)
            .await?
        {
            bookings_by_item.entry(booking.item_id).or_default().push(booking);
        }

        let now = self.clock.now();

        Ok(items
            .into_iter()
            .map(|item| {
                let bookings = bookings_by_item.remove(&item.id).unwrap_or_default();
                let (last_booking, next_booking) = project_usage(&bookings, now);
                ItemDetails {
                    id: item.id,
                    name: item.name,
                    description: item.description,
                    available: item.available,
                    last_booking,
                    next_booking,
                    comments: comments_by_item.remove(&item.id).unwrap_or_default(),
                }
            })
            .collect())
    }

    /// Search available items by free text; blank text short-circuits to an
    /// empty list without touching storage
    pub async fn search(&self, text: &str) -> AppResult<Vec<Item>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        self.repository.items.search(text).await
    }

    /// Leave a comment on an item after a completed rental
    pub async fn add_comment(
        &self,
        user_id: i64,
        item_id: i64,
        dto: CreateComment,
    ) -> AppResult<CommentDetails> {
        self.repository.users.ensure_exists(user_id).await?;
        let item = self.repository.items.get_by_id(item_id).await?;

        let now = self.clock.now();
        let can_comment = self
            .repository
            .bookings
            .has_completed_booking(user_id, item.id, now)
            .await?;
        if !can_comment {
            return Err(AppError::Validation(
                "User has not completed a booking for this item".to_string(),
            ));
        }

        self.repository
            .comments
            .create(item.id, user_id, &dto.text, now)
            .await
    }
}
