//! Booking lifecycle service: admission, owner decision, access-checked
//! lookup and state-filtered history.

use crate::{
    clock::Clock,
    error::{AppError, AppResult},
    models::{
        booking::{Booking, BookingDetails, BookingState, CreateBooking},
        item::ItemShort,
        user::UserShort,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct BookingsService {
    repository: Repository,
    clock: Clock,
}

impl BookingsService {
    pub fn new(repository: Repository, clock: Clock) -> Self {
        Self { repository, clock }
    }

    /// Admit a new booking request.
    ///
    /// Validation is fail-fast, first violation wins: requester exists, item
    /// exists, item available, requester is not the owner, end after start,
    /// no approved overlap. The overlap check and the insert run in one
    /// transaction in the repository.
    pub async fn create(&self, user_id: i64, dto: CreateBooking) -> AppResult<BookingDetails> {
        let booker = self.repository.users.get_by_id(user_id).await?;
        let item = self.repository.items.get_by_id(dto.item_id).await?;

        if !item.available {
            return Err(AppError::Validation("Item is not available".to_string()));
        }
        // Disguised as not-found on purpose: the error shape must not reveal
        // to a requester that the item is their own listing.
        if item.owner_id == user_id {
            return Err(AppError::NotFound(format!(
                "Item with id {} not found",
                item.id
            )));
        }
        if dto.end <= dto.start {
            return Err(AppError::Validation(
                "Invalid booking time: end must be after start".to_string(),
            ));
        }

        let booking = self
            .repository
            .bookings
            .create(user_id, item.id, dto.start, dto.end)
            .await?;

        Ok(BookingDetails {
            id: booking.id,
            start: booking.start_date,
            end: booking.end_date,
            status: booking.status,
            item: ItemShort {
                id: item.id,
                name: item.name,
            },
            booker: UserShort {
                id: booker.id,
                name: booker.name,
            },
        })
    }

    /// Approve or reject a WAITING booking as the item owner
    pub async fn decide(
        &self,
        user_id: i64,
        booking_id: i64,
        approved: bool,
    ) -> AppResult<BookingDetails> {
        let now = self.clock.now();
        let booking = self
            .repository
            .bookings
            .decide(user_id, booking_id, approved, now)
            .await?;
        self.details(booking).await
    }

    /// Get a booking visible to its booker or the item owner. Anyone else
    /// gets the same not-found as a missing id.
    pub async fn get_by_id(&self, user_id: i64, booking_id: i64) -> AppResult<BookingDetails> {
        let booking = self.repository.bookings.get_by_id(booking_id).await?;
        let item = self.repository.items.get_by_id(booking.item_id).await?;

        if booking.booker_id != user_id && item.owner_id != user_id {
            return Err(AppError::NotFound(format!(
                "Booking with id {} not found",
                booking_id
            )));
        }

        self.details(booking).await
    }

    /// Bookings made by the user, filtered by state, newest first
    pub async fn list_for_booker(
        &self,
        user_id: i64,
        state: BookingState,
    ) -> AppResult<Vec<BookingDetails>> {
        self.repository.users.ensure_exists(user_id).await?;
        let now = self.clock.now();
        self.repository
            .bookings
            .list_for_booker(user_id, state, now)
            .await
    }

    /// Bookings on the user's items, filtered by state, newest first
    pub async fn list_for_owner(
        &self,
        user_id: i64,
        state: BookingState,
    ) -> AppResult<Vec<BookingDetails>> {
        self.repository.users.ensure_exists(user_id).await?;
        let now = self.clock.now();
        self.repository
            .bookings
            .list_for_owner(user_id, state, now)
            .await
    }

    async fn details(&self, booking: Booking) -> AppResult<BookingDetails> {
        let item = self.repository.items.get_by_id(booking.item_id).await?;
        let booker = self.repository.users.get_short(booking.booker_id).await?;
        Ok(BookingDetails {
            id: booking.id,
            start: booking.start_date,
            end: booking.end_date,
            status: booking.status,
            item: ItemShort {
                id: item.id,
                name: item.name,
            },
            booker,
        })
    }
}
