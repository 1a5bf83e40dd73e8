//! User directory service

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, UpdateUser, User},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, user_id: i64) -> AppResult<User> {
        self.repository.users.get_by_id(user_id).await
    }

    /// List all users
    pub async fn list(&self) -> AppResult<Vec<User>> {
        self.repository.users.list().await
    }

    /// Create a new user; email must be unique, case-insensitively
    pub async fn create(&self, dto: CreateUser) -> AppResult<User> {
        if let Some(existing) = self.repository.users.find_by_email(&dto.email).await? {
            return Err(AppError::Conflict(format!(
                "Email already exists: {}",
                existing.email
            )));
        }
        self.repository.users.create(&dto.name, &dto.email).await
    }

    /// Partially update a user
    pub async fn update(&self, user_id: i64, dto: UpdateUser) -> AppResult<User> {
        let mut user = self.repository.users.get_by_id(user_id).await?;

        if let Some(email) = dto.email {
            // Uniqueness only matters against other users; a casing change of
            // the caller's own address must still go through.
            if !email.eq_ignore_ascii_case(&user.email)
                && self.repository.users.find_by_email(&email).await?.is_some()
            {
                return Err(AppError::Conflict(format!("Email already exists: {}", email)));
            }
            user.email = email;
        }
        if let Some(name) = dto.name {
            user.name = name;
        }

        self.repository
            .users
            .update(user.id, &user.name, &user.email)
            .await
    }

    /// Delete a user
    pub async fn delete(&self, user_id: i64) -> AppResult<()> {
        self.repository.users.delete(user_id).await
    }
}
