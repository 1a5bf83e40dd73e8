//! Business logic services

pub mod bookings;
pub mod items;
pub mod users;

use crate::{clock::Clock, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub items: items::ItemsService,
    pub bookings: bookings::BookingsService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository and clock
    pub fn new(repository: Repository, clock: Clock) -> Self {
        Self {
            users: users::UsersService::new(repository.clone()),
            items: items::ItemsService::new(repository.clone(), clock.clone()),
            bookings: bookings::BookingsService::new(repository.clone(), clock),
            repository,
        }
    }

    /// Round-trip to the database, for the readiness probe
    pub async fn ping_database(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.repository.pool)
            .await?;
        Ok(())
    }
}
