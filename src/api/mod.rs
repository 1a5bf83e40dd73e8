//! API handlers for ShareHub REST endpoints

pub mod bookings;
pub mod health;
pub mod items;
pub mod openapi;
pub mod users;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};

use crate::{error::AppError, AppState};

/// Header carrying the caller's user id. The boundary trusts it as-is;
/// identity verification is out of scope.
pub const HEADER_USER: &str = "X-Sharer-User-Id";

/// Extractor for the caller identity header
pub struct SharerUserId(pub i64);

#[async_trait]
impl FromRequestParts<AppState> for SharerUserId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &AppState) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(HEADER_USER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::BadRequest(format!("Missing {} header", HEADER_USER)))?;

        let user_id = value
            .parse::<i64>()
            .map_err(|_| AppError::BadRequest(format!("Invalid {} header", HEADER_USER)))?;

        Ok(SharerUserId(user_id))
    }
}
