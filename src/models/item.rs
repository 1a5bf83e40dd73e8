//! Item (shared catalog entry) model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::booking::BookingShort;
use super::comment::CommentDetails;

/// Item model from database.
///
/// `available` is the owner-controlled listing flag; an unavailable item
/// rejects new booking requests but keeps its booking history.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub owner_id: i64,
}

/// Short item reference embedded in booking representations
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ItemShort {
    pub id: i64,
    pub name: String,
}

/// Item view with comments and, for the owning user only, the
/// last/next approved-booking usage summary.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemDetails {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub last_booking: Option<BookingShort>,
    pub next_booking: Option<BookingShort>,
    pub comments: Vec<CommentDetails>,
}

/// Create item request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateItem {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub description: String,
    pub available: bool,
}

/// Partial item update; absent fields are left unchanged
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateItem {
    pub name: Option<String>,
    pub description: Option<String>,
    pub available: Option<bool>,
}
