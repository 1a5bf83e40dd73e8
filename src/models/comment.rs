//! Comment model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Comment with author name for display
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentDetails {
    pub id: i64,
    pub text: String,
    pub author_name: String,
    pub created: DateTime<Utc>,
}

/// Create comment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateComment {
    #[validate(length(min = 1, max = 1024))]
    pub text: String,
}
