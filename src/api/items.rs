//! Item catalog endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        comment::{CommentDetails, CreateComment},
        item::{CreateItem, Item, ItemDetails, UpdateItem},
    },
};

use super::SharerUserId;

#[derive(Deserialize, IntoParams)]
pub struct SearchParams {
    /// Free text matched against item name and description
    pub text: String,
}

/// List the caller's items with comments and usage summaries
#[utoipa::path(
    get,
    path = "/items",
    tag = "items",
    responses(
        (status = 200, description = "Caller's items", body = Vec<ItemDetails>),
        (status = 404, description = "User not found")
    )
)]
pub async fn list_items(
    State(state): State<crate::AppState>,
    SharerUserId(user_id): SharerUserId,
) -> AppResult<Json<Vec<ItemDetails>>> {
    let items = state.services.items.list_owner_items(user_id).await?;
    Ok(Json(items))
}

/// Get an item with comments; owners also see last/next bookings
#[utoipa::path(
    get,
    path = "/items/{id}",
    tag = "items",
    params(("id" = i64, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Item details", body = ItemDetails),
        (status = 404, description = "User or item not found")
    )
)]
pub async fn get_item(
    State(state): State<crate::AppState>,
    SharerUserId(user_id): SharerUserId,
    Path(item_id): Path<i64>,
) -> AppResult<Json<ItemDetails>> {
    let item = state.services.items.get_details(user_id, item_id).await?;
    Ok(Json(item))
}

/// List a new item
#[utoipa::path(
    post,
    path = "/items",
    tag = "items",
    request_body = CreateItem,
    responses(
        (status = 201, description = "Item created", body = Item),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "User not found")
    )
)]
pub async fn create_item(
    State(state): State<crate::AppState>,
    SharerUserId(user_id): SharerUserId,
    Json(request): Json<CreateItem>,
) -> AppResult<(StatusCode, Json<Item>)> {
    request
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let item = state.services.items.create(user_id, request).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Partially update an item (owner only)
#[utoipa::path(
    patch,
    path = "/items/{id}",
    tag = "items",
    params(("id" = i64, Path, description = "Item ID")),
    request_body = UpdateItem,
    responses(
        (status = 200, description = "Item updated", body = Item),
        (status = 403, description = "Caller is not the owner"),
        (status = 404, description = "Item not found")
    )
)]
pub async fn update_item(
    State(state): State<crate::AppState>,
    SharerUserId(user_id): SharerUserId,
    Path(item_id): Path<i64>,
    Json(request): Json<UpdateItem>,
) -> AppResult<Json<Item>> {
    let item = state.services.items.update(user_id, item_id, request).await?;
    Ok(Json(item))
}

/// Search available items by free text
#[utoipa::path(
    get,
    path = "/items/search",
    tag = "items",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching available items", body = Vec<Item>)
    )
)]
pub async fn search_items(
    State(state): State<crate::AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<Item>>> {
    let items = state.services.items.search(&params.text).await?;
    Ok(Json(items))
}

/// Comment on an item after a completed rental
#[utoipa::path(
    post,
    path = "/items/{id}/comment",
    tag = "items",
    params(("id" = i64, Path, description = "Item ID")),
    request_body = CreateComment,
    responses(
        (status = 200, description = "Comment created", body = CommentDetails),
        (status = 400, description = "No completed booking on this item"),
        (status = 404, description = "User or item not found")
    )
)]
pub async fn add_comment(
    State(state): State<crate::AppState>,
    SharerUserId(user_id): SharerUserId,
    Path(item_id): Path<i64>,
    Json(request): Json<CreateComment>,
) -> AppResult<Json<CommentDetails>> {
    request
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let comment = state
        .services
        .items
        .add_comment(user_id, item_id, request)
        .await?;
    Ok(Json(comment))
}
