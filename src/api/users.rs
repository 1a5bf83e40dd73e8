//! User management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, UpdateUser, User},
};

/// List all users
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    responses(
        (status = 200, description = "All users", body = Vec<User>)
    )
)]
pub async fn list_users(State(state): State<crate::AppState>) -> AppResult<Json<Vec<User>>> {
    let users = state.services.users.list().await?;
    Ok(Json(users))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<crate::AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<User>> {
    let user = state.services.users.get_by_id(user_id).await?;
    Ok(Json(user))
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Email already exists")
    )
)]
pub async fn create_user(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    request
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let user = state.services.users.create(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Partially update a user
#[utoipa::path(
    patch,
    path = "/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User ID")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already exists")
    )
)]
pub async fn update_user(
    State(state): State<crate::AppState>,
    Path(user_id): Path<i64>,
    Json(request): Json<UpdateUser>,
) -> AppResult<Json<User>> {
    request
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let user = state.services.users.update(user_id, request).await?;
    Ok(Json(user))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted")
    )
)]
pub async fn delete_user(
    State(state): State<crate::AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<StatusCode> {
    state.services.users.delete(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
