//! Booking lifecycle endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::AppResult,
    models::booking::{BookingDetails, BookingState, CreateBooking},
};

use super::SharerUserId;

#[derive(Deserialize, IntoParams)]
pub struct DecideParams {
    /// true approves the booking, false rejects it
    pub approved: bool,
}

#[derive(Deserialize, IntoParams)]
pub struct ListParams {
    /// State filter: ALL (default), CURRENT, PAST, FUTURE, WAITING, REJECTED
    pub state: Option<String>,
}

/// Request a booking on an item
#[utoipa::path(
    post,
    path = "/bookings",
    tag = "bookings",
    request_body = CreateBooking,
    responses(
        (status = 201, description = "Booking created in WAITING status", body = BookingDetails),
        (status = 400, description = "Item unavailable, bad interval or overlapping window"),
        (status = 404, description = "User or item not found")
    )
)]
pub async fn create_booking(
    State(state): State<crate::AppState>,
    SharerUserId(user_id): SharerUserId,
    Json(request): Json<CreateBooking>,
) -> AppResult<(StatusCode, Json<BookingDetails>)> {
    let booking = state.services.bookings.create(user_id, request).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// Approve or reject a waiting booking (item owner only)
#[utoipa::path(
    patch,
    path = "/bookings/{id}",
    tag = "bookings",
    params(
        ("id" = i64, Path, description = "Booking ID"),
        DecideParams
    ),
    responses(
        (status = 200, description = "Booking decided", body = BookingDetails),
        (status = 400, description = "Already decided or already started"),
        (status = 403, description = "Caller is not the item owner"),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn decide_booking(
    State(state): State<crate::AppState>,
    SharerUserId(user_id): SharerUserId,
    Path(booking_id): Path<i64>,
    Query(params): Query<DecideParams>,
) -> AppResult<Json<BookingDetails>> {
    let booking = state
        .services
        .bookings
        .decide(user_id, booking_id, params.approved)
        .await?;
    Ok(Json(booking))
}

/// Get a booking; visible to its booker and the item owner only
#[utoipa::path(
    get,
    path = "/bookings/{id}",
    tag = "bookings",
    params(("id" = i64, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking", body = BookingDetails),
        (status = 404, description = "Booking not found or caller is a third party")
    )
)]
pub async fn get_booking(
    State(state): State<crate::AppState>,
    SharerUserId(user_id): SharerUserId,
    Path(booking_id): Path<i64>,
) -> AppResult<Json<BookingDetails>> {
    let booking = state.services.bookings.get_by_id(user_id, booking_id).await?;
    Ok(Json(booking))
}

/// List the caller's bookings as borrower, newest first
#[utoipa::path(
    get,
    path = "/bookings",
    tag = "bookings",
    params(ListParams),
    responses(
        (status = 200, description = "Bookings made by the caller", body = Vec<BookingDetails>),
        (status = 400, description = "Unknown state filter"),
        (status = 404, description = "User not found")
    )
)]
pub async fn list_bookings(
    State(state): State<crate::AppState>,
    SharerUserId(user_id): SharerUserId,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Vec<BookingDetails>>> {
    // Parse the filter before any storage access
    let filter = BookingState::parse(params.state.as_deref())?;
    let bookings = state.services.bookings.list_for_booker(user_id, filter).await?;
    Ok(Json(bookings))
}

/// List bookings on the caller's items, newest first
#[utoipa::path(
    get,
    path = "/bookings/owner",
    tag = "bookings",
    params(ListParams),
    responses(
        (status = 200, description = "Bookings on the caller's items", body = Vec<BookingDetails>),
        (status = 400, description = "Unknown state filter"),
        (status = 404, description = "User not found")
    )
)]
pub async fn list_owner_bookings(
    State(state): State<crate::AppState>,
    SharerUserId(user_id): SharerUserId,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Vec<BookingDetails>>> {
    let filter = BookingState::parse(params.state.as_deref())?;
    let bookings = state.services.bookings.list_for_owner(user_id, filter).await?;
    Ok(Json(bookings))
}
