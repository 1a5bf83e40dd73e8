//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{bookings, health, items, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ShareHub API",
        version = "0.1.0",
        description = "Peer-to-peer item sharing REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        // Items
        items::list_items,
        items::get_item,
        items::create_item,
        items::update_item,
        items::search_items,
        items::add_comment,
        // Bookings
        bookings::create_booking,
        bookings::decide_booking,
        bookings::get_booking,
        bookings::list_bookings,
        bookings::list_owner_bookings,
    ),
    components(
        schemas(
            // Users
            crate::models::user::User,
            crate::models::user::UserShort,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            // Items
            crate::models::item::Item,
            crate::models::item::ItemShort,
            crate::models::item::ItemDetails,
            crate::models::item::CreateItem,
            crate::models::item::UpdateItem,
            // Comments
            crate::models::comment::CommentDetails,
            crate::models::comment::CreateComment,
            // Bookings
            crate::models::booking::BookingStatus,
            crate::models::booking::BookingShort,
            crate::models::booking::BookingDetails,
            crate::models::booking::CreateBooking,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "User directory"),
        (name = "items", description = "Item catalog and comments"),
        (name = "bookings", description = "Booking lifecycle")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
