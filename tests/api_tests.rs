//! API integration tests.
//!
//! These run against a live server with a fresh-ish database:
//!     cargo run &
//!     cargo test -- --ignored

use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";
const HEADER_USER: &str = "X-Sharer-User-Id";

/// Create a user with a unique email and return its id
async fn create_user(client: &Client, name: &str) -> i64 {
    let email = format!(
        "{}-{}@example.com",
        name.to_lowercase(),
        Utc::now().timestamp_nanos_opt().unwrap()
    );
    let response = client
        .post(format!("{}/users", BASE_URL))
        .json(&json!({ "name": name, "email": email }))
        .send()
        .await
        .expect("Failed to create user");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse user");
    body["id"].as_i64().expect("No user id")
}

/// Create an item owned by `owner_id` and return its id
async fn create_item(client: &Client, owner_id: i64, name: &str, available: bool) -> i64 {
    let response = client
        .post(format!("{}/items", BASE_URL))
        .header(HEADER_USER, owner_id)
        .json(&json!({
            "name": name,
            "description": format!("{} for rent", name),
            "available": available
        }))
        .send()
        .await
        .expect("Failed to create item");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse item");
    body["id"].as_i64().expect("No item id")
}

/// Post a booking request and return the raw response
async fn post_booking(
    client: &Client,
    booker_id: i64,
    item_id: i64,
    start: chrono::DateTime<Utc>,
    end: chrono::DateTime<Utc>,
) -> reqwest::Response {
    client
        .post(format!("{}/bookings", BASE_URL))
        .header(HEADER_USER, booker_id)
        .json(&json!({ "itemId": item_id, "start": start, "end": end }))
        .send()
        .await
        .expect("Failed to send booking request")
}

async fn decide(
    client: &Client,
    actor_id: i64,
    booking_id: i64,
    approved: bool,
) -> reqwest::Response {
    client
        .patch(format!("{}/bookings/{}?approved={}", BASE_URL, booking_id, approved))
        .header(HEADER_USER, actor_id)
        .send()
        .await
        .expect("Failed to send decide request")
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
#[ignore]
async fn test_booking_lifecycle() {
    let client = Client::new();
    let owner = create_user(&client, "Owner").await;
    let booker = create_user(&client, "Booker").await;
    let item = create_item(&client, owner, "Drill", true).await;

    let start = Utc::now() + Duration::days(1);
    let end = start + Duration::days(1);

    let response = post_booking(&client, booker, item, start, end).await;
    assert_eq!(response.status(), 201);
    let booking: Value = response.json().await.unwrap();
    assert_eq!(booking["status"], "WAITING");
    assert_eq!(booking["item"]["id"].as_i64().unwrap(), item);
    assert_eq!(booking["booker"]["id"].as_i64().unwrap(), booker);
    let booking_id = booking["id"].as_i64().unwrap();

    // Booker cannot decide their own request
    let response = decide(&client, booker, booking_id, true).await;
    assert_eq!(response.status(), 403);

    // Owner approves
    let response = decide(&client, owner, booking_id, true).await;
    assert_eq!(response.status(), 200);
    let approved: Value = response.json().await.unwrap();
    assert_eq!(approved["status"], "APPROVED");

    // APPROVED is terminal for decide
    let response = decide(&client, owner, booking_id, false).await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_decide_already_started_booking_fails() {
    let client = Client::new();
    let owner = create_user(&client, "Owner").await;
    let booker = create_user(&client, "Booker").await;
    let item = create_item(&client, owner, "Trailer", true).await;

    // Admission only requires end > start, so an already-running window
    // is accepted as a request...
    let start = Utc::now() - Duration::hours(1);
    let end = Utc::now() + Duration::hours(1);
    let response = post_booking(&client, booker, item, start, end).await;
    assert_eq!(response.status(), 201);
    let booking: Value = response.json().await.unwrap();
    assert_eq!(booking["status"], "WAITING");
    let booking_id = booking["id"].as_i64().unwrap();

    // ...but once its start has passed it can no longer be decided,
    // in either direction.
    let response = decide(&client, owner, booking_id, true).await;
    assert_eq!(response.status(), 400);
    let response = decide(&client, owner, booking_id, false).await;
    assert_eq!(response.status(), 400);

    // And it stays WAITING
    let response = client
        .get(format!("{}/bookings/{}", BASE_URL, booking_id))
        .header(HEADER_USER, owner)
        .send()
        .await
        .unwrap();
    let booking: Value = response.json().await.unwrap();
    assert_eq!(booking["status"], "WAITING");
}

#[tokio::test]
#[ignore]
async fn test_overlapping_window_is_rejected() {
    let client = Client::new();
    let owner = create_user(&client, "Owner").await;
    let booker = create_user(&client, "Booker").await;
    let other = create_user(&client, "Other").await;
    let item = create_item(&client, owner, "Ladder", true).await;

    let start = Utc::now() + Duration::days(2);
    let end = start + Duration::days(2);

    let response = post_booking(&client, booker, item, start, end).await;
    let booking: Value = response.json().await.unwrap();
    let booking_id = booking["id"].as_i64().unwrap();
    let response = decide(&client, owner, booking_id, true).await;
    assert_eq!(response.status(), 200);

    // Window inside the approved one fails admission
    let response = post_booking(
        &client,
        other,
        item,
        start + Duration::hours(6),
        end - Duration::hours(6),
    )
    .await;
    assert_eq!(response.status(), 400);

    // Touching at the endpoint is allowed (half-open intervals)
    let response = post_booking(&client, other, item, end, end + Duration::days(1)).await;
    assert_eq!(response.status(), 201);
}

#[tokio::test]
#[ignore]
async fn test_admission_validation() {
    let client = Client::new();
    let owner = create_user(&client, "Owner").await;
    let booker = create_user(&client, "Booker").await;
    let unavailable = create_item(&client, owner, "Broken Saw", false).await;
    let item = create_item(&client, owner, "Saw", true).await;

    let start = Utc::now() + Duration::days(1);
    let end = start + Duration::days(1);

    // Unavailable item
    let response = post_booking(&client, booker, unavailable, start, end).await;
    assert_eq!(response.status(), 400);

    // Owner booking own item is disguised as not-found
    let response = post_booking(&client, owner, item, start, end).await;
    assert_eq!(response.status(), 404);

    // end must be strictly after start
    let response = post_booking(&client, booker, item, start, start).await;
    assert_eq!(response.status(), 400);

    // Unknown user
    let response = post_booking(&client, 999_999_999, item, start, end).await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_third_party_booking_access_looks_missing() {
    let client = Client::new();
    let owner = create_user(&client, "Owner").await;
    let booker = create_user(&client, "Booker").await;
    let stranger = create_user(&client, "Stranger").await;
    let item = create_item(&client, owner, "Tent", true).await;

    let start = Utc::now() + Duration::days(1);
    let response = post_booking(&client, booker, item, start, start + Duration::days(1)).await;
    let booking: Value = response.json().await.unwrap();
    let booking_id = booking["id"].as_i64().unwrap();

    for user in [booker, owner] {
        let response = client
            .get(format!("{}/bookings/{}", BASE_URL, booking_id))
            .header(HEADER_USER, user)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    let response = client
        .get(format!("{}/bookings/{}", BASE_URL, booking_id))
        .header(HEADER_USER, stranger)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_state_filters_and_ordering() {
    let client = Client::new();
    let owner = create_user(&client, "Owner").await;
    let booker = create_user(&client, "Booker").await;
    let item = create_item(&client, owner, "Canoe", true).await;

    let now = Utc::now();
    let first = post_booking(
        &client,
        booker,
        item,
        now + Duration::days(1),
        now + Duration::days(2),
    )
    .await;
    let first: Value = first.json().await.unwrap();
    let second = post_booking(
        &client,
        booker,
        item,
        now + Duration::days(3),
        now + Duration::days(4),
    )
    .await;
    let second: Value = second.json().await.unwrap();

    let response = client
        .get(format!("{}/bookings?state=FUTURE", BASE_URL))
        .header(HEADER_USER, booker)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let bookings: Vec<Value> = response.json().await.unwrap();
    assert_eq!(bookings.len(), 2);
    // Newest start first
    assert_eq!(bookings[0]["id"], second["id"]);
    assert_eq!(bookings[1]["id"], first["id"]);

    // Case-insensitive filter, seen from the owner's side
    let response = client
        .get(format!("{}/bookings/owner?state=waiting", BASE_URL))
        .header(HEADER_USER, owner)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let bookings: Vec<Value> = response.json().await.unwrap();
    assert_eq!(bookings.len(), 2);

    // Unknown filter fails before any lookup
    let response = client
        .get(format!("{}/bookings?state=SOMETIME", BASE_URL))
        .header(HEADER_USER, booker)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_owner_item_view_has_usage_summary() {
    let client = Client::new();
    let owner = create_user(&client, "Owner").await;
    let booker = create_user(&client, "Booker").await;
    let item = create_item(&client, owner, "Projector", true).await;

    let start = Utc::now() + Duration::days(1);
    let response = post_booking(&client, booker, item, start, start + Duration::days(1)).await;
    let booking: Value = response.json().await.unwrap();
    let booking_id = booking["id"].as_i64().unwrap();
    decide(&client, owner, booking_id, true).await;

    // Owner sees the approved booking as "next"
    let response = client
        .get(format!("{}/items/{}", BASE_URL, item))
        .header(HEADER_USER, owner)
        .send()
        .await
        .unwrap();
    let details: Value = response.json().await.unwrap();
    assert_eq!(details["nextBooking"]["id"].as_i64().unwrap(), booking_id);
    assert!(details["lastBooking"].is_null());

    // A non-owner does not see the summary
    let response = client
        .get(format!("{}/items/{}", BASE_URL, item))
        .header(HEADER_USER, booker)
        .send()
        .await
        .unwrap();
    let details: Value = response.json().await.unwrap();
    assert!(details["nextBooking"].is_null());
    assert!(details["lastBooking"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_comment_requires_completed_booking() {
    let client = Client::new();
    let owner = create_user(&client, "Owner").await;
    let booker = create_user(&client, "Booker").await;
    let item = create_item(&client, owner, "Bike", true).await;

    // No booking at all: rejected
    let response = client
        .post(format!("{}/items/{}/comment", BASE_URL, item))
        .header(HEADER_USER, booker)
        .json(&json!({ "text": "Great bike!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_search_skips_unavailable_items() {
    let client = Client::new();
    let owner = create_user(&client, "Owner").await;
    let tag = format!("zathura-{}", Utc::now().timestamp_nanos_opt().unwrap());
    create_item(&client, owner, &format!("Visible {}", tag), true).await;
    create_item(&client, owner, &format!("Hidden {}", tag), false).await;

    let response = client
        .get(format!("{}/items/search?text={}", BASE_URL, tag))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let items: Vec<Value> = response.json().await.unwrap();
    assert_eq!(items.len(), 1);
    assert!(items[0]["name"].as_str().unwrap().starts_with("Visible"));
}

#[tokio::test]
#[ignore]
async fn test_duplicate_email_conflicts() {
    let client = Client::new();
    let email = format!("dup-{}@example.com", Utc::now().timestamp_nanos_opt().unwrap());

    let response = client
        .post(format!("{}/users", BASE_URL))
        .json(&json!({ "name": "First", "email": email }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/users", BASE_URL))
        .json(&json!({ "name": "Second", "email": email.to_uppercase() }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_update_own_email_casing() {
    let client = Client::new();
    let user = create_user(&client, "Caser").await;

    let response = client
        .get(format!("{}/users/{}", BASE_URL, user))
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    let email = body["email"].as_str().unwrap().to_uppercase();

    // Re-casing one's own address is not a duplicate
    let response = client
        .patch(format!("{}/users/{}", BASE_URL, user))
        .json(&json!({ "email": email }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["email"].as_str().unwrap(), email);
}
