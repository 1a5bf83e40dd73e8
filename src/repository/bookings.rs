//! Bookings repository for database operations.
//!
//! Admission and decision are each one transaction: the item row is locked
//! (`FOR UPDATE`) so the overlap check and the write it guards see a
//! consistent snapshot, and the `bookings_no_approved_overlap` exclusion
//! constraint (see migrations) rejects the losing side of two concurrent
//! approvals at the database level.

use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        booking::{overlaps, Booking, BookingDetails, BookingState, BookingStatus},
        item::ItemShort,
        user::UserShort,
    },
};

#[derive(Clone)]
pub struct BookingsRepository {
    pool: Pool<Postgres>,
}

const SELECT_BOOKING: &str =
    "SELECT id, start_date, end_date, item_id, booker_id, status FROM bookings WHERE id = $1";

const SELECT_DETAILS: &str = r#"
    SELECT b.id, b.start_date, b.end_date, b.status, b.booker_id,
           i.id AS item_id, i.name AS item_name, u.name AS booker_name
    FROM bookings b
    JOIN items i ON b.item_id = i.id
    JOIN users u ON b.booker_id = u.id
"#;

impl BookingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get booking by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Booking> {
        sqlx::query_as::<_, Booking>(SELECT_BOOKING)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking with id {} not found", id)))
    }

    /// Admit a new booking request in WAITING status.
    ///
    /// The item row is locked for the duration of the transaction, then the
    /// proposed window is checked against APPROVED bookings on the item with
    /// half-open semantics (touching endpoints do not conflict). Caller has
    /// already validated requester, item availability, ownership and window.
    pub async fn create(
        &self,
        booker_id: i64,
        item_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Booking> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT id FROM items WHERE id = $1 FOR UPDATE")
            .bind(item_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Item with id {} not found", item_id)))?;

        let approved = sqlx::query_as::<_, Booking>(
            r#"
            SELECT id, start_date, end_date, item_id, booker_id, status
            FROM bookings WHERE item_id = $1 AND status = 'APPROVED'
            "#,
        )
        .bind(item_id)
        .fetch_all(&mut *tx)
        .await?;

        if approved
            .iter()
            .any(|b| overlaps(start, end, b.start_date, b.end_date))
        {
            return Err(AppError::Validation(
                "Booking time overlaps with an existing approved booking".to_string(),
            ));
        }

        let booking = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (start_date, end_date, item_id, booker_id, status)
            VALUES ($1, $2, $3, $4, 'WAITING')
            RETURNING id, start_date, end_date, item_id, booker_id, status
            "#,
        )
        .bind(start)
        .bind(end)
        .bind(item_id)
        .bind(booker_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(booking)
    }

    /// Decide a WAITING booking: approve or reject.
    ///
    /// Only the item owner may decide, only while the booking is WAITING,
    /// and only before its start. The booking row is locked so two decisions
    /// cannot interleave; if an approval would overlap another APPROVED
    /// booking admitted in between, the exclusion constraint fires.
    pub async fn decide(
        &self,
        actor_id: i64,
        booking_id: i64,
        approved: bool,
        now: DateTime<Utc>,
    ) -> AppResult<Booking> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            SELECT b.id, b.start_date, b.status, i.owner_id
            FROM bookings b
            JOIN items i ON b.item_id = i.id
            WHERE b.id = $1
            FOR UPDATE OF b
            "#,
        )
        .bind(booking_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Booking with id {} not found", booking_id)))?;

        let owner_id: i64 = row.get("owner_id");
        if owner_id != actor_id {
            return Err(AppError::Authorization(
                "Only the item owner can approve or reject a booking".to_string(),
            ));
        }

        let status: BookingStatus = row.get("status");
        if status != BookingStatus::Waiting {
            return Err(AppError::Validation(
                "Booking status already decided".to_string(),
            ));
        }

        let start: DateTime<Utc> = row.get("start_date");
        if start <= now {
            return Err(AppError::Validation(
                "Cannot approve or reject a booking that already started".to_string(),
            ));
        }

        let new_status = if approved {
            BookingStatus::Approved
        } else {
            BookingStatus::Rejected
        };

        let booking = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings SET status = $1 WHERE id = $2
            RETURNING id, start_date, end_date, item_id, booker_id, status
            "#,
        )
        .bind(new_status)
        .bind(booking_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_exclusion_overlap)?;

        tx.commit().await?;
        Ok(booking)
    }

    /// List a borrower's bookings matching a state filter, newest first
    pub async fn list_for_booker(
        &self,
        booker_id: i64,
        state: BookingState,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<BookingDetails>> {
        let rows = sqlx::query(&format!(
            "{} WHERE b.booker_id = $1 ORDER BY b.start_date DESC",
            SELECT_DETAILS
        ))
        .bind(booker_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(filter_details(rows, state, now))
    }

    /// List bookings on a user's items matching a state filter, newest first
    pub async fn list_for_owner(
        &self,
        owner_id: i64,
        state: BookingState,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<BookingDetails>> {
        let rows = sqlx::query(&format!(
            "{} WHERE i.owner_id = $1 ORDER BY b.start_date DESC",
            SELECT_DETAILS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(filter_details(rows, state, now))
    }

    /// Approved bookings on a single item, for the usage projection
    pub async fn list_approved_for_item(&self, item_id: i64) -> AppResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT id, start_date, end_date, item_id, booker_id, status
            FROM bookings WHERE item_id = $1 AND status = 'APPROVED'
            "#,
        )
        .bind(item_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(bookings)
    }

    /// Approved bookings across a set of items, for the owner item listing
    pub async fn list_approved_for_items(&self, item_ids: &[i64]) -> AppResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT id, start_date, end_date, item_id, booker_id, status
            FROM bookings WHERE item_id = ANY($1) AND status = 'APPROVED'
            "#,
        )
        .bind(item_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(bookings)
    }

    /// Whether the user has a completed (approved, already ended) booking on
    /// the item. Gates comment posting.
    pub async fn has_completed_booking(
        &self,
        booker_id: i64,
        item_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM bookings
                WHERE booker_id = $1 AND item_id = $2
                  AND status = 'APPROVED' AND end_date < $3
            )
            "#,
        )
        .bind(booker_id)
        .bind(item_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}

/// Classification happens here, in one exhaustive match per row, so a new
/// state variant is a compile-time-checked change.
fn filter_details(rows: Vec<PgRow>, state: BookingState, now: DateTime<Utc>) -> Vec<BookingDetails> {
    rows.into_iter()
        .filter_map(|row| {
            let details = details_from_row(&row);
            state
                .matches(details.status, details.start, details.end, now)
                .then_some(details)
        })
        .collect()
}

fn details_from_row(row: &PgRow) -> BookingDetails {
    BookingDetails {
        id: row.get("id"),
        start: row.get("start_date"),
        end: row.get("end_date"),
        status: row.get("status"),
        item: ItemShort {
            id: row.get("item_id"),
            name: row.get("item_name"),
        },
        booker: UserShort {
            id: row.get("booker_id"),
            name: row.get("booker_name"),
        },
    }
}

/// SQLSTATE 23P01: the APPROVED-overlap exclusion constraint rejected the
/// write. Surfaces as the same validation failure as the in-transaction
/// check, so callers see one error shape for overlap.
fn map_exclusion_overlap(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23P01") => {
            AppError::Validation(
                "Booking time overlaps with an existing approved booking".to_string(),
            )
        }
        _ => AppError::Database(err),
    }
}
