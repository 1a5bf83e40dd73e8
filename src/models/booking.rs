//! Booking model and the pure parts of the booking core: the half-open
//! interval overlap predicate, the query-time state classification, and the
//! last/next usage projection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::models::item::ItemShort;
use crate::models::user::UserShort;

/// Booking lifecycle status.
///
/// A booking is created WAITING and leaves it only through an owner decision
/// (approve/reject). APPROVED and REJECTED are terminal for the decide
/// action. CANCELED is reserved for borrower-initiated cancellation, which
/// has no endpoint yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "booking_status", rename_all = "UPPERCASE")]
pub enum BookingStatus {
    Waiting,
    Approved,
    Rejected,
    Canceled,
}

/// Booking model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub item_id: i64,
    pub booker_id: i64,
    pub status: BookingStatus,
}

/// Short booking reference used in item usage summaries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingShort {
    pub id: i64,
    pub booker_id: i64,
}

/// Full booking representation with item and booker summaries
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookingDetails {
    pub id: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: BookingStatus,
    pub item: ItemShort,
    pub booker: UserShort,
}

/// Create booking request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBooking {
    pub item_id: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Query-time temporal/status filter for booking lists.
///
/// Evaluated against "now" at query time; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingState {
    All,
    Current,
    Past,
    Future,
    Waiting,
    Rejected,
}

impl BookingState {
    /// Parse a state filter from a query parameter, case-insensitively.
    /// A missing parameter defaults to ALL; an unknown value is a
    /// request-level validation failure, raised before any storage access.
    pub fn parse(value: Option<&str>) -> AppResult<Self> {
        let Some(value) = value else {
            return Ok(BookingState::All);
        };
        match value.to_ascii_uppercase().as_str() {
            "ALL" => Ok(BookingState::All),
            "CURRENT" => Ok(BookingState::Current),
            "PAST" => Ok(BookingState::Past),
            "FUTURE" => Ok(BookingState::Future),
            "WAITING" => Ok(BookingState::Waiting),
            "REJECTED" => Ok(BookingState::Rejected),
            _ => Err(AppError::Validation(format!("Unknown state: {}", value))),
        }
    }

    /// Whether a booking with the given status and window falls under this
    /// classification at `now`. CURRENT is inclusive on both endpoints.
    pub fn matches(
        &self,
        status: BookingStatus,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> bool {
        match self {
            BookingState::All => true,
            BookingState::Current => start <= now && now <= end,
            BookingState::Past => end < now,
            BookingState::Future => start > now,
            BookingState::Waiting => status == BookingStatus::Waiting,
            BookingState::Rejected => status == BookingStatus::Rejected,
        }
    }
}

/// Half-open interval overlap: [s1, e1) and [s2, e2) overlap iff
/// s1 < e2 && s2 < e1. Intervals that merely touch at an endpoint do not
/// overlap.
pub fn overlaps(
    s1: DateTime<Utc>,
    e1: DateTime<Utc>,
    s2: DateTime<Utc>,
    e2: DateTime<Utc>,
) -> bool {
    s1 < e2 && s2 < e1
}

/// Project the (last, next) usage summary from an item's approved bookings.
///
/// `last` is the booking with the greatest start among those started at or
/// before `now` (an ongoing booking counts); `next` is the booking with the
/// smallest start strictly after `now`. Callers pass only APPROVED bookings.
/// Recomputed per request: "now" is a moving reference point.
pub fn project_usage(
    bookings: &[Booking],
    now: DateTime<Utc>,
) -> (Option<BookingShort>, Option<BookingShort>) {
    let last = bookings
        .iter()
        .filter(|b| b.start_date <= now)
        .max_by_key(|b| b.start_date)
        .map(|b| BookingShort {
            id: b.id,
            booker_id: b.booker_id,
        });

    let next = bookings
        .iter()
        .filter(|b| b.start_date > now)
        .min_by_key(|b| b.start_date)
        .map(|b| BookingShort {
            id: b.id,
            booker_id: b.booker_id,
        });

    (last, next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap()
    }

    fn booking(id: i64, start: DateTime<Utc>, end: DateTime<Utc>) -> Booking {
        Booking {
            id,
            start_date: start,
            end_date: end,
            item_id: 1,
            booker_id: 100 + id,
            status: BookingStatus::Approved,
        }
    }

    #[test]
    fn overlapping_intervals() {
        assert!(overlaps(t(1), t(3), t(2), t(4)));
        assert!(overlaps(t(2), t(4), t(1), t(3)));
        assert!(overlaps(t(1), t(4), t(2), t(3)));
        assert!(overlaps(t(2), t(3), t(1), t(4)));
        assert!(overlaps(t(1), t(3), t(1), t(3)));
    }

    #[test]
    fn touching_intervals_do_not_overlap() {
        assert!(!overlaps(t(1), t(2), t(2), t(3)));
        assert!(!overlaps(t(2), t(3), t(1), t(2)));
    }

    #[test]
    fn disjoint_intervals_do_not_overlap() {
        assert!(!overlaps(t(1), t(2), t(3), t(4)));
        assert!(!overlaps(t(3), t(4), t(1), t(2)));
    }

    #[test]
    fn state_parse_is_case_insensitive() {
        assert_eq!(BookingState::parse(Some("past")).unwrap(), BookingState::Past);
        assert_eq!(BookingState::parse(Some("Future")).unwrap(), BookingState::Future);
        assert_eq!(BookingState::parse(Some("WAITING")).unwrap(), BookingState::Waiting);
        assert_eq!(BookingState::parse(Some("rejected")).unwrap(), BookingState::Rejected);
        assert_eq!(BookingState::parse(Some("current")).unwrap(), BookingState::Current);
        assert_eq!(BookingState::parse(Some("all")).unwrap(), BookingState::All);
    }

    #[test]
    fn state_parse_defaults_to_all() {
        assert_eq!(BookingState::parse(None).unwrap(), BookingState::All);
    }

    #[test]
    fn state_parse_rejects_unknown_values() {
        let err = BookingState::parse(Some("SOMETIME")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn classification_semantics() {
        let now = t(10);
        let past = (t(1), t(2));
        let current = (t(9), t(11));
        let future = (t(12), t(13));

        assert!(BookingState::Past.matches(BookingStatus::Approved, past.0, past.1, now));
        assert!(!BookingState::Past.matches(BookingStatus::Approved, current.0, current.1, now));

        assert!(BookingState::Current.matches(BookingStatus::Approved, current.0, current.1, now));
        assert!(!BookingState::Current.matches(BookingStatus::Approved, future.0, future.1, now));

        assert!(BookingState::Future.matches(BookingStatus::Approved, future.0, future.1, now));
        assert!(!BookingState::Future.matches(BookingStatus::Approved, past.0, past.1, now));

        assert!(BookingState::Waiting.matches(BookingStatus::Waiting, future.0, future.1, now));
        assert!(!BookingState::Waiting.matches(BookingStatus::Approved, future.0, future.1, now));

        assert!(BookingState::Rejected.matches(BookingStatus::Rejected, past.0, past.1, now));
        assert!(BookingState::All.matches(BookingStatus::Canceled, past.0, past.1, now));
    }

    #[test]
    fn current_is_inclusive_at_both_endpoints() {
        let now = t(10);
        assert!(BookingState::Current.matches(BookingStatus::Approved, t(10), t(12), now));
        assert!(BookingState::Current.matches(BookingStatus::Approved, t(8), t(10), now));
    }

    #[test]
    fn projection_picks_latest_started_and_nearest_future() {
        let now = t(12);
        // starts at T-2h, T-1h (ongoing until T+1h), T+3h
        let bookings = vec![
            booking(1, now - Duration::hours(2), now - Duration::hours(1)),
            booking(2, now - Duration::hours(1), now + Duration::hours(1)),
            booking(3, now + Duration::hours(3), now + Duration::hours(4)),
        ];

        let (last, next) = project_usage(&bookings, now);
        assert_eq!(last.unwrap().id, 2);
        assert_eq!(next.unwrap().id, 3);
    }

    #[test]
    fn projection_with_no_qualifying_bookings() {
        let now = t(12);

        let (last, next) = project_usage(&[], now);
        assert!(last.is_none());
        assert!(next.is_none());

        let only_future = vec![booking(1, now + Duration::hours(1), now + Duration::hours(2))];
        let (last, next) = project_usage(&only_future, now);
        assert!(last.is_none());
        assert_eq!(next.unwrap().id, 1);

        let only_past = vec![booking(2, now - Duration::hours(2), now - Duration::hours(1))];
        let (last, next) = project_usage(&only_past, now);
        assert_eq!(last.unwrap().id, 2);
        assert!(next.is_none());
    }

    #[test]
    fn projection_booking_starting_exactly_now_counts_as_last() {
        let now = t(12);
        let bookings = vec![booking(1, now, now + Duration::hours(1))];
        let (last, next) = project_usage(&bookings, now);
        assert_eq!(last.unwrap().id, 1);
        assert!(next.is_none());
    }
}
