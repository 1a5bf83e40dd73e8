//! Injectable wall-clock source.
//!
//! Every temporal rule in the booking core (overlap admission, decide window,
//! usage projection, state classification) compares against "now" read once
//! per operation from a [`Clock`] and passed down explicitly, so the logic
//! stays deterministic under test.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub enum Clock {
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Clock::System
    }
}
