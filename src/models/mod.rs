//! Domain models and API data types

pub mod booking;
pub mod comment;
pub mod item;
pub mod user;
