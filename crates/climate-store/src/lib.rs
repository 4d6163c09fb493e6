//! Read-only access to the historical weather store.
//!
//! The store holds two tables, `measurement` (daily precipitation and
//! temperature per station) and `station`. Nothing in this crate writes.

pub mod database;
pub mod models;
pub mod schema;
pub mod session;

pub use database::Database;
pub use models::{DateSpan, Observation, Station, TemperatureStats};
pub use session::Session;
