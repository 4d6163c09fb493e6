//! Date validation and temperature aggregation over the weather store.
//!
//! Every request runs the same stateless pipeline: check the supplied dates
//! exist, aggregate over the matching observations, then format the result.

pub mod aggregate;
pub mod error;
pub mod format;
pub mod service;
pub mod validate;
pub mod window;

#[cfg(test)]
mod test_support;

pub use aggregate::{aggregate, AggregateResult};
pub use error::QueryError;
pub use format::{ErrorBody, PrecipitationEntry, TemperatureEntry};
pub use validate::{validate, DateRange};
pub use window::ReferenceWindow;
