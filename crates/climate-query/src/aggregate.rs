//! Min/max/avg temperature over a validated date range.

use climate_store::{Session, TemperatureStats};

use crate::error::QueryError;
use crate::validate::DateRange;

/// Temperature aggregates over one filtered subset of observations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateResult {
    pub min: f64,
    pub max: f64,
    /// Unrounded mean; rounding happens only when formatting
    pub avg: f64,
}

/// Aggregate `tobs` over `range.start <= date` and, when present, `date <= range.end`.
///
/// Observations without a temperature are ignored. A subset with no
/// temperatures at all, which includes a start after the end, is reported
/// as [`QueryError::EmptyRange`].
pub fn aggregate(session: &Session, range: &DateRange) -> Result<AggregateResult, QueryError> {
    let stats = session.temperature_stats(range.start(), range.end())?;
    tracing::debug!(
        "Aggregated {} temperatures for {}..{}",
        stats.count,
        range.start(),
        range.end().unwrap_or("")
    );

    match stats {
        TemperatureStats {
            min: Some(min),
            max: Some(max),
            avg: Some(avg),
            count,
        } if count > 0 => Ok(AggregateResult { min, max, avg }),
        _ => Err(QueryError::EmptyRange {
            start: range.start().to_string(),
            end: range.end().map(str::to_string),
        }),
    }
}
