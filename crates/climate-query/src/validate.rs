//! Validation of user-supplied dates against the stored observations.

use climate_store::Session;

use crate::error::QueryError;

/// A start date, and optional end date, that each appear in at least one
/// observation. Only [`validate`] constructs one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    start: String,
    end: Option<String>,
}

impl DateRange {
    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> Option<&str> {
        self.end.as_deref()
    }
}

/// Check that every supplied date is a stored observation date.
///
/// Dates are compared by exact value, so a well-formed date inside the
/// dataset's span with no observation is still rejected. Both dates are
/// checked before failing and every missing one is reported.
pub fn validate(
    session: &Session,
    start: &str,
    end: Option<&str>,
) -> Result<DateRange, QueryError> {
    let mut invalid = Vec::new();
    for date in std::iter::once(start).chain(end) {
        if !session.date_exists(date)? {
            invalid.push(date.to_string());
        }
    }

    if !invalid.is_empty() {
        tracing::debug!("Rejected dates: {:?}", invalid);
        return Err(QueryError::InvalidDates { dates: invalid });
    }

    Ok(DateRange {
        start: start.to_string(),
        end: end.map(str::to_string),
    })
}
