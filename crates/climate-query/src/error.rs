use climate_core::DatabaseError;
use thiserror::Error;

/// Failures of the date validation and aggregate pipeline.
#[derive(Debug, Error)]
pub enum QueryError {
    /// One or more requested dates have no observation. Dates keep input order.
    #[error("Input {} {} not valid", date_noun(.dates), .dates.join(", "))]
    InvalidDates { dates: Vec<String> },

    /// The dates exist but no temperature was recorded between them.
    #[error("No temperature observations {}", describe_window(.start, .end.as_deref()))]
    EmptyRange { start: String, end: Option<String> },

    #[error(transparent)]
    Storage(#[from] DatabaseError),
}

impl QueryError {
    /// Expected lookup failures, as opposed to storage faults.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::InvalidDates { .. } | Self::EmptyRange { .. })
    }

    /// Message safe to return to a client.
    pub fn user_message(&self) -> String {
        match self {
            Self::Storage(e) => e.user_message().to_string(),
            other => other.to_string(),
        }
    }
}

fn date_noun(dates: &[String]) -> &'static str {
    if dates.len() == 1 {
        "date"
    } else {
        "dates"
    }
}

fn describe_window(start: &str, end: Option<&str>) -> String {
    match end {
        Some(end) => format!("between {} and {}", start, end),
        None => format!("from {}", start),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_invalid_date_message() {
        let err = QueryError::InvalidDates {
            dates: vec!["2099-01-01".to_string()],
        };
        assert_eq!(err.to_string(), "Input date 2099-01-01 not valid");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_two_invalid_dates_message() {
        let err = QueryError::InvalidDates {
            dates: vec!["2099-01-01".to_string(), "2099-02-01".to_string()],
        };
        assert_eq!(err.to_string(), "Input dates 2099-01-01, 2099-02-01 not valid");
    }

    #[test]
    fn test_empty_range_messages() {
        let open = QueryError::EmptyRange {
            start: "2017-08-23".to_string(),
            end: None,
        };
        assert_eq!(open.to_string(), "No temperature observations from 2017-08-23");

        let closed = QueryError::EmptyRange {
            start: "2017-08-23".to_string(),
            end: Some("2017-01-01".to_string()),
        };
        assert_eq!(
            closed.to_string(),
            "No temperature observations between 2017-08-23 and 2017-01-01"
        );
        assert!(closed.is_not_found());
    }

    #[test]
    fn test_storage_error_is_generic() {
        let err = QueryError::from(DatabaseError::QueryFailed("no such table: measurement".into()));
        assert!(!err.is_not_found());
        assert!(!err.user_message().contains("measurement"));
    }
}
