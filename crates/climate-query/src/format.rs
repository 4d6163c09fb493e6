//! Mapping from query results to the JSON wire shapes.
//!
//! Nothing here touches the store.

use climate_store::Observation;
use serde::Serialize;

use crate::aggregate::AggregateResult;
use crate::error::QueryError;
use crate::validate::DateRange;

/// Routes listed on the index page, in display order.
pub const ROUTES: &[(&str, &str)] = &[
    ("Precipitation path", "/api/v1.0/precipitation"),
    ("Stations path", "/api/v1.0/stations"),
    ("Temperatures path", "/api/v1.0/tobs"),
    ("Temperatures path with time start", "/api/v1.0/&lt;start&gt;"),
    ("Temperatures path with time range", "/api/v1.0/&lt;start&gt;/&lt;end&gt;"),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrecipitationEntry {
    pub date: String,
    pub prcp: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureEntry {
    pub date: String,
    pub tobs: Option<f64>,
}

/// `{"error": "..."}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl From<&QueryError> for ErrorBody {
    fn from(err: &QueryError) -> Self {
        Self {
            error: err.user_message(),
        }
    }
}

pub fn index_html() -> String {
    let mut html = String::from("Routes available:<br/>");
    for (label, path) in ROUTES {
        html.push_str(&format!("{} {}<br/>", label, path));
    }
    html
}

pub fn precipitation(observations: Vec<Observation>) -> Vec<PrecipitationEntry> {
    observations
        .into_iter()
        .map(|o| PrecipitationEntry {
            date: o.date,
            prcp: o.prcp,
        })
        .collect()
}

pub fn temperatures(observations: Vec<Observation>) -> Vec<TemperatureEntry> {
    observations
        .into_iter()
        .map(|o| TemperatureEntry {
            date: o.date,
            tobs: o.tobs,
        })
        .collect()
}

/// Labeled aggregate lines.
///
/// Four lines for an open range, five when an end date is present:
/// start, [end], min, max, average. Order is part of the contract.
pub fn aggregate_lines(range: &DateRange, result: &AggregateResult) -> Vec<String> {
    let mut lines = Vec::with_capacity(5);
    lines.push(format!("Start_time: {}", range.start()));
    if let Some(end) = range.end() {
        lines.push(format!("End_time: {}", end));
    }
    lines.push(format!("Min Temperature: {} F", exact(result.min)));
    lines.push(format!("Max Temperature: {} F", exact(result.max)));
    lines.push(format!("Average Temperature: {:.1} F", result.avg));
    lines
}

/// Shortest round-trip form, always with a fractional part (`53.0`, `53.25`).
fn exact(value: f64) -> String {
    format!("{:?}", value)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::test_support::create_test_database;
    use crate::validate::validate;

    #[test]
    fn test_exact_keeps_precision() {
        assert_eq!(exact(53.0), "53.0");
        assert_eq!(exact(71.66), "71.66");
    }

    #[test]
    fn test_open_range_lines() {
        let db = create_test_database();
        let session = db.session().unwrap();
        let range = validate(&session, "2017-08-23", None).unwrap();
        let result = AggregateResult {
            min: 58.0,
            max: 87.0,
            avg: 74.59058295964125,
        };

        assert_eq!(
            aggregate_lines(&range, &result),
            vec![
                "Start_time: 2017-08-23",
                "Min Temperature: 58.0 F",
                "Max Temperature: 87.0 F",
                "Average Temperature: 74.6 F",
            ]
        );
    }

    #[test]
    fn test_closed_range_lines() {
        let db = create_test_database();
        let session = db.session().unwrap();
        let range = validate(&session, "2017-01-01", Some("2017-01-31")).unwrap();
        let result = AggregateResult {
            min: 62.0,
            max: 68.0,
            avg: 64.75,
        };

        let lines = aggregate_lines(&range, &result);
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "Start_time: 2017-01-01");
        assert_eq!(lines[1], "End_time: 2017-01-31");
        assert_eq!(lines[4], "Average Temperature: 64.8 F");
    }

    #[test]
    fn test_listing_shapes() {
        let observations = vec![Observation {
            station: "USC00519281".to_string(),
            date: "2017-08-23".to_string(),
            prcp: None,
            tobs: Some(79.0),
        }];

        let prcp = serde_json::to_value(precipitation(observations.clone())).unwrap();
        assert_eq!(prcp, serde_json::json!([{ "date": "2017-08-23", "prcp": null }]));

        let tobs = serde_json::to_value(temperatures(observations)).unwrap();
        assert_eq!(tobs, serde_json::json!([{ "date": "2017-08-23", "tobs": 79.0 }]));
    }

    #[test]
    fn test_error_body() {
        let err = QueryError::InvalidDates {
            dates: vec!["2099-01-01".to_string()],
        };
        let body = serde_json::to_value(ErrorBody::from(&err)).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "Input date 2099-01-01 not valid" }));
    }

    #[test]
    fn test_index_lists_every_route() {
        let html = index_html();
        assert!(html.starts_with("Routes available:<br/>"));
        for (_, path) in ROUTES {
            assert!(html.contains(path));
        }
    }
}
