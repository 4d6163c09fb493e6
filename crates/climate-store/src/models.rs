use serde::{Deserialize, Serialize};

/// One row of the `measurement` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub station: String,
    /// Stored `YYYY-MM-DD` text, never reformatted
    pub date: String,
    pub prcp: Option<f64>,
    pub tobs: Option<f64>,
}

/// One row of the `station` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub station: String,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation: Option<f64>,
}

/// MIN/MAX/AVG of `tobs` over one filtered subset.
///
/// The three aggregates are `None` exactly when `count` is zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureStats {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub avg: Option<f64>,
    pub count: i64,
}

/// Earliest and latest observation dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateSpan {
    pub first: String,
    pub last: String,
}
