use chrono::{Days, NaiveDate};
use climate_core::DATE_FORMAT;

/// Trailing window of one station's observations, anchored at a fixed date.
///
/// The anchor is never derived from the data, so the listing stays the same
/// as new rows are appended after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceWindow {
    pub station: String,
    /// First included date, `YYYY-MM-DD`
    pub from: String,
    /// Last included date (the anchor), `YYYY-MM-DD`
    pub to: String,
}

impl ReferenceWindow {
    pub fn new(station: impl Into<String>, reference: NaiveDate, window_days: u32) -> Self {
        let from = reference
            .checked_sub_days(Days::new(u64::from(window_days)))
            .unwrap_or(NaiveDate::MIN);

        Self {
            station: station.into(),
            from: from.format(DATE_FORMAT).to_string(),
            to: reference.format(DATE_FORMAT).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_default_window() {
        let reference = NaiveDate::from_ymd_opt(2017, 8, 23).unwrap();
        let window = ReferenceWindow::new("USC00519281", reference, 365);
        assert_eq!(window.from, "2016-08-23");
        assert_eq!(window.to, "2017-08-23");
    }

    #[test]
    fn test_window_across_leap_day() {
        let reference = NaiveDate::from_ymd_opt(2016, 3, 1).unwrap();
        let window = ReferenceWindow::new("X", reference, 365);
        assert_eq!(window.from, "2015-03-02");
    }

    #[test]
    fn test_zero_day_window() {
        let reference = NaiveDate::from_ymd_opt(2017, 8, 23).unwrap();
        let window = ReferenceWindow::new("X", reference, 0);
        assert_eq!(window.from, window.to);
    }
}
