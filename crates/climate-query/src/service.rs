//! One function per endpoint, each a complete read pipeline over a session.

use climate_store::Session;

use crate::aggregate::aggregate;
use crate::error::QueryError;
use crate::format::{self, PrecipitationEntry, TemperatureEntry};
use crate::validate::validate;
use crate::window::ReferenceWindow;

/// Every observation's `(date, prcp)`, in date order.
pub fn precipitation(session: &Session) -> Result<Vec<PrecipitationEntry>, QueryError> {
    Ok(format::precipitation(session.observations()?))
}

/// Station names, in name order.
pub fn station_names(session: &Session) -> Result<Vec<String>, QueryError> {
    Ok(session.station_names()?)
}

/// `(date, tobs)` of the reference station inside its window, in date order.
pub fn reference_temperatures(
    session: &Session,
    window: &ReferenceWindow,
) -> Result<Vec<TemperatureEntry>, QueryError> {
    let rows = session.station_observations(&window.station, &window.from, &window.to)?;
    Ok(format::temperatures(rows))
}

/// Validate, aggregate and label in one pass. Fails fast on invalid dates.
pub fn temperature_summary(
    session: &Session,
    start: &str,
    end: Option<&str>,
) -> Result<Vec<String>, QueryError> {
    let range = validate(session, start, end)?;
    let result = aggregate(session, &range)?;
    Ok(format::aggregate_lines(&range, &result))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::test_support::create_test_database;
    use chrono::NaiveDate;

    #[test]
    fn test_precipitation_covers_every_observation() {
        let db = create_test_database();
        let session = db.session().unwrap();

        let entries = precipitation(&session).unwrap();
        assert_eq!(entries.len(), session.observation_count().unwrap());
        assert!(entries.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn test_station_names_unique() {
        let db = create_test_database();
        let session = db.session().unwrap();

        let names = station_names(&session).unwrap();
        let mut deduped = names.clone();
        deduped.dedup();
        assert_eq!(names.len(), 4);
        assert_eq!(names, deduped);
    }

    #[test]
    fn test_reference_temperatures_window() {
        let db = create_test_database();
        let session = db.session().unwrap();
        let window = ReferenceWindow::new(
            "USC00519281",
            NaiveDate::from_ymd_opt(2017, 8, 23).unwrap(),
            365,
        );

        let entries = reference_temperatures(&session, &window).unwrap();
        let dates: Vec<&str> = entries.iter().map(|e| e.date.as_str()).collect();
        assert_eq!(
            dates,
            vec![
                "2016-08-23",
                "2017-01-01",
                "2017-01-03",
                "2017-01-31",
                "2017-02-01",
                "2017-08-22",
                "2017-08-23",
            ]
        );
        assert_eq!(entries[0].tobs, Some(77.0));
    }

    #[test]
    fn test_summary_fails_fast_on_invalid_start() {
        let db = create_test_database();
        let session = db.session().unwrap();

        let err = temperature_summary(&session, "2099-01-01", None).unwrap_err();
        assert!(matches!(err, QueryError::InvalidDates { .. }));
    }

    #[test]
    fn test_summary_full_dataset() {
        let db = create_test_database();
        let session = db.session().unwrap();

        let lines = temperature_summary(&session, "2016-08-22", None).unwrap();
        assert_eq!(
            lines,
            vec![
                "Start_time: 2016-08-22",
                "Min Temperature: 62.0 F",
                "Max Temperature: 81.0 F",
                "Average Temperature: 72.9 F",
            ]
        );
    }
}
