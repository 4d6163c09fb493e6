//! Read queries against the weather store.

use std::sync::Arc;

use climate_core::{DatabaseError, RusqliteErrorExt};
use rusqlite::{params, Connection, InterruptHandle, OptionalExtension};

use crate::database::Pool;
use crate::models::{DateSpan, Observation, Station, TemperatureStats};

/// A request-scoped read-only connection.
///
/// The connection goes back to its pool when the session is dropped, unless
/// the session was discarded after a timeout.
pub struct Session {
    conn: Option<Connection>,
    pool: Arc<Pool>,
    reusable: bool,
}

impl Session {
    pub(crate) fn new(conn: Connection, pool: Arc<Pool>) -> Self {
        Self {
            conn: Some(conn),
            pool,
            reusable: true,
        }
    }

    pub(crate) fn conn(&self) -> Result<&Connection, DatabaseError> {
        self.conn
            .as_ref()
            .ok_or_else(|| DatabaseError::QueryFailed("session already released".to_string()))
    }

    pub(crate) fn interrupt_handle(&self) -> Result<InterruptHandle, DatabaseError> {
        Ok(self.conn()?.get_interrupt_handle())
    }

    /// Close the connection on drop instead of returning it to the pool.
    pub(crate) fn discard(&mut self) {
        self.reusable = false;
    }

    fn row_to_observation(row: &rusqlite::Row) -> rusqlite::Result<Observation> {
        Ok(Observation {
            station: row.get(0)?,
            date: row.get(1)?,
            prcp: row.get(2)?,
            tobs: row.get(3)?,
        })
    }

    fn query_observations(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Observation>, DatabaseError> {
        let mut stmt = self
            .conn()?
            .prepare_cached(sql)
            .map_err(RusqliteErrorExt::into_database_error)?;

        let rows = stmt
            .query_map(params, Self::row_to_observation)
            .map_err(RusqliteErrorExt::into_database_error)?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(RusqliteErrorExt::into_database_error)
    }

    /// All measurements, ordered by date.
    pub fn observations(&self) -> Result<Vec<Observation>, DatabaseError> {
        self.query_observations(
            "SELECT station, date, prcp, tobs FROM measurement ORDER BY date",
            [],
        )
    }

    /// Measurements of one station with `from <= date <= to`, ordered by date.
    pub fn station_observations(
        &self,
        station: &str,
        from: &str,
        to: &str,
    ) -> Result<Vec<Observation>, DatabaseError> {
        self.query_observations(
            "SELECT station, date, prcp, tobs FROM measurement
             WHERE station = ?1 AND date >= ?2 AND date <= ?3
             ORDER BY date",
            params![station, from, to],
        )
    }

    /// Station names, ordered by name.
    pub fn station_names(&self) -> Result<Vec<String>, DatabaseError> {
        let mut stmt = self
            .conn()?
            .prepare_cached("SELECT name FROM station ORDER BY name")
            .map_err(RusqliteErrorExt::into_database_error)?;

        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(RusqliteErrorExt::into_database_error)?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(RusqliteErrorExt::into_database_error)
    }

    /// Full station rows, ordered by name.
    pub fn stations(&self) -> Result<Vec<Station>, DatabaseError> {
        let mut stmt = self
            .conn()?
            .prepare_cached(
                "SELECT station, name, latitude, longitude, elevation FROM station ORDER BY name",
            )
            .map_err(RusqliteErrorExt::into_database_error)?;

        let rows = stmt
            .query_map([], |row| {
                Ok(Station {
                    station: row.get(0)?,
                    name: row.get(1)?,
                    latitude: row.get(2)?,
                    longitude: row.get(3)?,
                    elevation: row.get(4)?,
                })
            })
            .map_err(RusqliteErrorExt::into_database_error)?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(RusqliteErrorExt::into_database_error)
    }

    /// Whether at least one measurement carries exactly this date value.
    pub fn date_exists(&self, date: &str) -> Result<bool, DatabaseError> {
        self.conn()?
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM measurement WHERE date = ?1)",
                params![date],
                |row| row.get(0),
            )
            .map_err(RusqliteErrorExt::into_database_error)
    }

    /// MIN/MAX/AVG/COUNT of `tobs` for `date >= start` and, if given, `date <= end`.
    ///
    /// All four come from one statement so they describe the same rows.
    pub fn temperature_stats(
        &self,
        start: &str,
        end: Option<&str>,
    ) -> Result<TemperatureStats, DatabaseError> {
        self.conn()?
            .query_row(
                "SELECT MIN(tobs), MAX(tobs), AVG(tobs), COUNT(tobs) FROM measurement
                 WHERE date >= ?1 AND (?2 IS NULL OR date <= ?2)",
                params![start, end],
                |row| {
                    Ok(TemperatureStats {
                        min: row.get(0)?,
                        max: row.get(1)?,
                        avg: row.get(2)?,
                        count: row.get(3)?,
                    })
                },
            )
            .map_err(RusqliteErrorExt::into_database_error)
    }

    /// Earliest and latest observation dates, or `None` for an empty table.
    pub fn date_span(&self) -> Result<Option<DateSpan>, DatabaseError> {
        let span: Option<(Option<String>, Option<String>)> = self
            .conn()?
            .query_row("SELECT MIN(date), MAX(date) FROM measurement", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .optional()
            .map_err(RusqliteErrorExt::into_database_error)?;

        Ok(match span {
            Some((Some(first), Some(last))) => Some(DateSpan { first, last }),
            _ => None,
        })
    }

    /// Number of measurement rows.
    pub fn observation_count(&self) -> Result<usize, DatabaseError> {
        let count: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM measurement", [], |row| row.get(0))
            .map_err(RusqliteErrorExt::into_database_error)?;
        Ok(count as usize)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            if self.reusable {
                self.pool.release(conn);
            }
        }
    }
}
