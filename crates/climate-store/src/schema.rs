//! Declared shapes of the two tables the service reads.
//!
//! The store is never reflected at runtime. Instead the columns each query
//! relies on are listed here and checked against `PRAGMA table_info` once at
//! startup.

use climate_core::{DatabaseError, RusqliteErrorExt};
use rusqlite::Connection;

/// SQLite type affinity of a declared column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affinity {
    Text,
    Numeric,
}

impl Affinity {
    /// Affinity of a declared column type, following SQLite's rules.
    ///
    /// Columns declared without a type (or as BLOB) return `None`.
    pub fn of_declared(decl: &str) -> Option<Self> {
        let decl = decl.to_ascii_uppercase();
        if decl.contains("INT") {
            Some(Affinity::Numeric)
        } else if decl.contains("CHAR") || decl.contains("CLOB") || decl.contains("TEXT") {
            Some(Affinity::Text)
        } else if decl.is_empty() || decl.contains("BLOB") {
            None
        } else {
            // REAL, FLOA, DOUB and everything else land on REAL or NUMERIC
            Some(Affinity::Numeric)
        }
    }
}

/// Expected columns of one table.
pub struct TableShape {
    pub name: &'static str,
    pub columns: &'static [(&'static str, Affinity)],
}

pub const MEASUREMENT: TableShape = TableShape {
    name: "measurement",
    columns: &[
        ("station", Affinity::Text),
        ("date", Affinity::Text),
        ("prcp", Affinity::Numeric),
        ("tobs", Affinity::Numeric),
    ],
};

pub const STATION: TableShape = TableShape {
    name: "station",
    columns: &[
        ("station", Affinity::Text),
        ("name", Affinity::Text),
        ("latitude", Affinity::Numeric),
        ("longitude", Affinity::Numeric),
        ("elevation", Affinity::Numeric),
    ],
};

/// Check that both tables exist with every declared column.
pub fn verify(conn: &Connection) -> Result<(), DatabaseError> {
    for shape in [&MEASUREMENT, &STATION] {
        verify_table(conn, shape)?;
    }
    tracing::debug!("Schema verified for measurement and station");
    Ok(())
}

fn verify_table(conn: &Connection, shape: &TableShape) -> Result<(), DatabaseError> {
    let table_info: Vec<(String, String)> = conn
        .prepare(&format!("PRAGMA table_info({})", shape.name))
        .map_err(RusqliteErrorExt::into_database_error)?
        .query_map([], |row| Ok((row.get::<_, String>(1)?, row.get::<_, String>(2)?)))
        .map_err(RusqliteErrorExt::into_database_error)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(RusqliteErrorExt::into_database_error)?;

    if table_info.is_empty() {
        return Err(mismatch(shape, "table does not exist".to_string()));
    }

    for (column, expected) in shape.columns {
        let declared = table_info
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .map(|(_, decl)| decl.as_str())
            .ok_or_else(|| mismatch(shape, format!("missing column `{}`", column)))?;

        // Untyped columns accept anything, so only a contradicting type is rejected
        if let Some(found) = Affinity::of_declared(declared) {
            if found != *expected {
                return Err(mismatch(
                    shape,
                    format!(
                        "column `{}` declared as {} but {:?} was expected",
                        column, declared, expected
                    ),
                ));
            }
        }
    }

    Ok(())
}

fn mismatch(shape: &TableShape, detail: String) -> DatabaseError {
    DatabaseError::SchemaMismatch {
        table: shape.name.to_string(),
        detail,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    const HAWAII_SCHEMA: &str = r#"
        CREATE TABLE measurement (
            id INTEGER NOT NULL,
            station TEXT,
            date TEXT,
            prcp FLOAT,
            tobs FLOAT,
            PRIMARY KEY (id)
        );
        CREATE TABLE station (
            id INTEGER NOT NULL,
            station TEXT,
            name TEXT,
            latitude FLOAT,
            longitude FLOAT,
            elevation FLOAT,
            PRIMARY KEY (id)
        );
    "#;

    #[test]
    fn test_affinity_rules() {
        assert_eq!(Affinity::of_declared("TEXT"), Some(Affinity::Text));
        assert_eq!(Affinity::of_declared("VARCHAR(10)"), Some(Affinity::Text));
        assert_eq!(Affinity::of_declared("FLOAT"), Some(Affinity::Numeric));
        assert_eq!(Affinity::of_declared("integer"), Some(Affinity::Numeric));
        assert_eq!(Affinity::of_declared(""), None);
    }

    #[test]
    fn test_hawaii_layout_passes() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(HAWAII_SCHEMA).unwrap();
        verify(&conn).unwrap();
    }

    #[test]
    fn test_missing_table() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE measurement (station TEXT, date TEXT, prcp FLOAT, tobs FLOAT);")
            .unwrap();

        let err = verify(&conn).unwrap_err();
        match err {
            DatabaseError::SchemaMismatch { table, detail } => {
                assert_eq!(table, "station");
                assert!(detail.contains("does not exist"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_column() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE measurement (station TEXT, date TEXT, prcp FLOAT);
             CREATE TABLE station (station TEXT, name TEXT, latitude FLOAT, longitude FLOAT, elevation FLOAT);",
        )
        .unwrap();

        let err = verify(&conn).unwrap_err();
        assert!(err.to_string().contains("`tobs`"));
    }

    #[test]
    fn test_wrong_column_type() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE measurement (station TEXT, date TEXT, prcp FLOAT, tobs TEXT);
             CREATE TABLE station (station TEXT, name TEXT, latitude FLOAT, longitude FLOAT, elevation FLOAT);",
        )
        .unwrap();

        assert!(matches!(verify(&conn), Err(DatabaseError::SchemaMismatch { .. })));
    }
}
