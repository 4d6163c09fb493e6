use std::ops::Deref;
use std::time::Duration;

use climate_store::Database;
use rusqlite::Connection;
use tempfile::TempDir;

const HAWAII_SAMPLE: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/fixtures/hawaii_sample.sql"
));

/// Sample store on disk, removed when dropped.
pub(crate) struct TestDatabase {
    _dir: TempDir,
    db: Database,
}

impl Deref for TestDatabase {
    type Target = Database;

    fn deref(&self) -> &Database {
        &self.db
    }
}

#[allow(clippy::expect_used)]
pub(crate) fn create_test_database() -> TestDatabase {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("hawaii.sqlite");
    Connection::open(&path)
        .expect("Failed to create sample database")
        .execute_batch(HAWAII_SAMPLE)
        .expect("Failed to load sample data");

    let db = Database::open(&path, Duration::from_secs(5)).expect("Failed to open sample database");
    TestDatabase { _dir: dir, db }
}
