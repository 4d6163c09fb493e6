//! Process-wide handle on the read-only weather store.
//!
//! `Database` is opened once at startup and cloned into every request. Each
//! request gets its own read-only connection through a [`Session`], either
//! directly with [`Database::session`] or on the blocking pool with
//! [`Database::run`], which also enforces the query timeout. Connections are
//! returned to an idle list when the session drops.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use climate_core::{DatabaseError, RusqliteErrorExt};
use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags};

use crate::schema;
use crate::session::Session;

/// Idle connections kept for reuse; extra ones are closed on release.
const MAX_IDLE: usize = 8;

const RUNNING: u8 = 0;
const FINISHED: u8 = 1;
const TIMED_OUT: u8 = 2;

/// Read-only connections to one store file.
pub(crate) struct Pool {
    path: PathBuf,
    query_timeout: Duration,
    idle: Mutex<Vec<Connection>>,
    closed: AtomicBool,
}

impl Pool {
    fn connect(&self) -> Result<Connection, DatabaseError> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| DatabaseError::ConnectionFailed(format!("{}: {}", self.path.display(), e)))?;

        conn.busy_timeout(self.query_timeout)
            .map_err(RusqliteErrorExt::into_database_error)?;
        tracing::debug!("Opened read-only connection to {}", self.path.display());
        Ok(conn)
    }

    fn acquire(pool: &Arc<Self>) -> Result<Session, DatabaseError> {
        if pool.closed.load(Ordering::Acquire) {
            return Err(DatabaseError::ConnectionFailed(format!(
                "{} is closed",
                pool.path.display()
            )));
        }

        let idle = pool.idle.lock().pop();
        let conn = match idle {
            Some(conn) => conn,
            None => pool.connect()?,
        };
        Ok(Session::new(conn, pool.clone()))
    }

    /// Return a connection to the idle list, or close it once the pool is
    /// closed or full.
    pub(crate) fn release(&self, conn: Connection) {
        let mut idle = self.idle.lock();
        if self.closed.load(Ordering::Acquire) || idle.len() >= MAX_IDLE {
            drop(idle);
            close_connection(conn, &self.path);
            return;
        }
        idle.push(conn);
    }
}

fn close_connection(conn: Connection, path: &Path) {
    if let Err((_, e)) = conn.close() {
        tracing::warn!("Failed to close connection to {}: {}", path.display(), e);
    }
}

/// Shared read-only SQLite handle.
#[derive(Clone)]
pub struct Database {
    pool: Arc<Pool>,
}

impl Database {
    /// Open the store at `path` read-only.
    ///
    /// Fails if the file does not exist; a read-only open never creates it.
    pub fn open<P: AsRef<Path>>(path: P, query_timeout: Duration) -> Result<Self, DatabaseError> {
        let pool = Arc::new(Pool {
            path: path.as_ref().to_path_buf(),
            query_timeout,
            idle: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        });

        // Open one connection up front so a missing file fails at startup
        let conn = pool.connect()?;
        pool.release(conn);

        tracing::info!("Opened weather database at {}", pool.path.display());
        Ok(Self { pool })
    }

    /// Check the declared `measurement`/`station` shapes against the store.
    pub fn verify_schema(&self) -> Result<(), DatabaseError> {
        let session = self.session()?;
        schema::verify(session.conn()?)
    }

    /// Acquire a session on the current thread. No timeout is applied.
    pub fn session(&self) -> Result<Session, DatabaseError> {
        Pool::acquire(&self.pool)
    }

    /// Run `f` with its own session on the blocking pool.
    ///
    /// Only the execution of `f` is bounded by the query timeout. On expiry the
    /// session's statement is interrupted and its connection is closed rather
    /// than reused.
    pub async fn run<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Session) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<DatabaseError> + Send + 'static,
    {
        let pool = self.pool.clone();
        let session = match tokio::task::spawn_blocking(move || Pool::acquire(&pool)).await {
            Ok(session) => session?,
            Err(join_error) => return Err(E::from(task_failed(join_error))),
        };
        let interrupt = session.interrupt_handle()?;

        let state = Arc::new(AtomicU8::new(RUNNING));
        let task_state = state.clone();
        let mut task = tokio::task::spawn_blocking(move || {
            let mut session = session;
            let result = f(&session);
            if task_state
                .compare_exchange(RUNNING, FINISHED, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                session.discard();
            }
            result
        });

        let joined = match tokio::time::timeout(self.pool.query_timeout, &mut task).await {
            Ok(joined) => joined,
            Err(_) => {
                let timed_out = state
                    .compare_exchange(RUNNING, TIMED_OUT, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok();
                if !timed_out {
                    // Finished right at the deadline
                    task.await
                } else {
                    interrupt.interrupt();
                    let millis = millis(self.pool.query_timeout);
                    tracing::warn!(
                        "Query exceeded {} ms against {}",
                        millis,
                        self.pool.path.display()
                    );
                    return Err(E::from(DatabaseError::Timeout { millis }));
                }
            }
        };

        joined.unwrap_or_else(|join_error| Err(E::from(task_failed(join_error))))
    }

    /// Close the idle connections and refuse new sessions.
    ///
    /// Sessions still running close their connection when they drop.
    pub fn close(self) -> Result<(), DatabaseError> {
        self.pool.closed.store(true, Ordering::Release);
        let idle = std::mem::take(&mut *self.pool.idle.lock());
        let mut first_error = None;
        for conn in idle {
            if let Err((_, e)) = conn.close() {
                first_error.get_or_insert(e);
            }
        }
        if let Some(e) = first_error {
            return Err(e.into_database_error());
        }

        tracing::info!("Closed weather database at {}", self.pool.path.display());
        Ok(())
    }
}

fn task_failed(join_error: tokio::task::JoinError) -> DatabaseError {
    DatabaseError::QueryFailed(format!("query task failed: {}", join_error))
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
