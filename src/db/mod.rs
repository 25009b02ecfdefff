//! Database layer for the to-do server.

pub mod tasks;

pub use tasks::TaskStore;

use crate::error::{StoreError, StoreResult};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Database handle wrapping a SQLite connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create the database at the given path.
    ///
    /// The schema is not touched; call [`Database::init_schema`] once before
    /// serving requests.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA busy_timeout=5000;",
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open a database that `init-db` has already set up.
    ///
    /// Fails with [`StoreError::NotInitialized`] when the file does not exist
    /// or has no `tasks` table. A missing file is not created.
    pub fn open_existing<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StoreError::NotInitialized(path.to_path_buf()));
        }

        let db = Self::open(path)?;
        if !db.is_initialized()? {
            return Err(StoreError::NotInitialized(path.to_path_buf()));
        }
        Ok(db)
    }

    /// Open an in-memory database with the schema already applied (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.init_schema()?;

        Ok(db)
    }

    /// Create or upgrade the schema. Safe to run repeatedly.
    pub fn init_schema(&self) -> StoreResult<()> {
        let mut conn = self.lock()?;
        let report = embedded::migrations::runner().run(&mut *conn)?;
        debug!(applied = report.applied_migrations().len(), "Migrations complete");
        Ok(())
    }

    /// Whether the `tasks` table exists.
    pub fn is_initialized(&self) -> StoreResult<bool> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'tasks'",
                [],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
    }

    /// Execute a function with exclusive access to the connection.
    pub fn with_conn<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T>,
    {
        let conn = self.lock()?;
        f(&conn)
    }

    /// Execute a function with mutable access to the connection (for transactions).
    pub fn with_conn_mut<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Connection) -> StoreResult<T>,
    {
        let mut conn = self.lock()?;
        f(&mut conn)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_file_is_not_initialized_until_init_schema() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path().join("todo.db")).unwrap();
        assert!(!db.is_initialized().unwrap());

        db.init_schema().unwrap();
        assert!(db.is_initialized().unwrap());

        // Second run is a no-op.
        db.init_schema().unwrap();
        assert!(db.is_initialized().unwrap());
    }

    #[test]
    fn open_existing_refuses_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.db");

        let result = Database::open_existing(&path);
        assert!(matches!(result, Err(StoreError::NotInitialized(ref p)) if *p == path));
        assert!(!path.exists());
    }

    #[test]
    fn open_existing_refuses_file_without_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todo.db");
        Database::open(&path).unwrap();

        let err = Database::open_existing(&path).err().unwrap();
        assert!(matches!(err, StoreError::NotInitialized(_)));
        assert!(err.to_string().contains("todo-server init-db"));
    }

    #[test]
    fn open_existing_accepts_initialized_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todo.db");
        Database::open(&path).unwrap().init_schema().unwrap();

        let db = Database::open_existing(&path).unwrap();
        assert!(db.is_initialized().unwrap());
    }

    #[test]
    fn in_memory_database_is_ready() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.is_initialized().unwrap());
    }
}
