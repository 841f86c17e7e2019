//! Database layer for gradebook.
//!
//! Provides a `Database` struct that owns the SQLite connection, the
//! borrowed-connection [`Grades`] store, and the async [`GradeStore`] that
//! front ends talk to.

mod error;
mod grades;
mod record;
mod store;

pub use error::DbError;
pub use grades::Grades;
pub use record::{Fields, Grade, GradeRecord, NewGrade};
pub use store::{DatabaseSource, GradeStore};

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Schema version written to `PRAGMA user_version` on creation.
pub const SCHEMA_VERSION: i64 = 1;

/// The main database struct that owns the SQLite connection.
pub struct Database {
    conn: Mutex<Connection>,
    created: bool,
}

impl Database {
    /// Open or create a database at the default location.
    ///
    /// The default location is `~/.local/share/gradebook/gradebook.db`.
    pub fn open() -> Result<Self, DbError> {
        Self::open_at(&Self::default_path())
    }

    /// Open or create a database at a specific path.
    ///
    /// The schema is created when the file is new, which includes an existing
    /// file that has neither a schema version nor a `grades` table (an empty
    /// file, or one left behind by an interrupted creation). Any other file
    /// is used as-is.
    pub fn open_at(path: &Path) -> Result<Self, DbError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        let created = Self::needs_schema(&conn)?;

        if created {
            Self::init_schema(&conn)?;
            tracing::info!(path = %path.display(), "created grades database");
        } else {
            Self::check_schema(&conn, path)?;
        }

        Ok(Self {
            conn: Mutex::new(conn),
            created,
        })
    }

    /// Open an in-memory database (useful for testing).
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            created: true,
        })
    }

    /// Get the default database path.
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gradebook")
            .join("gradebook.db")
    }

    /// Whether this handle created the schema when it was opened.
    pub fn is_new(&self) -> bool {
        self.created
    }

    /// Access the grades store.
    pub fn grades(&self) -> Result<Grades<'_>, DbError> {
        let conn = self.conn.lock().map_err(|_| {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
                Some("Lock error".to_string()),
            )
        })?;
        Ok(Grades::new(conn))
    }

    /// Initialize the database schema. Table and version are committed
    /// together or not at all.
    fn init_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE grades (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                sid TEXT NOT NULL,
                grade TEXT NOT NULL
            );
            PRAGMA user_version = 1;
            COMMIT;
            "#,
        )
    }

    fn schema_version(conn: &Connection) -> Result<i64, rusqlite::Error> {
        conn.pragma_query_value(None, "user_version", |row| row.get(0))
    }

    fn needs_schema(conn: &Connection) -> Result<bool, rusqlite::Error> {
        if Self::schema_version(conn)? != 0 {
            return Ok(false);
        }
        let tables: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'grades'",
            [],
            |row| row.get(0),
        )?;
        Ok(tables == 0)
    }

    fn check_schema(conn: &Connection, path: &Path) -> Result<(), rusqlite::Error> {
        let version = Self::schema_version(conn)?;
        if version != SCHEMA_VERSION {
            tracing::warn!(
                path = %path.display(),
                version,
                expected = SCHEMA_VERSION,
                "unexpected grades schema version"
            );
        }
        Ok(())
    }
}
