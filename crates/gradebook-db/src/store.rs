//! Async access to the grades table.
//!
//! `GradeStore` is what a front end holds. It opens the database on first
//! use (or when [`GradeStore::open`] is called at startup), keeps that one
//! handle for the rest of the process, and runs each statement on the
//! blocking pool so callers only suspend while SQLite works.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::{Database, DbError, Grade, Grades, NewGrade};

/// Where the store's database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseSource {
    Path(PathBuf),
    InMemory,
}

impl DatabaseSource {
    fn open(&self) -> Result<Database, DbError> {
        match self {
            DatabaseSource::Path(path) => Database::open_at(path),
            DatabaseSource::InMemory => Database::open_in_memory(),
        }
    }
}

/// Shared, lazily opened grade store.
#[derive(Clone)]
pub struct GradeStore {
    source: Option<DatabaseSource>,
    db: Arc<OnceCell<Arc<Database>>>,
}

impl GradeStore {
    /// Create a store that opens `source` on first use.
    pub fn new(source: DatabaseSource) -> Self {
        Self {
            source: Some(source),
            db: Arc::new(OnceCell::new()),
        }
    }

    /// Create a store around a database that is already open. Such a store
    /// has no source of its own.
    pub fn from_database(db: Arc<Database>) -> Self {
        Self {
            source: None,
            db: Arc::new(OnceCell::new_with(Some(db))),
        }
    }

    /// Where the database is opened from, if this store opens it itself.
    pub fn source(&self) -> Option<&DatabaseSource> {
        self.source.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.db.initialized()
    }

    /// Open the database now instead of on the first operation.
    pub async fn open(&self) -> Result<Arc<Database>, DbError> {
        let db = self
            .db
            .get_or_try_init(|| async {
                let source = self
                    .source
                    .clone()
                    .ok_or_else(|| DbError::TaskFailed("store has no database source".into()))?;
                tracing::debug!(?source, "opening grades database");
                let db = tokio::task::spawn_blocking(move || source.open())
                    .await
                    .map_err(|e| DbError::TaskFailed(e.to_string()))??;
                Ok::<_, DbError>(Arc::new(db))
            })
            .await?;
        Ok(Arc::clone(db))
    }

    /// Every stored grade, newest first.
    pub async fn list_all(&self) -> Result<Vec<Grade>, DbError> {
        self.with_grades(|grades| grades.list_all()).await
    }

    /// Exact-match lookup by id.
    pub async fn get(&self, id: i64) -> Result<Option<Grade>, DbError> {
        self.with_grades(move |grades| grades.get(id)).await
    }

    /// Insert and return the assigned id. `new` itself is left untouched.
    pub async fn insert(&self, new: &NewGrade) -> Result<i64, DbError> {
        let new = new.clone();
        self.with_grades(move |grades| grades.insert(&new)).await
    }

    /// Overwrite the stored row with `grade.id`; 0 means it no longer exists.
    pub async fn update(&self, grade: &Grade) -> Result<usize, DbError> {
        let grade = grade.clone();
        self.with_grades(move |grades| grades.update(&grade)).await
    }

    /// Delete by id; 0 means there was nothing to delete.
    pub async fn delete_by_id(&self, id: i64) -> Result<usize, DbError> {
        self.with_grades(move |grades| grades.delete_by_id(id)).await
    }

    async fn with_grades<T, F>(&self, op: F) -> Result<T, DbError>
    where
        T: Send + 'static,
        F: FnOnce(&Grades<'_>) -> Result<T, DbError> + Send + 'static,
    {
        let db = self.open().await?;
        tokio::task::spawn_blocking(move || {
            let grades = db.grades()?;
            op(&grades)
        })
        .await
        .map_err(|e| DbError::TaskFailed(e.to_string()))?
    }
}
