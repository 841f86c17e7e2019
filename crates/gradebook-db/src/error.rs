use rusqlite::types::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Malformed record: field `{field}` {reason}")]
    MalformedRecord { field: &'static str, reason: String },

    #[error("Storage failure: {0}")]
    StorageFailure(#[from] rusqlite::Error),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage task failed: {0}")]
    TaskFailed(String),
}

impl DbError {
    pub(crate) fn missing(field: &'static str) -> Self {
        DbError::MalformedRecord {
            field,
            reason: "is missing".to_string(),
        }
    }

    pub(crate) fn wrong_type(field: &'static str, expected: &str, found: &Value) -> Self {
        let found = match found {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
            Value::Blob(_) => "blob",
        };
        DbError::MalformedRecord {
            field,
            reason: format!("expected {}, found {}", expected, found),
        }
    }

    /// True for every underlying storage fault, as opposed to a bad row.
    pub fn is_storage_failure(&self) -> bool {
        !matches!(self, DbError::MalformedRecord { .. })
    }
}
