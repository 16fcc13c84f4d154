//! Error types for SQLite storage

use rusqlite::ErrorCode;
use thiserror::Error;

/// SQLite storage error type
#[derive(Error, Debug)]
pub enum SqliteError {
    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Schema/migration error
    #[error("Schema error: {0}")]
    Schema(String),

    /// Edge or participant referencing a missing node
    #[error("Referential integrity violation on {entity} {id}: {detail}")]
    ReferentialIntegrity {
        entity: &'static str,
        id: String,
        detail: String,
    },

    /// Constraint failure not absorbed by upsert semantics
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Full-text index missing or unusable
    #[error("Text index unavailable: {0}")]
    IndexUnavailable(String),

    /// Write attempted without an open transaction
    #[error("Not in a writer session: {0}")]
    NotInSession(String),

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Underlying rusqlite error
    #[error("SQLite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
}

/// Result type for SQLite operations
pub type SqliteResult<T> = Result<T, SqliteError>;

impl SqliteError {
    /// Whether a rusqlite error is a foreign key failure
    pub(crate) fn is_foreign_key_failure(err: &rusqlite::Error) -> bool {
        matches!(
            err,
            rusqlite::Error::SqliteFailure(code, _)
                if code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
        )
    }

    /// Classify a write failure into a constraint error when possible
    pub(crate) fn from_write(err: rusqlite::Error, entity: &'static str, id: &str) -> Self {
        if Self::is_foreign_key_failure(&err) {
            return Self::ReferentialIntegrity {
                entity,
                id: id.to_string(),
                detail: err.to_string(),
            };
        }
        if let rusqlite::Error::SqliteFailure(code, _) = &err {
            if code.code == ErrorCode::ConstraintViolation {
                return Self::ConstraintViolation(format!("{} {}: {}", entity, id, err));
            }
        }
        Self::Rusqlite(err)
    }
}

impl From<serde_json::Error> for SqliteError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<SqliteError> for hypergraph_core::StorageError {
    fn from(err: SqliteError) -> Self {
        match err {
            SqliteError::Connection(msg) => Self::Backend(msg),
            SqliteError::Schema(msg) => Self::Schema(msg),
            err @ SqliteError::ReferentialIntegrity { .. } => {
                Self::ReferentialIntegrity(err.to_string())
            }
            SqliteError::ConstraintViolation(msg) => Self::ConstraintViolation(msg),
            SqliteError::IndexUnavailable(msg) => Self::IndexUnavailable(msg),
            SqliteError::NotInSession(msg) => Self::NotInSession(msg),
            SqliteError::InvalidOperation(msg) => Self::InvalidOperation(msg),
            SqliteError::Serialization(msg) => Self::Serialization(msg),
            SqliteError::Rusqlite(e) => Self::Backend(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hypergraph_core::StorageError;

    #[test]
    fn test_foreign_key_failure_is_classified() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             CREATE TABLE parent (id TEXT PRIMARY KEY);
             CREATE TABLE child (id TEXT PRIMARY KEY, parent_id TEXT NOT NULL REFERENCES parent(id));",
        )
        .unwrap();

        let err = conn
            .execute("INSERT INTO child (id, parent_id) VALUES ('c1', 'missing')", [])
            .unwrap_err();

        let classified = SqliteError::from_write(err, "edge", "c1");
        assert!(matches!(
            classified,
            SqliteError::ReferentialIntegrity { entity: "edge", ref id, .. } if id == "c1"
        ));
    }

    #[test]
    fn test_not_null_failure_is_constraint_violation() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id TEXT PRIMARY KEY, v TEXT NOT NULL);")
            .unwrap();

        let err = conn
            .execute("INSERT INTO t (id, v) VALUES ('a', NULL)", [])
            .unwrap_err();

        assert!(matches!(
            SqliteError::from_write(err, "node", "a"),
            SqliteError::ConstraintViolation(_)
        ));
    }

    #[test]
    fn test_conversion_keeps_kind() {
        let err: StorageError = SqliteError::ReferentialIntegrity {
            entity: "edge",
            id: "e1".to_string(),
            detail: "missing target".to_string(),
        }
        .into();
        assert!(matches!(err, StorageError::ReferentialIntegrity(msg) if msg.contains("e1")));

        let err: StorageError = SqliteError::Schema("boom".to_string()).into();
        assert!(err.is_fatal());
    }
}
