//! Storage errors
//!
//! Every `sqlx::Error` is classified on the way out of the repository so the
//! adapter can tell transient failures from broken rows.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("{entity} with id '{id}' not found")]
    NotFound { entity: String, id: String },

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// A column held a value the row type cannot represent
    #[error("Row decoding failed: {0}")]
    DecodeFailed(String),

    #[error("Connection pool exhausted")]
    PoolExhausted,
}

impl DatabaseError {
    /// ```rust
    /// use infra_db::DatabaseError;
    ///
    /// let error = DatabaseError::not_found("Customer", "CUS-123");
    /// assert_eq!(error.to_string(), "Customer with id 'CUS-123' not found");
    /// ```
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        DatabaseError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::NotFound { .. })
    }

    /// True when retrying later could succeed
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            DatabaseError::ConnectionFailed(_) | DatabaseError::PoolExhausted
        )
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        use sqlx::Error as E;

        match error {
            E::RowNotFound => DatabaseError::not_found("Record", "unknown"),
            E::PoolTimedOut => DatabaseError::PoolExhausted,
            E::PoolClosed | E::Io(_) | E::Tls(_) => DatabaseError::ConnectionFailed(error.to_string()),
            E::ColumnDecode { .. } | E::Decode(_) | E::ColumnNotFound(_) => {
                DatabaseError::DecodeFailed(error.to_string())
            }
            E::Database(db) => DatabaseError::QueryFailed(db.message().to_string()),
            other => DatabaseError::QueryFailed(other.to_string()),
        }
    }
}
