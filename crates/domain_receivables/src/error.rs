//! Receivables domain errors

use core_kernel::PortError;
use serde::Serialize;
use thiserror::Error;

/// Coarse classification of a [`ReceivablesError`]
///
/// Callers map these onto their own responses (status codes, exit codes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing or malformed identifier
    InvalidArgument,
    /// Customer or transaction absent
    NotFound,
    /// The underlying data source read failed
    DependencyFailure,
}

/// Errors that can occur in the receivables domain
#[derive(Debug, Error)]
pub enum ReceivablesError {
    /// Missing or malformed input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound {
        entity: String,
        id: String,
    },

    /// A read against the data source failed
    #[error("Dependency failure during {operation}: {source}")]
    DependencyFailure {
        operation: &'static str,
        #[source]
        source: PortError,
    },
}

impl ReceivablesError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        ReceivablesError::InvalidArgument(message.into())
    }

    pub fn not_found(entity: impl Into<String>, id: impl std::fmt::Display) -> Self {
        ReceivablesError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Classifies a port failure raised while performing `operation`
    ///
    /// Adapter-level not-found and validation failures keep their meaning;
    /// everything else is a dependency failure.
    pub fn from_port(operation: &'static str, error: PortError) -> Self {
        match error {
            PortError::NotFound { entity_type, id } => ReceivablesError::NotFound {
                entity: entity_type,
                id,
            },
            PortError::Validation { message, .. } => ReceivablesError::InvalidArgument(message),
            source => ReceivablesError::DependencyFailure { operation, source },
        }
    }

    /// Returns the error classification
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReceivablesError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            ReceivablesError::NotFound { .. } => ErrorKind::NotFound,
            ReceivablesError::DependencyFailure { .. } => ErrorKind::DependencyFailure,
        }
    }
}
