//! Report error handling

use serde::Serialize;
use thiserror::Error;

use domain_receivables::{ErrorKind, ReceivablesError};
use infra_db::DatabaseError;

/// Report error types
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Receivables(#[from] ReceivablesError),

    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("Unknown report kind: {0}")]
    UnknownKind(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error body written to stdout when a report fails
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ReportError {
    /// Process exit code, following the sysexits conventions
    pub fn exit_code(&self) -> i32 {
        match self {
            ReportError::Receivables(e) => match e.kind() {
                ErrorKind::InvalidArgument => 64,
                ErrorKind::NotFound => 66,
                ErrorKind::DependencyFailure => 69,
            },
            ReportError::MissingArgument(_) | ReportError::UnknownKind(_) => 64,
            ReportError::Config(_) => 78,
            ReportError::Database(_) => 69,
            ReportError::Serialization(_) => 70,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            ReportError::Receivables(e) => match e.kind() {
                ErrorKind::InvalidArgument => "invalid_argument",
                ErrorKind::NotFound => "not_found",
                ErrorKind::DependencyFailure => "dependency_failure",
            },
            ReportError::MissingArgument(_) | ReportError::UnknownKind(_) => "invalid_argument",
            ReportError::Config(_) => "config_error",
            ReportError::Database(_) => "database_error",
            ReportError::Serialization(_) => "internal_error",
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.error_type().to_string(),
            message: self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::PortError;

    #[test]
    fn test_exit_codes_follow_error_kind() {
        let invalid = ReportError::from(ReceivablesError::invalid_argument("empty"));
        assert_eq!(invalid.exit_code(), 64);

        let missing = ReportError::from(ReceivablesError::not_found("Customer", "CUS-x"));
        assert_eq!(missing.exit_code(), 66);
        assert_eq!(missing.to_response().error, "not_found");

        let dependency = ReportError::from(ReceivablesError::from_port(
            "fetch_transactions",
            PortError::connection("down"),
        ));
        assert_eq!(dependency.exit_code(), 69);
        assert_eq!(dependency.to_response().error, "dependency_failure");
    }
}
