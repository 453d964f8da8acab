//! Core error types used across the system

use thiserror::Error;
use crate::money::MoneyError;
use crate::temporal::TemporalError;

/// Core error type for the kernel
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    #[error("Temporal error: {0}")]
    Temporal(#[from] TemporalError),

    /// A setting is outside the range the engine supports
    #[error("Configuration error: {field}: {message}")]
    Configuration {
        field: &'static str,
        message: String,
    },
}

impl CoreError {
    pub fn configuration(field: &'static str, message: impl Into<String>) -> Self {
        CoreError::Configuration {
            field,
            message: message.into(),
        }
    }
}
