//! Ports and Adapters Infrastructure
//!
//! This module provides the foundational types for the hexagonal
//! architecture used between the receivables engine and its data sources.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Receivables Service Layer                    │
//! │       (customer summary, portfolio rollup, dashboard)        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ReceivablesPort                           │
//! │   fetch_transactions / fetch_payments / count_transactions   │
//! └─────────────────────────────────────────────────────────────┘
//!                    ▲                         ▲
//!                    │                         │
//!         ┌─────────┴─────────┐     ┌────────┴────────┐
//!         │  Postgres Adapter │     │  In-memory Mock  │
//!         │    (infra_db)     │     │   (tests, demo)  │
//!         └───────────────────┘     └──────────────────┘
//! ```
//!
//! Domain crates define their port traits on top of the marker traits
//! here; adapters report failures through [`PortError`].

use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use serde::{Deserialize, Serialize};

/// Error type for port operations
///
/// Every adapter reports failures through this type so the service layer
/// can classify them without knowing the backing store.
#[derive(Debug, Error)]
pub enum PortError {
    /// The requested record does not exist
    #[error("Not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: String,
        id: String,
    },

    /// The adapter rejected the request itself
    #[error("Validation error: {message}")]
    Validation {
        message: String,
    },

    /// The backing store could not be reached
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The backing store is reachable but refusing work
    #[error("Service unavailable: {service}")]
    ServiceUnavailable {
        service: String,
    },

    /// A stored row could not be mapped into a domain record
    #[error("Transformation error: {message}")]
    Transformation {
        message: String,
    },

    /// Any other adapter failure
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PortError {
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
            source: None,
        }
    }

    pub fn transformation(message: impl Into<String>) -> Self {
        PortError::Transformation {
            message: message.into(),
        }
    }

    /// True for failures that may clear up on their own
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PortError::Connection { .. } | PortError::ServiceUnavailable { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }
}

/// Marker trait for all domain ports
///
/// Port traits extend this so implementations can be shared across tasks.
pub trait DomainPort: Send + Sync + 'static {}

/// Health status for an adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterHealth {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Result of probing an adapter's backing store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub adapter_id: String,
    pub status: AdapterHealth,
    /// Round-trip time of the probe
    pub latency_ms: u64,
    pub message: Option<String>,
    pub checked_at: chrono::DateTime<chrono::Utc>,
}

/// Trait for adapters that support health checks
#[async_trait::async_trait]
pub trait HealthCheckable: Send + Sync {
    async fn health_check(&self) -> HealthCheckResult;
}

/// Context attached to a port call
///
/// Adapters record it in their log output; it never changes what a call
/// returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationMetadata {
    /// The report view the read serves, e.g. `top_debtors`
    pub view: Option<String>,
    /// Additional key-value context
    pub context: BTreeMap<String, String>,
}

impl OperationMetadata {
    pub fn for_view(view: impl Into<String>) -> Self {
        Self {
            view: Some(view.into()),
            ..Default::default()
        }
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// The view name, or `-` when the call serves no particular view
    pub fn view_label(metadata: Option<&OperationMetadata>) -> &str {
        metadata.and_then(|m| m.view.as_deref()).unwrap_or("-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_error_not_found() {
        let error = PortError::not_found("Customer", "123");
        assert!(error.is_not_found());
        assert!(!error.is_transient());
        assert!(error.to_string().contains("Customer"));
        assert!(error.to_string().contains("123"));
    }

    #[test]
    fn test_port_error_transient() {
        assert!(PortError::connection("refused").is_transient());
        assert!(PortError::ServiceUnavailable {
            service: "postgres".to_string()
        }
        .is_transient());
        assert!(!PortError::validation("bad filter").is_transient());
        assert!(!PortError::transformation("bad row").is_transient());
    }

    #[test]
    fn test_operation_metadata() {
        let metadata = OperationMetadata::for_view("aging").with_context("attempt", "1");

        assert_eq!(OperationMetadata::view_label(Some(&metadata)), "aging");
        assert_eq!(OperationMetadata::view_label(None), "-");
        assert_eq!(metadata.context.get("attempt").map(String::as_str), Some("1"));
    }
}
