//! Core Kernel - Foundational types for the receivables system
//!
//! This crate provides the building blocks shared by the domain and
//! infrastructure crates:
//! - Integer currency amounts and percentage rounding
//! - Business calendar helpers (timezone-aware days and months)
//! - Strongly-typed identifiers
//! - Port (data-access) error and health types

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use money::{Amount, MoneyError, percentage, rounded_mean};
pub use temporal::{Month, Timezone, TemporalError};
pub use identifiers::{CustomerId, IdParseError, PaymentId, TransactionId};
pub use ports::{
    PortError, DomainPort, AdapterHealth, HealthCheckResult, HealthCheckable,
    OperationMetadata,
};
pub use error::CoreError;
