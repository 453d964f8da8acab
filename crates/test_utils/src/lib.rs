//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! receivables test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built ledgers and reference instants
//! - `builders`: Ledger builder for composing test data
//! - `database`: Database test helpers and container management
//! - `assertions`: Custom assertion helpers for domain types
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
