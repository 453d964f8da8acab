//! Infrastructure Database Layer
//!
//! PostgreSQL storage for the receivables engine, built on SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern: [`repositories`] holds the SQL
//! and row types, [`adapters`] implements `domain_receivables::ReceivablesPort`
//! on top of them. All reads are runtime-checked queries so the crate builds
//! without a live database.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, DatabaseConfig, PostgresReceivablesAdapter};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/receivables")).await?;
//! let adapter = PostgresReceivablesAdapter::new(pool);
//! ```

pub mod adapters;
pub mod error;
pub mod pool;
pub mod repositories;

pub use adapters::PostgresReceivablesAdapter;
pub use error::DatabaseError;
pub use pool::{create_pool, run_migrations, DatabaseConfig, DatabasePool};
pub use repositories::ReceivablesRepository;
