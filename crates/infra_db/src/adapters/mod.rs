//! Domain Adapters
//!
//! Implementations of the domain ports backed by PostgreSQL. An adapter
//! implements the port trait, translates rows into domain models, and
//! delegates the SQL to the repository layer.
//!
//! # Usage
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresReceivablesAdapter;
//! use domain_receivables::ReceivablesPort;
//!
//! let adapter = PostgresReceivablesAdapter::new(pool);
//! let customer = adapter.get_customer(customer_id, None).await?;
//! ```

pub mod receivables;

pub use receivables::PostgresReceivablesAdapter;
