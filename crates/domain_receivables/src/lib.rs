//! Receivables Domain - Aggregation Engine
//!
//! This crate computes what every customer owes from raw transactions and
//! the partial payments recorded against them, and rolls those figures up
//! across the whole portfolio.
//!
//! # Data Flow
//!
//! ```text
//! transactions + payments
//!        │
//!        ▼
//!  PaymentAggregator ──► TransactionEnricher ──► CustomerSummaryBuilder ──► PortfolioRollupBuilder
//!  (paid amount)         (unpaid, ratio, note)   (totals, exact count)      (total, aging, top debtors)
//! ```
//!
//! Consumers (dashboard, statement export, reminder messages) only read the
//! outputs. Data access goes through the injected [`ports::ReceivablesPort`].
//!
//! # Arithmetic Rules
//!
//! - `paid = Σ payment amounts` (missing amounts count as zero)
//! - `unpaid = amount − paid`, signed, never clamped
//! - `ratio = round(paid / amount × 100)` half away from zero, `0` when `amount == 0`
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_receivables::{ReceivablesConfig, ReceivablesService};
//!
//! let service = ReceivablesService::new(port, ReceivablesConfig::default());
//! let summary = service.customer_summary(&raw_id).await?;
//! let rollup = service.portfolio_rollup().await;
//! ```

pub mod config;
pub mod customer;
pub mod enrichment;
pub mod error;
pub mod payment;
pub mod ports;
pub mod projections;
pub mod rollup;
pub mod service;
pub mod statistics;
pub mod summary;
pub mod transaction;

pub use config::{ReceivablesConfig, MAX_LOOKBACK_MONTHS};
pub use customer::{Customer, FALLBACK_CUSTOMER_TYPE};
pub use enrichment::{normalize_description, EnrichedTransaction, TransactionEnricher};
pub use error::{ErrorKind, ReceivablesError};
pub use payment::{Payment, PaymentAggregator};
pub use ports::{
    CustomerFilter, ReceivablesPort, ReceivablesPortExt, TransactionFilter, TransactionOrder,
};
pub use projections::{fill_template, SmsVariables, Statement, StatementRow, TransactionOverview};
pub use rollup::{AgingEntry, PortfolioRollup, PortfolioRollupBuilder, RollupView, TopDebtor};
pub use service::ReceivablesService;
pub use statistics::{Dashboard, DashboardStatistics, DashboardView, MonthlyTotal, TypeTotal};
pub use summary::{CustomerSummary, CustomerSummaryBuilder, SummaryTotals};
pub use transaction::{Transaction, TransactionStatus, ON_CREDIT_MARKER};
