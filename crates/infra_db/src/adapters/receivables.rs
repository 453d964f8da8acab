//! PostgreSQL Receivables Adapter
//!
//! Implements `ReceivablesPort` on top of [`ReceivablesRepository`]. The
//! adapter translates domain filters into repository queries, converts rows
//! back into domain models, and maps database errors onto `PortError`.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use infra_db::adapters::PostgresReceivablesAdapter;
//! use domain_receivables::{ReceivablesPort, ReceivablesService, ReceivablesConfig};
//!
//! let port: Arc<dyn ReceivablesPort> = Arc::new(PostgresReceivablesAdapter::new(pool));
//! let service = ReceivablesService::new(port, ReceivablesConfig::default());
//! ```

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, field, instrument, Span};

use core_kernel::{
    AdapterHealth, Amount, CustomerId, DomainPort, HealthCheckResult, HealthCheckable,
    OperationMetadata, PaymentId, PortError, TransactionId,
};
use domain_receivables::{
    Customer, CustomerFilter, Payment, ReceivablesPort, Transaction, TransactionFilter,
    TransactionOrder, TransactionStatus,
};

use crate::error::DatabaseError;
use crate::repositories::receivables::{
    CustomerQuery, CustomerRow, PaymentRow, ReceivablesRepository, TransactionQuery,
    TransactionRow,
};

const ADAPTER_ID: &str = "postgres-receivables-adapter";

/// PostgreSQL-backed implementation of the ReceivablesPort trait
///
/// # Error Handling
///
/// Database errors are translated to `PortError` variants:
/// - `DatabaseError::NotFound` -> `PortError::NotFound`
/// - connection failures -> `PortError::Connection`
/// - pool exhaustion -> `PortError::ServiceUnavailable`
/// - undecodable rows -> `PortError::Transformation`
/// - Other errors -> `PortError::Internal`
#[derive(Debug, Clone)]
pub struct PostgresReceivablesAdapter {
    repository: ReceivablesRepository,
    pool: PgPool,
}

impl PostgresReceivablesAdapter {
    /// Creates a new adapter over the given pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: ReceivablesRepository::new(pool.clone()),
            pool,
        }
    }

    /// Returns a reference to the underlying repository
    pub fn repository(&self) -> &ReceivablesRepository {
        &self.repository
    }
}

impl DomainPort for PostgresReceivablesAdapter {}

#[async_trait]
impl HealthCheckable for PostgresReceivablesAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();

        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;

        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(_) => HealthCheckResult {
                adapter_id: ADAPTER_ID.to_string(),
                status: AdapterHealth::Healthy,
                latency_ms,
                message: None,
                checked_at: Utc::now(),
            },
            Err(e) => HealthCheckResult {
                adapter_id: ADAPTER_ID.to_string(),
                status: AdapterHealth::Unhealthy,
                latency_ms,
                message: Some(format!("Database error: {}", e)),
                checked_at: Utc::now(),
            },
        }
    }
}

#[async_trait]
impl ReceivablesPort for PostgresReceivablesAdapter {
    #[instrument(skip(self, metadata), fields(view = field::Empty))]
    async fn fetch_transactions(
        &self,
        filter: TransactionFilter,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Transaction>, PortError> {
        record_view(metadata.as_ref());
        let query = filter_to_query(&filter);
        let rows = self
            .repository
            .find_transactions(&query)
            .await
            .map_err(db_to_port_error)?;

        debug!(count = rows.len(), "Fetched transactions");
        Ok(rows.into_iter().map(row_to_transaction).collect())
    }

    #[instrument(
        skip(self, transaction_ids, metadata),
        fields(count = transaction_ids.len(), view = field::Empty)
    )]
    async fn fetch_payments(
        &self,
        transaction_ids: Vec<TransactionId>,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Payment>, PortError> {
        record_view(metadata.as_ref());
        let ids: Vec<_> = transaction_ids.iter().map(|id| *id.as_uuid()).collect();
        let rows = self
            .repository
            .find_payments(&ids)
            .await
            .map_err(db_to_port_error)?;

        debug!(payments = rows.len(), "Fetched payments");
        Ok(rows.into_iter().map(row_to_payment).collect())
    }

    #[instrument(skip(self, metadata), fields(view = field::Empty))]
    async fn count_transactions(
        &self,
        filter: TransactionFilter,
        metadata: Option<OperationMetadata>,
    ) -> Result<u64, PortError> {
        record_view(metadata.as_ref());
        let count = self
            .repository
            .count_transactions(&filter_to_query(&filter))
            .await
            .map_err(db_to_port_error)?;

        u64::try_from(count)
            .map_err(|_| PortError::transformation(format!("negative row count {}", count)))
    }

    #[instrument(skip(self, metadata), fields(customer_id = %id, view = field::Empty))]
    async fn get_customer(
        &self,
        id: CustomerId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Customer, PortError> {
        record_view(metadata.as_ref());
        debug!("Fetching customer by ID");
        let row = self
            .repository
            .get_customer(*id.as_uuid())
            .await
            .map_err(|e| match e {
                DatabaseError::NotFound { .. } => PortError::not_found("Customer", id),
                other => db_to_port_error(other),
            })?;

        Ok(row_to_customer(row))
    }

    #[instrument(skip(self, metadata), fields(customer_id = %id, view = field::Empty))]
    async fn customer_exists(
        &self,
        id: CustomerId,
        metadata: Option<OperationMetadata>,
    ) -> Result<bool, PortError> {
        record_view(metadata.as_ref());
        self.repository
            .customer_exists(*id.as_uuid())
            .await
            .map_err(db_to_port_error)
    }

    #[instrument(skip(self, metadata), fields(view = field::Empty))]
    async fn fetch_customers(
        &self,
        filter: CustomerFilter,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Customer>, PortError> {
        record_view(metadata.as_ref());
        let query = CustomerQuery {
            ids: filter
                .ids
                .map(|ids| ids.iter().map(|id| *id.as_uuid()).collect()),
            name_contains: filter.name_contains,
        };
        let rows = self
            .repository
            .find_customers(&query)
            .await
            .map_err(db_to_port_error)?;

        debug!(count = rows.len(), "Fetched customers");
        Ok(rows.into_iter().map(row_to_customer).collect())
    }
}

// ============================================================================
// Conversion helpers
// ============================================================================

/// Tags the current span with the caller's view
fn record_view(metadata: Option<&OperationMetadata>) {
    Span::current().record("view", OperationMetadata::view_label(metadata));
}

/// Converts a DatabaseError to a PortError
fn db_to_port_error(e: DatabaseError) -> PortError {
    match e {
        DatabaseError::NotFound { entity, id } => PortError::NotFound {
            entity_type: entity,
            id,
        },
        DatabaseError::ConnectionFailed(message) => PortError::connection(message),
        DatabaseError::PoolExhausted => PortError::ServiceUnavailable {
            service: "postgres".to_string(),
        },
        DatabaseError::DecodeFailed(message) => PortError::transformation(message),
        other => PortError::Internal {
            message: other.to_string(),
            source: Some(Box::new(other)),
        },
    }
}

fn filter_to_query(filter: &TransactionFilter) -> TransactionQuery {
    TransactionQuery {
        customer_id: filter.customer_id.map(|id| *id.as_uuid()),
        status: filter.status.as_ref().map(|s| s.as_str().to_string()),
        status_not: filter.status_not.as_ref().map(|s| s.as_str().to_string()),
        created_from: filter.created_from,
        due_from: filter.due_from,
        due_before: filter.due_before,
        newest_first: filter.order == TransactionOrder::CreatedDesc,
    }
}

fn row_to_transaction(row: TransactionRow) -> Transaction {
    Transaction {
        id: TransactionId::from_uuid(row.id),
        customer_id: CustomerId::from_uuid(row.customer_id),
        amount: Amount::new(row.amount),
        description: row.description,
        due_date: row.due_date,
        status: TransactionStatus::from(row.status),
        created_at: row.created_at,
    }
}

fn row_to_payment(row: PaymentRow) -> Payment {
    Payment {
        id: PaymentId::from_uuid(row.id),
        transaction_id: TransactionId::from_uuid(row.transaction_id),
        amount: row.amount.map(Amount::new),
        paid_at: row.paid_at,
    }
}

fn row_to_customer(row: CustomerRow) -> Customer {
    Customer {
        id: CustomerId::from_uuid(row.id),
        name: row.name,
        customer_types: row.customer_type_multi.unwrap_or_default(),
        customer_type: row.customer_type,
        mobile: row.mobile,
        phone: row.phone,
        created_at: row.created_at,
    }
}
