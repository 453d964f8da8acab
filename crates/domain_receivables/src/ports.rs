//! Receivables Domain Ports
//!
//! This module defines the data-access port the receivables engine reads
//! through. The engine never writes; every operation here is a query.
//!
//! # Architecture
//!
//! The `ReceivablesPort` trait is implemented by:
//!
//! - **Postgres Adapter**: `infra_db::adapters::PostgresReceivablesAdapter`
//! - **Mock Adapter**: in-memory store for tests (feature `mock`)
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_receivables::ports::{ReceivablesPort, TransactionFilter};
//! use std::sync::Arc;
//!
//! let port: Arc<dyn ReceivablesPort> = Arc::new(PostgresReceivablesAdapter::new(pool));
//! let open = port
//!     .fetch_transactions(TransactionFilter::unpaid(), None)
//!     .await?;
//! ```
//!
//! Count and detail reads are separate calls and are not transactionally
//! consistent with each other.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

use core_kernel::{
    CustomerId, DomainPort, HealthCheckable, OperationMetadata, PortError, TransactionId,
};

use crate::customer::Customer;
use crate::payment::Payment;
use crate::transaction::{Transaction, TransactionStatus};

/// Ordering of fetched transactions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionOrder {
    /// Newest first
    #[default]
    CreatedDesc,
    /// Oldest first
    CreatedAsc,
}

impl TransactionOrder {
    /// Sorts transactions in place; ties fall back to the id
    pub fn sort(&self, transactions: &mut [Transaction]) {
        match self {
            TransactionOrder::CreatedDesc => {
                transactions.sort_by_key(|tx| (Reverse(tx.created_at), tx.id))
            }
            TransactionOrder::CreatedAsc => transactions.sort_by_key(|tx| (tx.created_at, tx.id)),
        }
    }
}

/// Query parameters for selecting transactions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    /// Owning customer
    pub customer_id: Option<CustomerId>,
    /// Status must equal this tag
    pub status: Option<TransactionStatus>,
    /// Status must differ from this tag
    pub status_not: Option<TransactionStatus>,
    /// Created at or after this instant
    pub created_from: Option<DateTime<Utc>>,
    /// Due on or after this date
    pub due_from: Option<NaiveDate>,
    /// Due strictly before this date
    pub due_before: Option<NaiveDate>,
    pub order: TransactionOrder,
}

impl TransactionFilter {
    /// All transactions of one customer
    pub fn for_customer(customer_id: CustomerId) -> Self {
        Self {
            customer_id: Some(customer_id),
            ..Default::default()
        }
    }

    /// Transactions tagged "unpaid"
    pub fn unpaid() -> Self {
        Self::with_status(TransactionStatus::Unpaid)
    }

    pub fn with_status(status: TransactionStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn excluding_status(status: TransactionStatus) -> Self {
        Self {
            status_not: Some(status),
            ..Default::default()
        }
    }

    pub fn created_from(mut self, from: DateTime<Utc>) -> Self {
        self.created_from = Some(from);
        self
    }

    /// Restricts to due dates in `[from, before)`
    pub fn due_between(mut self, from: Option<NaiveDate>, before: Option<NaiveDate>) -> Self {
        self.due_from = from;
        self.due_before = before;
        self
    }

    pub fn ordered(mut self, order: TransactionOrder) -> Self {
        self.order = order;
        self
    }

    /// Returns true if the transaction satisfies every set criterion
    ///
    /// Statuses compare by stored tag, as the database does. A due-date
    /// bound never matches a transaction without a due date.
    pub fn matches(&self, tx: &Transaction) -> bool {
        if let Some(customer_id) = self.customer_id {
            if tx.customer_id != customer_id {
                return false;
            }
        }
        if let Some(ref status) = self.status {
            if tx.status.as_str() != status.as_str() {
                return false;
            }
        }
        if let Some(ref status) = self.status_not {
            if tx.status.as_str() == status.as_str() {
                return false;
            }
        }
        if let Some(from) = self.created_from {
            if tx.created_at < from {
                return false;
            }
        }
        if self.due_from.is_some() || self.due_before.is_some() {
            let Some(due) = tx.due_date else {
                return false;
            };
            if self.due_from.is_some_and(|from| due < from) {
                return false;
            }
            if self.due_before.is_some_and(|before| due >= before) {
                return false;
            }
        }
        true
    }
}

/// Query parameters for selecting customers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerFilter {
    /// Restrict to these ids
    pub ids: Option<Vec<CustomerId>>,
    /// Case-sensitive substring of the name
    pub name_contains: Option<String>,
}

impl CustomerFilter {
    pub fn by_ids(ids: Vec<CustomerId>) -> Self {
        Self {
            ids: Some(ids),
            ..Default::default()
        }
    }

    pub fn matches(&self, customer: &Customer) -> bool {
        if let Some(ref ids) = self.ids {
            if !ids.contains(&customer.id) {
                return false;
            }
        }
        if let Some(ref fragment) = self.name_contains {
            if !customer.name.contains(fragment.as_str()) {
                return false;
            }
        }
        true
    }
}

/// The data-access port for receivables reads
///
/// All methods are async and return `Result<T, PortError>` so every adapter
/// reports failures the same way.
#[async_trait]
pub trait ReceivablesPort: DomainPort + HealthCheckable {
    /// Fetches transactions matching the filter, in the filter's order
    async fn fetch_transactions(
        &self,
        filter: TransactionFilter,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Transaction>, PortError>;

    /// Fetches every payment recorded against the given transactions
    ///
    /// An empty id list yields an empty result.
    async fn fetch_payments(
        &self,
        transaction_ids: Vec<TransactionId>,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Payment>, PortError>;

    /// Counts transactions matching the filter
    async fn count_transactions(
        &self,
        filter: TransactionFilter,
        metadata: Option<OperationMetadata>,
    ) -> Result<u64, PortError>;

    /// Retrieves a customer, or `PortError::NotFound`
    async fn get_customer(
        &self,
        id: CustomerId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Customer, PortError>;

    /// Checks if a customer exists
    async fn customer_exists(
        &self,
        id: CustomerId,
        metadata: Option<OperationMetadata>,
    ) -> Result<bool, PortError>;

    /// Fetches customers matching the filter
    async fn fetch_customers(
        &self,
        filter: CustomerFilter,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Customer>, PortError>;
}

/// Extension trait for ReceivablesPort with convenience methods
#[async_trait]
pub trait ReceivablesPortExt: ReceivablesPort {
    /// Fetches matching transactions together with all of their payments
    async fn fetch_transactions_with_payments(
        &self,
        filter: TransactionFilter,
        metadata: Option<OperationMetadata>,
    ) -> Result<(Vec<Transaction>, Vec<Payment>), PortError> {
        let transactions = self.fetch_transactions(filter, metadata.clone()).await?;
        if transactions.is_empty() {
            return Ok((transactions, Vec::new()));
        }

        let ids = transactions.iter().map(|tx| tx.id).collect();
        let payments = self.fetch_payments(ids, metadata).await?;
        Ok((transactions, payments))
    }
}

// Blanket implementation for all ReceivablesPort implementors
impl<T: ReceivablesPort + ?Sized> ReceivablesPortExt for T {}

/// Mock implementation of ReceivablesPort for testing
///
/// Stores records in memory. Individual operations can be made to fail,
/// and detail reads can be truncated to simulate a count that disagrees
/// with the fetched rows.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::collections::{HashMap, HashSet};
    use std::fmt;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    use core_kernel::{AdapterHealth, HealthCheckResult};

    /// Port operations that can be made to fail
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum MockOperation {
        FetchTransactions,
        FetchPayments,
        CountTransactions,
        GetCustomer,
        CustomerExists,
        FetchCustomers,
    }

    impl fmt::Display for MockOperation {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let name = match self {
                MockOperation::FetchTransactions => "fetch_transactions",
                MockOperation::FetchPayments => "fetch_payments",
                MockOperation::CountTransactions => "count_transactions",
                MockOperation::GetCustomer => "get_customer",
                MockOperation::CustomerExists => "customer_exists",
                MockOperation::FetchCustomers => "fetch_customers",
            };
            f.write_str(name)
        }
    }

    /// In-memory mock implementation of ReceivablesPort
    #[derive(Debug, Default)]
    pub struct MockReceivablesPort {
        customers: Arc<RwLock<HashMap<CustomerId, Customer>>>,
        transactions: Arc<RwLock<HashMap<TransactionId, Transaction>>>,
        payments: Arc<RwLock<Vec<Payment>>>,
        /// Injected failures; `None` fails forever, `Some(n)` fails the next `n` calls
        failing: Arc<RwLock<HashMap<MockOperation, Option<u32>>>>,
        detail_limit: Arc<RwLock<Option<usize>>>,
    }

    impl MockReceivablesPort {
        /// Creates an empty mock port
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with records for testing
        pub async fn with_data(
            customers: Vec<Customer>,
            transactions: Vec<Transaction>,
            payments: Vec<Payment>,
        ) -> Self {
            let port = Self::new();
            for customer in customers {
                port.insert_customer(customer).await;
            }
            for transaction in transactions {
                port.insert_transaction(transaction).await;
            }
            for payment in payments {
                port.insert_payment(payment).await;
            }
            port
        }

        pub async fn insert_customer(&self, customer: Customer) {
            self.customers.write().await.insert(customer.id, customer);
        }

        pub async fn insert_transaction(&self, transaction: Transaction) {
            self.transactions.write().await.insert(transaction.id, transaction);
        }

        pub async fn insert_payment(&self, payment: Payment) {
            self.payments.write().await.push(payment);
        }

        /// Makes every call to `operation` fail with a connection error
        pub async fn fail(&self, operation: MockOperation) {
            self.failing.write().await.insert(operation, None);
        }

        /// Makes only the next `times` calls to `operation` fail
        pub async fn fail_times(&self, operation: MockOperation, times: u32) {
            self.failing.write().await.insert(operation, Some(times));
        }

        /// Clears an injected failure
        pub async fn recover(&self, operation: MockOperation) {
            self.failing.write().await.remove(&operation);
        }

        /// Caps the number of rows `fetch_transactions` returns
        ///
        /// `count_transactions` keeps reporting the full count.
        pub async fn set_detail_limit(&self, limit: Option<usize>) {
            *self.detail_limit.write().await = limit;
        }

        async fn check(&self, operation: MockOperation) -> Result<(), PortError> {
            let mut failing = self.failing.write().await;
            let fails = match failing.get_mut(&operation) {
                None => false,
                Some(None) => true,
                Some(Some(0)) => {
                    failing.remove(&operation);
                    false
                }
                Some(Some(remaining)) => {
                    *remaining -= 1;
                    if *remaining == 0 {
                        failing.remove(&operation);
                    }
                    true
                }
            };

            if fails {
                return Err(PortError::connection(format!(
                    "injected failure in {}",
                    operation
                )));
            }
            Ok(())
        }
    }

    impl DomainPort for MockReceivablesPort {}

    #[async_trait]
    impl HealthCheckable for MockReceivablesPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "mock-receivables-port".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some("Mock adapter always healthy".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl ReceivablesPort for MockReceivablesPort {
        async fn fetch_transactions(
            &self,
            filter: TransactionFilter,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Vec<Transaction>, PortError> {
            self.check(MockOperation::FetchTransactions).await?;

            let mut results: Vec<Transaction> = self
                .transactions
                .read()
                .await
                .values()
                .filter(|tx| filter.matches(tx))
                .cloned()
                .collect();
            filter.order.sort(&mut results);

            if let Some(limit) = *self.detail_limit.read().await {
                results.truncate(limit);
            }
            Ok(results)
        }

        async fn fetch_payments(
            &self,
            transaction_ids: Vec<TransactionId>,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Vec<Payment>, PortError> {
            self.check(MockOperation::FetchPayments).await?;

            let wanted: HashSet<TransactionId> = transaction_ids.into_iter().collect();
            Ok(self
                .payments
                .read()
                .await
                .iter()
                .filter(|p| wanted.contains(&p.transaction_id))
                .cloned()
                .collect())
        }

        async fn count_transactions(
            &self,
            filter: TransactionFilter,
            _metadata: Option<OperationMetadata>,
        ) -> Result<u64, PortError> {
            self.check(MockOperation::CountTransactions).await?;

            let count = self
                .transactions
                .read()
                .await
                .values()
                .filter(|tx| filter.matches(tx))
                .count();
            Ok(count as u64)
        }

        async fn get_customer(
            &self,
            id: CustomerId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Customer, PortError> {
            self.check(MockOperation::GetCustomer).await?;

            self.customers
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Customer", id))
        }

        async fn customer_exists(
            &self,
            id: CustomerId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<bool, PortError> {
            self.check(MockOperation::CustomerExists).await?;
            Ok(self.customers.read().await.contains_key(&id))
        }

        async fn fetch_customers(
            &self,
            filter: CustomerFilter,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Vec<Customer>, PortError> {
            self.check(MockOperation::FetchCustomers).await?;

            let mut results: Vec<Customer> = self
                .customers
                .read()
                .await
                .values()
                .filter(|c| filter.matches(c))
                .cloned()
                .collect();
            results.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
            Ok(results)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use chrono::{Duration, TimeZone};
        use core_kernel::Amount;

        #[tokio::test]
        async fn test_mock_filters_and_orders() {
            let customer = Customer::new("한빛상사");
            let base = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
            let older = Transaction::new(customer.id, Amount::new(100)).with_created_at(base);
            let newer = Transaction::new(customer.id, Amount::new(200))
                .with_created_at(base + Duration::days(1));
            let paid = Transaction::new(customer.id, Amount::new(300)).with_status("paid");

            let port = MockReceivablesPort::with_data(
                vec![customer.clone()],
                vec![older.clone(), newer.clone(), paid],
                vec![],
            )
            .await;

            let unpaid = port
                .fetch_transactions(TransactionFilter::unpaid(), None)
                .await
                .unwrap();
            assert_eq!(
                unpaid.iter().map(|t| t.id).collect::<Vec<_>>(),
                vec![newer.id, older.id]
            );

            let count = port
                .count_transactions(TransactionFilter::for_customer(customer.id), None)
                .await
                .unwrap();
            assert_eq!(count, 3);
        }

        #[tokio::test]
        async fn test_injected_failure_and_recovery() {
            let port = MockReceivablesPort::new();
            port.fail(MockOperation::FetchPayments).await;

            let err = port.fetch_payments(vec![], None).await.unwrap_err();
            assert!(err.is_transient());

            port.recover(MockOperation::FetchPayments).await;
            assert!(port.fetch_payments(vec![], None).await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_failure_budget_is_consumed() {
            let port = MockReceivablesPort::new();
            port.fail_times(MockOperation::CountTransactions, 2).await;

            let filter = TransactionFilter::default();
            assert!(port.count_transactions(filter.clone(), None).await.is_err());
            assert!(port.count_transactions(filter.clone(), None).await.is_err());
            assert_eq!(port.count_transactions(filter, None).await.unwrap(), 0);
        }

        #[tokio::test]
        async fn test_unknown_customer_is_not_found() {
            let port = MockReceivablesPort::new();
            let id = CustomerId::new();
            assert!(!port.customer_exists(id, None).await.unwrap());
            assert!(port.get_customer(id, None).await.unwrap_err().is_not_found());
        }
    }
}
