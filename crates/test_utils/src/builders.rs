//! Test Data Builders
//!
//! [`LedgerBuilder`] composes customers, transactions, and payments with
//! sensible defaults so tests only spell out the fields they care about.
//! The resulting [`Ledger`] can back a mock port or seed a database.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use core_kernel::{Amount, CustomerId};
use domain_receivables::ports::mock::MockReceivablesPort;
use domain_receivables::{Customer, Payment, Transaction, TransactionStatus};

use crate::fixtures::TemporalFixtures;

/// A consistent set of receivables records
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    pub customers: Vec<Customer>,
    pub transactions: Vec<Transaction>,
    pub payments: Vec<Payment>,
}

impl Ledger {
    /// Looks up a customer by exact name
    pub fn customer_named(&self, name: &str) -> Option<&Customer> {
        self.customers.iter().find(|c| c.name == name)
    }

    /// Transactions belonging to one customer, in insertion order
    pub fn transactions_of(&self, customer_id: CustomerId) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|tx| tx.customer_id == customer_id)
            .collect()
    }

    /// Builds an in-memory port holding a copy of the ledger
    pub async fn mock_port(&self) -> MockReceivablesPort {
        MockReceivablesPort::with_data(
            self.customers.clone(),
            self.transactions.clone(),
            self.payments.clone(),
        )
        .await
    }
}

/// Options for a single transaction added through [`LedgerBuilder::sale`]
#[derive(Debug, Clone, Default)]
pub struct SaleSpec {
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub status: Option<TransactionStatus>,
    pub created_at: Option<DateTime<Utc>>,
}

impl SaleSpec {
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn due(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn status(mut self, status: impl Into<TransactionStatus>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// Builder for [`Ledger`]
///
/// Transactions without an explicit creation time are stamped from an
/// internal clock that advances one hour per sale, so insertion order and
/// chronological order agree.
pub struct LedgerBuilder {
    ledger: Ledger,
    clock: DateTime<Utc>,
}

impl Default for LedgerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerBuilder {
    /// Creates an empty builder whose clock starts at the book opening
    pub fn new() -> Self {
        Self {
            ledger: Ledger::default(),
            clock: TemporalFixtures::book_opened(),
        }
    }

    /// Adds a customer and returns its id alongside the builder
    pub fn customer(mut self, customer: Customer) -> (Self, CustomerId) {
        let id = customer.id;
        self.ledger.customers.push(customer);
        (self, id)
    }

    /// Adds a transaction with the given payments
    ///
    /// Each payment is recorded one day after the previous one, starting a
    /// day after the transaction.
    pub fn sale(
        mut self,
        customer_id: CustomerId,
        amount: i64,
        payments: &[i64],
        spec: SaleSpec,
    ) -> Self {
        let created_at = spec.created_at.unwrap_or_else(|| {
            self.clock += Duration::hours(1);
            self.clock
        });

        let mut tx = Transaction::new(customer_id, Amount::new(amount)).with_created_at(created_at);
        if let Some(description) = spec.description {
            tx = tx.with_description(description);
        }
        if let Some(due_date) = spec.due_date {
            tx = tx.with_due_date(due_date);
        }
        if let Some(status) = spec.status {
            tx = tx.with_status(status);
        }

        for (i, paid) in payments.iter().enumerate() {
            let paid_at = created_at + Duration::days(i as i64 + 1);
            self.ledger
                .payments
                .push(Payment::new(tx.id, Amount::new(*paid)).with_paid_at(paid_at));
        }
        self.ledger.transactions.push(tx);
        self
    }

    /// Adds a payment whose amount was never recorded
    pub fn blank_payment(mut self) -> Self {
        if let Some(tx) = self.ledger.transactions.last() {
            let mut payment = Payment::new(tx.id, Amount::ZERO).with_paid_at(tx.created_at);
            payment.amount = None;
            self.ledger.payments.push(payment);
        }
        self
    }

    pub fn build(self) -> Ledger {
        self.ledger
    }
}
