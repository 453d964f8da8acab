//! Transaction records
//!
//! A transaction is a billable event owed by a customer. The engine only
//! reads transactions; they are written by external paths.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{Amount, CustomerId, TransactionId};

/// Reserved description marking a sale made on credit
pub const ON_CREDIT_MARKER: &str = "외상";

/// Free-form status tag stored with a transaction
///
/// Only the well-known tags get their own variant; anything else is kept
/// verbatim so workflow states defined elsewhere survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransactionStatus {
    /// Outstanding
    Unpaid,
    /// Settled
    Paid,
    /// Soft-deleted
    Deleted,
    /// Any other tag
    Other(String),
}

impl TransactionStatus {
    /// Returns the stored tag
    pub fn as_str(&self) -> &str {
        match self {
            TransactionStatus::Unpaid => "unpaid",
            TransactionStatus::Paid => "paid",
            TransactionStatus::Deleted => "deleted",
            TransactionStatus::Other(tag) => tag,
        }
    }

    pub fn is_unpaid(&self) -> bool {
        self.as_str() == "unpaid"
    }

    pub fn is_paid(&self) -> bool {
        self.as_str() == "paid"
    }

    pub fn is_deleted(&self) -> bool {
        self.as_str() == "deleted"
    }
}

impl Default for TransactionStatus {
    fn default() -> Self {
        TransactionStatus::Unpaid
    }
}

impl From<String> for TransactionStatus {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "unpaid" => TransactionStatus::Unpaid,
            "paid" => TransactionStatus::Paid,
            "deleted" => TransactionStatus::Deleted,
            _ => TransactionStatus::Other(tag),
        }
    }
}

impl From<&str> for TransactionStatus {
    fn from(tag: &str) -> Self {
        TransactionStatus::from(tag.to_string())
    }
}

impl From<TransactionStatus> for String {
    fn from(status: TransactionStatus) -> String {
        match status {
            TransactionStatus::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A billable event owed by a customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier
    pub id: TransactionId,
    /// Owning customer
    pub customer_id: CustomerId,
    /// Billed amount in whole currency units (may be zero)
    pub amount: Amount,
    /// Free-text description
    pub description: String,
    /// Date the customer promised to pay by
    pub due_date: Option<NaiveDate>,
    /// Workflow status tag
    pub status: TransactionStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Creates a new unpaid transaction
    ///
    /// # Arguments
    ///
    /// * `customer_id` - Customer who owes the amount
    /// * `amount` - Billed amount
    pub fn new(customer_id: CustomerId, amount: Amount) -> Self {
        Self {
            id: TransactionId::new_v7(),
            customer_id,
            amount,
            description: String::new(),
            due_date: None,
            status: TransactionStatus::Unpaid,
            created_at: Utc::now(),
        }
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the due date
    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the status tag
    pub fn with_status(mut self, status: impl Into<TransactionStatus>) -> Self {
        self.status = status.into();
        self
    }

    /// Sets the creation timestamp
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Returns true if the description is the reserved on-credit marker
    pub fn is_on_credit(&self) -> bool {
        self.description == ON_CREDIT_MARKER
    }
}
