//! Payments and payment aggregation
//!
//! A payment settles part (or all) of exactly one transaction. The paid
//! amount of a transaction is always recomputed from its payments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use core_kernel::{Amount, PaymentId, TransactionId};

/// A settlement applied against one transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier
    pub id: PaymentId,
    /// Transaction being settled
    pub transaction_id: TransactionId,
    /// Amount paid; `None` when the stored amount is missing
    pub amount: Option<Amount>,
    /// When the payment was received
    pub paid_at: DateTime<Utc>,
}

impl Payment {
    /// Creates a new payment received now
    pub fn new(transaction_id: TransactionId, amount: Amount) -> Self {
        Self {
            id: PaymentId::new_v7(),
            transaction_id,
            amount: Some(amount),
            paid_at: Utc::now(),
        }
    }

    /// Sets the payment timestamp
    pub fn with_paid_at(mut self, paid_at: DateTime<Utc>) -> Self {
        self.paid_at = paid_at;
        self
    }

    /// Amount this payment contributes to its transaction's total
    pub fn contribution(&self) -> Amount {
        self.amount.unwrap_or(Amount::ZERO)
    }
}

/// Reduces payments into paid amounts
pub struct PaymentAggregator;

impl PaymentAggregator {
    /// Sums the payments of a single transaction
    ///
    /// Missing amounts contribute zero; an empty set sums to zero.
    pub fn total<'a, I>(payments: I) -> Amount
    where
        I: IntoIterator<Item = &'a Payment>,
    {
        payments.into_iter().map(Payment::contribution).sum()
    }

    /// Partitions payments by the transaction they settle
    ///
    /// Every payment lands in exactly one bucket, so no payment can count
    /// toward two transactions. Order within a bucket follows the input.
    pub fn group_by_transaction<I>(payments: I) -> HashMap<TransactionId, Vec<Payment>>
    where
        I: IntoIterator<Item = Payment>,
    {
        let mut grouped: HashMap<TransactionId, Vec<Payment>> = HashMap::new();
        for payment in payments {
            grouped.entry(payment.transaction_id).or_default().push(payment);
        }
        grouped
    }
}
