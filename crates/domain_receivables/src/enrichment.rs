//! Transaction enrichment
//!
//! Combines a transaction with its payments into the derived view every
//! consumer reads: paid amount, signed unpaid amount, paid ratio and a
//! normalized description/note pair.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{percentage, Amount, CustomerId, TransactionId};

use crate::payment::{Payment, PaymentAggregator};
use crate::transaction::{Transaction, TransactionStatus, ON_CREDIT_MARKER};

/// A transaction together with its derived payment figures
///
/// Never persisted; recomputed on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedTransaction {
    pub id: TransactionId,
    pub customer_id: CustomerId,
    pub amount: Amount,
    /// Sum of all payment amounts
    pub paid_amount: Amount,
    /// `amount - paid_amount`; negative when overpaid
    pub unpaid_amount: Amount,
    /// Rounded integer percentage paid; may exceed 100
    pub paid_ratio: i64,
    pub description: String,
    pub note: String,
    pub due_date: Option<NaiveDate>,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub payments: Vec<Payment>,
}

/// Splits the on-credit marker out of a description
///
/// Returns `(description, note)`. Only an exact match moves into the note.
pub fn normalize_description(description: &str, marker: &str) -> (String, String) {
    if description == marker {
        (String::new(), marker.to_string())
    } else {
        (description.to_string(), String::new())
    }
}

/// Derives [`EnrichedTransaction`] values
#[derive(Debug, Clone)]
pub struct TransactionEnricher {
    on_credit_marker: String,
}

impl Default for TransactionEnricher {
    fn default() -> Self {
        Self::new(ON_CREDIT_MARKER)
    }
}

impl TransactionEnricher {
    pub fn new(on_credit_marker: impl Into<String>) -> Self {
        Self {
            on_credit_marker: on_credit_marker.into(),
        }
    }

    pub fn on_credit_marker(&self) -> &str {
        &self.on_credit_marker
    }

    /// Enriches one transaction with the payments recorded against it
    ///
    /// Payments belonging to other transactions must already have been
    /// filtered out by the caller.
    pub fn enrich(&self, transaction: &Transaction, payments: Vec<Payment>) -> EnrichedTransaction {
        let paid_amount = PaymentAggregator::total(&payments);
        let unpaid_amount = transaction.amount - paid_amount;
        let paid_ratio = percentage(paid_amount, transaction.amount);
        let (description, note) =
            normalize_description(&transaction.description, &self.on_credit_marker);

        EnrichedTransaction {
            id: transaction.id,
            customer_id: transaction.customer_id,
            amount: transaction.amount,
            paid_amount,
            unpaid_amount,
            paid_ratio,
            description,
            note,
            due_date: transaction.due_date,
            status: transaction.status.clone(),
            created_at: transaction.created_at,
            payments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(amount: i64) -> Transaction {
        Transaction::new(CustomerId::new(), Amount::new(amount))
    }

    fn paid(transaction: &Transaction, amounts: &[i64]) -> Vec<Payment> {
        amounts
            .iter()
            .map(|a| Payment::new(transaction.id, Amount::new(*a)))
            .collect()
    }

    #[test]
    fn test_partial_payment() {
        let t = tx(10_000);
        let enriched = TransactionEnricher::default().enrich(&t, paid(&t, &[3_000, 2_000]));
        assert_eq!(enriched.paid_amount, Amount::new(5_000));
        assert_eq!(enriched.unpaid_amount, Amount::new(5_000));
        assert_eq!(enriched.paid_ratio, 50);
        assert_eq!(enriched.payments.len(), 2);
    }

    #[test]
    fn test_overpayment_is_not_clamped() {
        let t = tx(1_000);
        let enriched = TransactionEnricher::default().enrich(&t, paid(&t, &[1_500]));
        assert_eq!(enriched.unpaid_amount, Amount::new(-500));
        assert_eq!(enriched.paid_ratio, 150);
    }

    #[test]
    fn test_zero_amount_has_zero_ratio() {
        let t = tx(0);
        let enriched = TransactionEnricher::default().enrich(&t, paid(&t, &[100]));
        assert_eq!(enriched.paid_ratio, 0);
        assert_eq!(enriched.unpaid_amount, Amount::new(-100));
    }

    #[test]
    fn test_on_credit_marker_moves_to_note() {
        let t = tx(1_000).with_description("외상");
        let enriched = TransactionEnricher::default().enrich(&t, vec![]);
        assert_eq!(enriched.description, "");
        assert_eq!(enriched.note, "외상");

        let other = tx(1_000).with_description("외상 거래");
        let enriched = TransactionEnricher::default().enrich(&other, vec![]);
        assert_eq!(enriched.description, "외상 거래");
        assert_eq!(enriched.note, "");
    }

    #[test]
    fn test_custom_marker() {
        let enricher = TransactionEnricher::new("credit");
        let t = tx(1_000).with_description("credit");
        let enriched = enricher.enrich(&t, vec![]);
        assert_eq!(enriched.note, "credit");
        assert_eq!(enriched.description, "");
    }

    #[test]
    fn test_serialized_field_names() {
        let t = tx(10_000);
        let enriched = TransactionEnricher::default().enrich(&t, paid(&t, &[1_000]));
        let json = serde_json::to_value(&enriched).unwrap();
        for field in [
            "id",
            "customer_id",
            "amount",
            "paid_amount",
            "unpaid_amount",
            "paid_ratio",
            "description",
            "note",
            "due_date",
            "status",
            "created_at",
            "payments",
        ] {
            assert!(json.get(field).is_some(), "missing field {field}");
        }
        assert_eq!(json["paid_amount"], 1_000);
        assert_eq!(json["status"], "unpaid");
    }
}
