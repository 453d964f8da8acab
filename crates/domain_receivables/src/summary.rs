//! Customer summary construction
//!
//! Every per-customer figure shown anywhere (summary endpoint, statement
//! export, SMS content, cross-customer overview) is produced here so the
//! arithmetic cannot drift between consumers.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use tracing::{debug, warn};

use core_kernel::{percentage, Amount, CustomerId};

use crate::enrichment::{EnrichedTransaction, TransactionEnricher};
use crate::payment::{Payment, PaymentAggregator};
use crate::transaction::Transaction;

/// Folded totals over a set of enriched transactions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryTotals {
    pub total_amount: Amount,
    pub total_paid: Amount,
    pub total_unpaid: Amount,
    pub total_ratio: i64,
}

impl SummaryTotals {
    /// Folds enriched transactions into totals
    ///
    /// `total_unpaid` is derived from the folded amount and paid sums, not
    /// from per-transaction unpaid values.
    pub fn from_enriched<'a, I>(transactions: I) -> Self
    where
        I: IntoIterator<Item = &'a EnrichedTransaction>,
    {
        let (total_amount, total_paid) = transactions
            .into_iter()
            .fold((Amount::ZERO, Amount::ZERO), |(amount, paid), tx| {
                (amount + tx.amount, paid + tx.paid_amount)
            });
        Self::from_sums(total_amount, total_paid)
    }

    /// Builds totals from billed and paid sums
    pub fn from_sums(total_amount: Amount, total_paid: Amount) -> Self {
        Self {
            total_amount,
            total_paid,
            total_unpaid: total_amount - total_paid,
            total_ratio: percentage(total_paid, total_amount),
        }
    }
}

/// A customer's receivables position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub customer_id: CustomerId,
    pub total_amount: Amount,
    pub total_paid: Amount,
    pub total_unpaid: Amount,
    pub total_ratio: i64,
    /// Exact count from the count query, independent of `transactions.len()`
    pub transaction_count: u64,
    /// Newest first
    pub transactions: Vec<EnrichedTransaction>,
}

impl CustomerSummary {
    pub fn totals(&self) -> SummaryTotals {
        SummaryTotals {
            total_amount: self.total_amount,
            total_paid: self.total_paid,
            total_unpaid: self.total_unpaid,
            total_ratio: self.total_ratio,
        }
    }
}

/// Builds [`CustomerSummary`] values from raw records
#[derive(Debug, Clone, Default)]
pub struct CustomerSummaryBuilder {
    enricher: TransactionEnricher,
}

impl CustomerSummaryBuilder {
    pub fn new(enricher: TransactionEnricher) -> Self {
        Self { enricher }
    }

    pub fn enricher(&self) -> &TransactionEnricher {
        &self.enricher
    }

    /// Builds a summary for one customer
    ///
    /// # Arguments
    ///
    /// * `customer_id` - Customer being summarized
    /// * `transactions` - Transaction details fetched for the customer
    /// * `payments` - Payments for those transactions, in any order
    /// * `transaction_count` - Exact count obtained from a separate count read
    ///
    /// Transactions owned by another customer are skipped. Payments whose
    /// transaction is not among `transactions` are ignored.
    pub fn build(
        &self,
        customer_id: CustomerId,
        transactions: &[Transaction],
        payments: Vec<Payment>,
        transaction_count: u64,
    ) -> CustomerSummary {
        let mut by_transaction = PaymentAggregator::group_by_transaction(payments);

        let mut enriched: Vec<EnrichedTransaction> = transactions
            .iter()
            .filter(|tx| {
                if tx.customer_id != customer_id {
                    warn!(
                        transaction_id = %tx.id,
                        owner = %tx.customer_id,
                        customer_id = %customer_id,
                        "Skipping transaction owned by another customer"
                    );
                    return false;
                }
                true
            })
            .map(|tx| {
                let payments = by_transaction.remove(&tx.id).unwrap_or_default();
                self.enricher.enrich(tx, payments)
            })
            .collect();

        if !by_transaction.is_empty() {
            debug!(
                customer_id = %customer_id,
                orphaned = by_transaction.len(),
                "Ignoring payments without a matching transaction"
            );
        }

        enriched.sort_by_key(|tx| (Reverse(tx.created_at), tx.id));

        let totals = SummaryTotals::from_enriched(&enriched);
        if enriched.len() as u64 != transaction_count {
            debug!(
                customer_id = %customer_id,
                detail_rows = enriched.len(),
                transaction_count,
                "Transaction count differs from detail rows"
            );
        }

        CustomerSummary {
            customer_id,
            total_amount: totals.total_amount,
            total_paid: totals.total_paid,
            total_unpaid: totals.total_unpaid,
            total_ratio: totals.total_ratio,
            transaction_count,
            transactions: enriched,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn test_empty_summary() {
        let customer = CustomerId::new();
        let summary = CustomerSummaryBuilder::default().build(customer, &[], vec![], 0);
        assert_eq!(summary.totals(), SummaryTotals::default());
        assert!(summary.transactions.is_empty());
    }

    #[test]
    fn test_transactions_are_newest_first() {
        let customer = CustomerId::new();
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let old = Transaction::new(customer, Amount::new(100)).with_created_at(base);
        let new = Transaction::new(customer, Amount::new(200))
            .with_created_at(base + Duration::days(3));
        let mid = Transaction::new(customer, Amount::new(300))
            .with_created_at(base + Duration::days(1));

        let summary = CustomerSummaryBuilder::default().build(
            customer,
            &[old.clone(), new.clone(), mid.clone()],
            vec![],
            3,
        );
        let order: Vec<_> = summary.transactions.iter().map(|t| t.id).collect();
        assert_eq!(order, vec![new.id, mid.id, old.id]);
    }

    #[test]
    fn test_foreign_transactions_are_skipped() {
        let customer = CustomerId::new();
        let mine = Transaction::new(customer, Amount::new(1_000));
        let theirs = Transaction::new(CustomerId::new(), Amount::new(9_000));

        let summary = CustomerSummaryBuilder::default().build(customer, &[mine, theirs], vec![], 2);
        assert_eq!(summary.transactions.len(), 1);
        assert_eq!(summary.total_amount, Amount::new(1_000));
        assert_eq!(summary.transaction_count, 2);
    }

    #[test]
    fn test_orphan_payments_are_ignored() {
        let customer = CustomerId::new();
        let tx = Transaction::new(customer, Amount::new(1_000));
        let payments = vec![
            Payment::new(tx.id, Amount::new(400)),
            Payment::new(core_kernel::TransactionId::new(), Amount::new(999)),
        ];

        let summary = CustomerSummaryBuilder::default().build(customer, &[tx], payments, 1);
        assert_eq!(summary.total_paid, Amount::new(400));
        assert_eq!(summary.total_unpaid, Amount::new(600));
        assert_eq!(summary.total_ratio, 40);
    }
}
