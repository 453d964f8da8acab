//! Portfolio rollup
//!
//! Aggregates unpaid transactions across all customers into a grand total,
//! an aging series and a ranked list of top debtors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::fmt;

use core_kernel::{Amount, CustomerId};

use crate::enrichment::EnrichedTransaction;

/// Default number of ranked debtors
pub const DEFAULT_TOP_DEBTOR_LIMIT: usize = 5;

/// One point of the aging series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgingEntry {
    pub created_at: DateTime<Utc>,
    pub amount: Amount,
}

/// A customer ranked by outstanding balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopDebtor {
    pub customer_id: CustomerId,
    pub customer_name: Option<String>,
    pub unpaid_amount: Amount,
    pub transaction_count: u64,
}

/// The independently loaded parts of a rollup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollupView {
    TotalUnpaid,
    Aging,
    TopDebtors,
}

impl fmt::Display for RollupView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RollupView::TotalUnpaid => "total_unpaid",
            RollupView::Aging => "aging",
            RollupView::TopDebtors => "top_debtors",
        };
        f.write_str(name)
    }
}

/// Portfolio-level receivables position
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioRollup {
    pub total_unpaid: Amount,
    pub aging: Vec<AgingEntry>,
    pub top_debtors: Vec<TopDebtor>,
    /// Views that fell back to their empty default after a read failure
    pub degraded_views: Vec<RollupView>,
}

impl PortfolioRollup {
    pub fn is_degraded(&self) -> bool {
        !self.degraded_views.is_empty()
    }
}

/// Returns true if a transaction takes part in the rollup
///
/// Only transactions tagged "unpaid" with a non-zero amount count.
pub fn is_rollup_eligible(tx: &EnrichedTransaction) -> bool {
    tx.status.is_unpaid() && !tx.amount.is_zero()
}

/// Computes rollup views over enriched transactions
///
/// Each method filters its input with [`is_rollup_eligible`], so callers may
/// pass a broader set.
#[derive(Debug, Clone)]
pub struct PortfolioRollupBuilder {
    top_debtor_limit: usize,
}

impl Default for PortfolioRollupBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_DEBTOR_LIMIT)
    }
}

impl PortfolioRollupBuilder {
    pub fn new(top_debtor_limit: usize) -> Self {
        Self { top_debtor_limit }
    }

    pub fn top_debtor_limit(&self) -> usize {
        self.top_debtor_limit
    }

    /// Grand total unpaid: Σamount − Σpaid
    pub fn total_unpaid(&self, transactions: &[EnrichedTransaction]) -> Amount {
        let (amount, paid) = transactions
            .iter()
            .filter(|tx| is_rollup_eligible(tx))
            .fold((Amount::ZERO, Amount::ZERO), |(amount, paid), tx| {
                (amount + tx.amount, paid + tx.paid_amount)
            });
        amount - paid
    }

    /// `(created_at, amount)` pairs, oldest first
    pub fn aging_series(&self, transactions: &[EnrichedTransaction]) -> Vec<AgingEntry> {
        let mut eligible: Vec<&EnrichedTransaction> =
            transactions.iter().filter(|tx| is_rollup_eligible(tx)).collect();
        eligible.sort_by_key(|tx| (tx.created_at, tx.id));
        eligible
            .into_iter()
            .map(|tx| AgingEntry {
                created_at: tx.created_at,
                amount: tx.amount,
            })
            .collect()
    }

    /// Customers ranked by summed unpaid amount
    ///
    /// Each transaction adds only its positive balance, so an overpaid row
    /// never offsets the customer's other debts. Descending by amount, ties
    /// by customer id ascending. Customers with nothing owed are not ranked.
    /// Names are left empty.
    pub fn top_debtors(&self, transactions: &[EnrichedTransaction]) -> Vec<TopDebtor> {
        let mut per_customer: HashMap<CustomerId, (Amount, u64)> = HashMap::new();
        for tx in transactions.iter().filter(|tx| is_rollup_eligible(tx)) {
            let entry = per_customer.entry(tx.customer_id).or_insert((Amount::ZERO, 0));
            entry.0 += tx.unpaid_amount.clamp_non_negative();
            entry.1 += 1;
        }

        let mut ranked: Vec<TopDebtor> = per_customer
            .into_iter()
            .filter(|(_, (unpaid, _))| unpaid.is_positive())
            .map(|(customer_id, (unpaid_amount, transaction_count))| TopDebtor {
                customer_id,
                customer_name: None,
                unpaid_amount,
                transaction_count,
            })
            .collect();

        ranked.sort_by_key(|d| (Reverse(d.unpaid_amount), d.customer_id));
        ranked.truncate(self.top_debtor_limit);
        ranked
    }

    /// Computes all three views from one transaction set
    pub fn build(&self, transactions: &[EnrichedTransaction]) -> PortfolioRollup {
        PortfolioRollup {
            total_unpaid: self.total_unpaid(transactions),
            aging: self.aging_series(transactions),
            top_debtors: self.top_debtors(transactions),
            degraded_views: Vec::new(),
        }
    }
}
