//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for receivables types that give
//! more meaningful error messages than standard assertions.

use core_kernel::Amount;
use domain_receivables::{CustomerSummary, EnrichedTransaction};

/// Asserts that an enriched transaction's derived fields agree with its inputs
///
/// # Panics
///
/// Panics if the paid amount differs from the sum of attached payments or
/// if `unpaid != amount - paid`
pub fn assert_enrichment_consistent(tx: &EnrichedTransaction) {
    let paid: Amount = tx.payments.iter().map(|p| p.contribution()).sum();
    assert_eq!(
        tx.paid_amount, paid,
        "Paid amount {} does not match payments sum {} for {}",
        tx.paid_amount, paid, tx.id
    );
    assert_eq!(
        tx.unpaid_amount,
        tx.amount - tx.paid_amount,
        "Unpaid amount {} is not amount {} minus paid {} for {}",
        tx.unpaid_amount,
        tx.amount,
        tx.paid_amount,
        tx.id
    );
}

/// Asserts that a summary's totals equal the sums over its detail rows
///
/// Only meaningful when every transaction of the customer is in the detail.
pub fn assert_summary_totals_match_rows(summary: &CustomerSummary) {
    let amount: Amount = summary.transactions.iter().map(|tx| tx.amount).sum();
    let paid: Amount = summary.transactions.iter().map(|tx| tx.paid_amount).sum();

    assert_eq!(
        summary.total_amount, amount,
        "Total amount {} does not match row sum {}",
        summary.total_amount, amount
    );
    assert_eq!(
        summary.total_paid, paid,
        "Total paid {} does not match row sum {}",
        summary.total_paid, paid
    );
    assert_eq!(
        summary.total_unpaid,
        amount - paid,
        "Total unpaid {} is not {} - {}",
        summary.total_unpaid,
        amount,
        paid
    );
}

/// Asserts that detail rows are ordered newest first
pub fn assert_newest_first(transactions: &[EnrichedTransaction]) {
    for pair in transactions.windows(2) {
        assert!(
            pair[0].created_at >= pair[1].created_at,
            "Rows out of order: {} ({}) before {} ({})",
            pair[0].id,
            pair[0].created_at,
            pair[1].id,
            pair[1].created_at
        );
    }
}

/// Asserts that a result is Ok and returns the value
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
    ($result:expr, $msg:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("{}: {:?}", $msg, e),
        }
    };
}

/// Asserts that a result is Err and returns the error
#[macro_export]
macro_rules! assert_err {
    ($result:expr) => {
        match $result {
            Ok(value) => panic!("Expected Err, got Ok: {:?}", value),
            Err(e) => e,
        }
    };
}
