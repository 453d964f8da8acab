//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating receivables data. Amounts
//! stay well inside `i64` so sums over generated collections never overflow.

use chrono::{DateTime, Duration, TimeZone, Utc};
use core_kernel::{Amount, CustomerId, TransactionId};
use domain_receivables::{Payment, Transaction, TransactionStatus};
use proptest::prelude::*;

/// Strategy for transaction amounts, including refunds and zero
pub fn amount_units_strategy() -> impl Strategy<Value = i64> {
    -1_000_000i64..10_000_000i64
}

/// Strategy for positive sale amounts
pub fn sale_units_strategy() -> impl Strategy<Value = i64> {
    1i64..10_000_000i64
}

/// Strategy for a payment amount, possibly unrecorded
pub fn payment_units_strategy() -> impl Strategy<Value = Option<i64>> {
    prop_oneof![
        8 => (0i64..5_000_000i64).prop_map(Some),
        1 => Just(None),
    ]
}

/// Strategy for status tags, including an unrecognized one
pub fn status_strategy() -> impl Strategy<Value = TransactionStatus> {
    prop_oneof![
        4 => Just(TransactionStatus::Unpaid),
        2 => Just(TransactionStatus::Paid),
        1 => Just(TransactionStatus::Deleted),
        1 => Just(TransactionStatus::Other("disputed".to_string())),
    ]
}

/// Strategy for timestamps within 2024
pub fn timestamp_2024_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..366 * 24).prop_map(|hours| {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::hours(hours)
    })
}

/// Strategy for CustomerId
pub fn customer_id_strategy() -> impl Strategy<Value = CustomerId> {
    any::<[u8; 16]>().prop_map(|bytes| CustomerId::from_uuid(uuid::Uuid::from_bytes(bytes)))
}

/// Strategy for TransactionId
pub fn transaction_id_strategy() -> impl Strategy<Value = TransactionId> {
    any::<[u8; 16]>().prop_map(|bytes| TransactionId::from_uuid(uuid::Uuid::from_bytes(bytes)))
}

/// Strategy for a transaction of the given customer
pub fn transaction_strategy(customer_id: CustomerId) -> impl Strategy<Value = Transaction> {
    (
        transaction_id_strategy(),
        amount_units_strategy(),
        status_strategy(),
        timestamp_2024_strategy(),
    )
        .prop_map(move |(id, amount, status, created_at)| {
            let mut tx = Transaction::new(customer_id, Amount::new(amount))
                .with_status(status)
                .with_created_at(created_at);
            tx.id = id;
            tx
        })
}

/// Strategy for a transaction together with up to `max_payments` payments
pub fn transaction_with_payments_strategy(
    customer_id: CustomerId,
    max_payments: usize,
) -> impl Strategy<Value = (Transaction, Vec<Payment>)> {
    (
        transaction_strategy(customer_id),
        proptest::collection::vec(payment_units_strategy(), 0..=max_payments),
    )
        .prop_map(|(tx, amounts)| {
            let payments = amounts
                .into_iter()
                .map(|units| {
                    let mut payment = Payment::new(tx.id, Amount::ZERO).with_paid_at(tx.created_at);
                    payment.amount = units.map(Amount::new);
                    payment
                })
                .collect();
            (tx, payments)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn generated_payments_reference_their_transaction(
            (tx, payments) in transaction_with_payments_strategy(CustomerId::new(), 4)
        ) {
            prop_assert!(payments.len() <= 4);
            prop_assert!(payments.iter().all(|p| p.transaction_id == tx.id));
        }

        #[test]
        fn sale_amounts_are_positive(units in sale_units_strategy()) {
            prop_assert!(Amount::new(units).is_positive());
        }
    }
}
