//! Comprehensive tests for domain_receivables

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use std::sync::Arc;

use core_kernel::{Amount, CustomerId};

use domain_receivables::ports::mock::{MockOperation, MockReceivablesPort};
use domain_receivables::{
    Customer, CustomerSummaryBuilder, DashboardView, ErrorKind, Payment, PortfolioRollupBuilder,
    ReceivablesConfig, ReceivablesService, RollupView, Transaction, TransactionEnricher,
};
use test_utils::{
    assert_enrichment_consistent, assert_err, assert_newest_first,
    assert_summary_totals_match_rows,
};

fn payments_for(tx: &Transaction, amounts: &[i64]) -> Vec<Payment> {
    amounts
        .iter()
        .map(|a| Payment::new(tx.id, Amount::new(*a)))
        .collect()
}

/// Customer with T1(10000, [3000, 2000]) and T2(5000, [])
struct Scenario {
    customer: Customer,
    t1: Transaction,
    t2: Transaction,
    payments: Vec<Payment>,
}

fn scenario() -> Scenario {
    let customer = Customer::new("한빛상사").with_types(["도매"]);
    let base = Utc.with_ymd_and_hms(2024, 5, 2, 1, 0, 0).unwrap();
    let t1 = Transaction::new(customer.id, Amount::new(10_000)).with_created_at(base);
    let t2 = Transaction::new(customer.id, Amount::new(5_000))
        .with_created_at(base + Duration::days(2));
    let payments = payments_for(&t1, &[3_000, 2_000]);
    Scenario {
        customer,
        t1,
        t2,
        payments,
    }
}

async fn service_for(scenario: &Scenario) -> (Arc<MockReceivablesPort>, ReceivablesService) {
    let port = Arc::new(
        MockReceivablesPort::with_data(
            vec![scenario.customer.clone()],
            vec![scenario.t1.clone(), scenario.t2.clone()],
            scenario.payments.clone(),
        )
        .await,
    );
    let service = ReceivablesService::new(port.clone(), ReceivablesConfig::default());
    (port, service)
}

// ============================================================================
// Enrichment Tests
// ============================================================================

mod enrichment_tests {
    use super::*;

    #[test]
    fn test_ratio_boundaries() {
        let enricher = TransactionEnricher::default();
        let customer = CustomerId::new();
        for (amount, paid, expected) in [(3, 1, 33), (3, 2, 67), (2, 1, 50), (200, 1, 1), (-200, 1, -1)] {
            let tx = Transaction::new(customer, Amount::new(amount));
            let enriched = enricher.enrich(&tx, payments_for(&tx, &[paid]));
            assert_eq!(enriched.paid_ratio, expected, "amount={amount} paid={paid}");
        }
    }

    #[test]
    fn test_unpaid_is_exact_including_overpayment() {
        let enricher = TransactionEnricher::default();
        let tx = Transaction::new(CustomerId::new(), Amount::new(5_000));
        let enriched = enricher.enrich(&tx, payments_for(&tx, &[4_000, 3_000]));
        assert_eq!(enriched.unpaid_amount, Amount::new(-2_000));
        assert_eq!(enriched.paid_ratio, 140);
    }

    #[test]
    fn test_enrichment_is_idempotent() {
        let enricher = TransactionEnricher::default();
        let tx = Transaction::new(CustomerId::new(), Amount::new(7_000)).with_description("외상");
        let payments = payments_for(&tx, &[1_000]);

        let first = enricher.enrich(&tx, payments.clone());
        let second = enricher.enrich(&tx, payments);
        assert_eq!(first, second);
    }

    #[test]
    fn test_on_credit_marker() {
        let enricher = TransactionEnricher::default();
        let tx = Transaction::new(CustomerId::new(), Amount::new(1)).with_description("외상");
        let enriched = enricher.enrich(&tx, vec![]);
        assert_eq!((enriched.description.as_str(), enriched.note.as_str()), ("", "외상"));

        let plain = Transaction::new(CustomerId::new(), Amount::new(1)).with_description("부품 대금");
        let enriched = enricher.enrich(&plain, vec![]);
        assert_eq!((enriched.description.as_str(), enriched.note.as_str()), ("부품 대금", ""));
    }
}

// ============================================================================
// Summary Tests
// ============================================================================

mod summary_tests {
    use super::*;

    #[test]
    fn test_end_to_end_scenario() {
        let s = scenario();
        let summary = CustomerSummaryBuilder::default().build(
            s.customer.id,
            &[s.t1.clone(), s.t2.clone()],
            s.payments.clone(),
            2,
        );

        assert_eq!(summary.total_amount, Amount::new(15_000));
        assert_eq!(summary.total_paid, Amount::new(5_000));
        assert_eq!(summary.total_unpaid, Amount::new(10_000));
        assert_eq!(summary.total_ratio, 33);
        assert_eq!(summary.transaction_count, 2);

        // newest first: T2 was created after T1
        let t2 = &summary.transactions[0];
        let t1 = &summary.transactions[1];
        assert_eq!(t2.id, s.t2.id);
        assert_eq!((t2.paid_amount, t2.unpaid_amount, t2.paid_ratio), (Amount::ZERO, Amount::new(5_000), 0));
        assert_eq!(t1.id, s.t1.id);
        assert_eq!((t1.paid_amount, t1.unpaid_amount, t1.paid_ratio), (Amount::new(5_000), Amount::new(5_000), 50));
    }

    #[test]
    fn test_total_paid_equals_sum_of_paid_amounts() {
        let s = scenario();
        let summary = CustomerSummaryBuilder::default().build(
            s.customer.id,
            &[s.t1.clone(), s.t2.clone()],
            s.payments.clone(),
            2,
        );
        let paid: Amount = summary.transactions.iter().map(|t| t.paid_amount).sum();
        assert_eq!(summary.total_paid, paid);
    }

    #[test]
    fn test_summary_serialized_fields() {
        let s = scenario();
        let summary = CustomerSummaryBuilder::default().build(s.customer.id, &[s.t1.clone()], s.payments.clone(), 1);
        let json = serde_json::to_value(&summary).unwrap();
        for field in [
            "customer_id",
            "total_amount",
            "total_paid",
            "total_unpaid",
            "total_ratio",
            "transaction_count",
            "transactions",
        ] {
            assert!(json.get(field).is_some(), "missing field {field}");
        }
        assert_eq!(json["total_unpaid"], 5_000);
        assert_eq!(json["transactions"][0]["payments"].as_array().unwrap().len(), 2);
    }
}

// ============================================================================
// Service Tests
// ============================================================================

mod service_tests {
    use super::*;

    #[tokio::test]
    async fn test_customer_summary_end_to_end() {
        let s = scenario();
        let (_, service) = service_for(&s).await;

        let summary = service.customer_summary(&s.customer.id.to_string()).await.unwrap();
        assert_summary_totals_match_rows(&summary);
        assert_newest_first(&summary.transactions);
        assert_eq!(summary.customer_id, s.customer.id);
        assert_eq!(summary.total_amount, Amount::new(15_000));
        assert_eq!(summary.total_unpaid, Amount::new(10_000));
        assert_eq!(summary.total_ratio, 33);
        assert_eq!(summary.transaction_count, 2);
    }

    #[tokio::test]
    async fn test_count_is_independent_of_detail_rows() {
        let s = scenario();
        let (port, service) = service_for(&s).await;
        port.set_detail_limit(Some(1)).await;

        let summary = service.customer_summary_for(s.customer.id).await.unwrap();
        assert_eq!(summary.transactions.len(), 1);
        assert_eq!(summary.transaction_count, 2);
    }

    #[tokio::test]
    async fn test_invalid_and_unknown_customer() {
        let s = scenario();
        let (_, service) = service_for(&s).await;

        let empty = assert_err!(service.customer_summary("").await);
        assert_eq!(empty.kind(), ErrorKind::InvalidArgument);

        let malformed = assert_err!(service.customer_summary("not-an-id").await);
        assert_eq!(malformed.kind(), ErrorKind::InvalidArgument);

        let unknown = assert_err!(service.customer_summary(&CustomerId::new().to_string()).await);
        assert_eq!(unknown.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_dependency_failures_yield_no_partial_result() {
        for operation in [
            MockOperation::CustomerExists,
            MockOperation::CountTransactions,
            MockOperation::FetchTransactions,
            MockOperation::FetchPayments,
        ] {
            let s = scenario();
            let (port, service) = service_for(&s).await;
            port.fail(operation).await;

            let err = service.customer_summary_for(s.customer.id).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::DependencyFailure, "operation {operation}");
        }
    }

    #[tokio::test]
    async fn test_statement_and_sms_variables() {
        let s = scenario();
        let (_, service) = service_for(&s).await;
        let raw_id = s.customer.id.to_string();

        let statement = service.statement(&raw_id).await.unwrap();
        assert_eq!(statement.customer_name, "한빛상사");
        assert_eq!(statement.rows.len(), 2);
        assert_eq!(statement.totals.total_unpaid, Amount::new(10_000));
        // created 2024-05-04 10:00 Seoul
        assert_eq!(statement.rows[0].date, NaiveDate::from_ymd_opt(2024, 5, 4).unwrap());

        let sms = service.sms_variables(&raw_id).await.unwrap();
        assert_eq!(
            sms.render("{고객명}님 미수금 {미수금}원 ({거래건수}건){서명}"),
            "한빛상사님 미수금 10,000원 (2건)"
        );
    }

    #[tokio::test]
    async fn test_transaction_overview_excludes_deleted() {
        let s = scenario();
        let (port, service) = service_for(&s).await;

        let other = Customer::new("가나상회");
        port.insert_customer(other.clone()).await;
        let open = Transaction::new(other.id, Amount::new(2_000));
        port.insert_payment(Payment::new(open.id, Amount::new(500))).await;
        port.insert_transaction(open).await;
        port.insert_transaction(
            Transaction::new(other.id, Amount::new(99_000)).with_status("deleted"),
        )
        .await;

        let overview = service.transaction_overview().await.unwrap();
        assert_eq!(overview.data.len(), 2);
        assert_eq!(overview.data[0].customer_name, "가나상회");
        assert_eq!(overview.data[0].transaction_count, 1);
        assert_eq!(overview.data[0].total_unpaid, Amount::new(1_500));
        assert_eq!(overview.data[1].total_ratio, 33);

        assert_eq!(overview.global.total_transactions, 3);
        assert_eq!(overview.global.total_customers, 2);
        assert_eq!(overview.global.total_amount, Amount::new(17_000));
        assert_eq!(overview.global.total_paid, Amount::new(5_500));
        assert_eq!(overview.global.total_unpaid, Amount::new(11_500));
        assert_eq!(overview.global.paid_ratio, 32);
    }
}

// ============================================================================
// Rollup Tests
// ============================================================================

mod rollup_tests {
    use super::*;

    #[tokio::test]
    async fn test_rollup_without_unpaid_transactions() {
        let customer = Customer::new("정산완료");
        let paid = Transaction::new(customer.id, Amount::new(1_000)).with_status("paid");
        let port = Arc::new(MockReceivablesPort::with_data(vec![customer], vec![paid], vec![]).await);
        let service = ReceivablesService::new(port, ReceivablesConfig::default());

        let rollup = service.portfolio_rollup().await;
        assert_eq!(rollup.total_unpaid, Amount::ZERO);
        assert!(rollup.aging.is_empty());
        assert!(rollup.top_debtors.is_empty());
        assert!(rollup.degraded_views.is_empty());
    }

    #[tokio::test]
    async fn test_rollup_attaches_debtor_names() {
        let s = scenario();
        let (_, service) = service_for(&s).await;

        let rollup = service.portfolio_rollup().await;
        assert_eq!(rollup.total_unpaid, Amount::new(10_000));
        assert_eq!(rollup.aging.len(), 2);
        assert_eq!(rollup.aging[0].amount, Amount::new(10_000));
        assert_eq!(rollup.top_debtors.len(), 1);
        assert_eq!(rollup.top_debtors[0].customer_name.as_deref(), Some("한빛상사"));
        assert_eq!(rollup.top_debtors[0].unpaid_amount, Amount::new(10_000));
    }

    #[tokio::test]
    async fn test_one_failed_view_does_not_fail_the_others() {
        let s = scenario();
        let (port, service) = service_for(&s).await;
        // the total is loaded first; only its transaction read fails
        port.fail_times(MockOperation::FetchTransactions, 1).await;

        let rollup = service.portfolio_rollup().await;
        assert_eq!(rollup.degraded_views, vec![RollupView::TotalUnpaid]);
        assert_eq!(rollup.total_unpaid, Amount::ZERO);
        assert_eq!(rollup.aging.len(), 2);
        assert_eq!(rollup.top_debtors.len(), 1);
    }

    #[tokio::test]
    async fn test_name_lookup_failure_is_not_a_degraded_view() {
        let s = scenario();
        let (port, service) = service_for(&s).await;
        port.fail(MockOperation::FetchCustomers).await;

        let rollup = service.portfolio_rollup().await;
        assert!(rollup.degraded_views.is_empty());
        assert_eq!(rollup.top_debtors[0].customer_name, None);
    }

    #[test]
    fn test_top_debtor_limit_defaults_to_five() {
        assert_eq!(PortfolioRollupBuilder::default().top_debtor_limit(), 5);
        assert_eq!(ReceivablesConfig::default().top_debtor_limit, 5);
    }
}

// ============================================================================
// Dashboard Tests
// ============================================================================

mod dashboard_tests {
    use super::*;

    #[tokio::test]
    async fn test_dashboard_views() {
        let customer = Customer::new("한빛상사").with_types(["도매"]);
        // 2024-06-10 09:00 Seoul
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap();
        let due_soon = Transaction::new(customer.id, Amount::new(4_000))
            .with_created_at(now - Duration::days(20))
            .with_due_date(NaiveDate::from_ymd_opt(2024, 6, 20).unwrap());
        let late = Transaction::new(customer.id, Amount::new(6_000))
            .with_created_at(now - Duration::days(60))
            .with_due_date(NaiveDate::from_ymd_opt(2024, 5, 31).unwrap());
        let payments = payments_for(&late, &[1_000]);

        let port = Arc::new(
            MockReceivablesPort::with_data(vec![customer.clone()], vec![due_soon, late], payments).await,
        );
        let service = ReceivablesService::new(port, ReceivablesConfig::default());

        let dashboard = service.dashboard(now).await;
        assert!(dashboard.degraded_views.is_empty());
        assert_eq!(dashboard.as_of, NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
        assert_eq!(dashboard.rollup.total_unpaid, Amount::new(9_000));

        let months: Vec<String> = dashboard.monthly_unpaid.iter().map(|m| m.month.to_string()).collect();
        assert_eq!(months, vec!["2024-04", "2024-05"]);
        assert_eq!(dashboard.monthly_sales[1].total, Amount::new(4_000));

        assert_eq!(dashboard.customer_type_unpaid.len(), 1);
        assert_eq!(dashboard.customer_type_unpaid[0].total, Amount::new(9_000));

        assert_eq!(dashboard.due_this_month.summary.count, 1);
        assert_eq!(dashboard.due_this_month.rows[0].line.customer_name, "한빛상사");
        assert_eq!(dashboard.overdue.summary.count, 1);
        assert_eq!(dashboard.overdue.rows[0].overdue_days, 10);
        assert_eq!(dashboard.overdue.summary.total_unpaid, Amount::new(5_000));
    }

    #[tokio::test]
    async fn test_dashboard_lists_every_degraded_view() {
        let s = scenario();
        let (port, service) = service_for(&s).await;
        port.fail(MockOperation::FetchPayments).await;
        // scenario transactions have no due date, so the schedules read no payments
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 0, 0, 0).unwrap();

        let dashboard = service.dashboard(now).await;
        assert_eq!(
            dashboard.degraded_views,
            vec![
                DashboardView::TotalUnpaid,
                DashboardView::Aging,
                DashboardView::TopDebtors,
                DashboardView::MonthlyUnpaid,
                DashboardView::MonthlySales,
                DashboardView::CustomerTypeUnpaid,
            ]
        );
        assert!(dashboard.monthly_sales.is_empty());
        assert!(dashboard.customer_type_unpaid.is_empty());
    }
}

// ============================================================================
// Property Tests
// ============================================================================

mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use test_utils::{
        customer_id_strategy, sale_units_strategy, timestamp_2024_strategy,
        transaction_with_payments_strategy,
    };

    proptest! {
        #[test]
        fn unpaid_is_amount_minus_paid(
            (tx, payments) in transaction_with_payments_strategy(CustomerId::new(), 6)
        ) {
            let enriched = TransactionEnricher::default().enrich(&tx, payments);
            assert_enrichment_consistent(&enriched);
            if tx.amount == Amount::ZERO {
                prop_assert_eq!(enriched.paid_ratio, 0);
            }
        }

        #[test]
        fn summary_totals_are_consistent(
            (customer, records) in customer_id_strategy().prop_flat_map(|customer| {
                (
                    Just(customer),
                    proptest::collection::vec(transaction_with_payments_strategy(customer, 3), 0..10),
                )
            })
        ) {
            let txs: Vec<Transaction> = records.iter().map(|(tx, _)| tx.clone()).collect();
            let payments: Vec<Payment> = records.into_iter().flat_map(|(_, p)| p).collect();

            let summary = CustomerSummaryBuilder::default().build(customer, &txs, payments, txs.len() as u64);
            assert_summary_totals_match_rows(&summary);
            assert_newest_first(&summary.transactions);
            prop_assert_eq!(summary.transaction_count, txs.len() as u64);
        }

        #[test]
        fn unpaid_sales_roll_up_to_their_sum(
            sales in proptest::collection::vec((sale_units_strategy(), timestamp_2024_strategy()), 0..10)
        ) {
            let customer = CustomerId::new();
            let enricher = TransactionEnricher::default();
            let enriched: Vec<_> = sales
                .iter()
                .map(|(units, at)| {
                    let tx = Transaction::new(customer, Amount::new(*units)).with_created_at(*at);
                    enricher.enrich(&tx, vec![])
                })
                .collect();

            let rollup = PortfolioRollupBuilder::default().build(&enriched);
            let expected: i64 = sales.iter().map(|(units, _)| units).sum();
            prop_assert_eq!(rollup.total_unpaid, Amount::new(expected));
            prop_assert_eq!(rollup.aging.len(), sales.len());
            prop_assert!(rollup.aging.windows(2).all(|w| w[0].created_at <= w[1].created_at));
            prop_assert_eq!(rollup.top_debtors.len(), usize::from(!sales.is_empty()));
        }
    }
}
