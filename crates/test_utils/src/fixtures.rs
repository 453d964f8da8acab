//! Pre-built Test Fixtures
//!
//! Ready-to-use instants and ledgers. The numbers here are relied on by
//! tests across the workspace, so change them together with their callers.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use domain_receivables::Customer;

use crate::builders::{Ledger, LedgerBuilder, SaleSpec};

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Start of the fixture books (May 1, 2024 00:00 UTC)
    pub fn book_opened() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()
    }

    /// Reporting instant used by dashboard tests (June 10, 2024 00:00 UTC,
    /// 09:00 in Seoul)
    pub fn reporting_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap()
    }

    pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }
}

/// Customer names used by [`ScenarioFixtures::two_customer_book`]
pub const WHOLESALE_CUSTOMER: &str = "한빛상사";
pub const RETAIL_CUSTOMER: &str = "가람식당";

/// Fixture for complete ledgers
pub struct ScenarioFixtures;

impl ScenarioFixtures {
    /// Two customers with a mix of open, overdue, and settled sales
    ///
    /// | customer | amount | paid        | due        | status |
    /// |----------|--------|-------------|------------|--------|
    /// | 한빛상사 | 10000  | 3000 + 2000 | 2024-06-20 | unpaid |
    /// | 한빛상사 | 5000   | -           | 2024-06-05 | unpaid |
    /// | 가람식당 | 2000   | 500         | -          | unpaid |
    /// | 가람식당 | 1000   | 1000        | -          | paid   |
    ///
    /// Expected per-customer totals: 한빛상사 15000/5000/10000 (33%),
    /// 가람식당 3000/1500/1500 (50%). Rollup total unpaid is 11500.
    pub fn two_customer_book() -> Ledger {
        let (builder, wholesale) = LedgerBuilder::new().customer(
            Customer::new(WHOLESALE_CUSTOMER)
                .with_types(["도매"])
                .with_mobile("010-1234-5678"),
        );
        let (builder, retail) = builder.customer(
            Customer::new(RETAIL_CUSTOMER)
                .with_legacy_type("소매")
                .with_phone("02-555-0100"),
        );

        builder
            .sale(
                wholesale,
                10_000,
                &[3_000, 2_000],
                SaleSpec::default()
                    .described("외상")
                    .due(TemporalFixtures::date(2024, 6, 20))
                    .at(Utc.with_ymd_and_hms(2024, 5, 2, 1, 0, 0).unwrap()),
            )
            .sale(
                wholesale,
                5_000,
                &[],
                SaleSpec::default()
                    .described("부품 납품")
                    .due(TemporalFixtures::date(2024, 6, 5))
                    .at(Utc.with_ymd_and_hms(2024, 5, 4, 1, 0, 0).unwrap()),
            )
            .sale(
                retail,
                2_000,
                &[500],
                SaleSpec::default().at(Utc.with_ymd_and_hms(2024, 6, 1, 3, 0, 0).unwrap()),
            )
            .sale(
                retail,
                1_000,
                &[1_000],
                SaleSpec::default()
                    .status("paid")
                    .at(Utc.with_ymd_and_hms(2024, 5, 20, 3, 0, 0).unwrap()),
            )
            .build()
    }
}
