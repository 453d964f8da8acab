//! Dashboard statistics
//!
//! Pure computations over enriched transactions. Record selection (status
//! filters, lookback window, due-date ranges) is done by the caller through
//! [`TransactionFilter`](crate::ports::TransactionFilter); the functions
//! here re-apply the status rules so they stay correct on broader input.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use core_kernel::{rounded_mean, Amount, CustomerId, Month, TemporalError, Timezone, TransactionId};

use crate::customer::Customer;
use crate::enrichment::EnrichedTransaction;
use crate::rollup::{PortfolioRollup, RollupView};
use crate::transaction::TransactionStatus;

const SECONDS_PER_DAY: i64 = 86_400;

/// Total for one calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    pub month: Month,
    pub total: Amount,
}

/// Outstanding balance credited to one customer type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeTotal {
    pub customer_type: String,
    pub total: Amount,
}

/// Transaction fields shared by the due and overdue listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleLine {
    pub id: TransactionId,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub amount: Amount,
    pub paid_amount: Amount,
    pub unpaid_amount: Amount,
    pub paid_ratio: i64,
    pub due_date: NaiveDate,
    pub status: TransactionStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueRow {
    #[serde(flatten)]
    pub line: ScheduleLine,
    /// Whole days until the due date, rounded up
    pub days_left: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverdueRow {
    #[serde(flatten)]
    pub line: ScheduleLine,
    /// Whole days past the due date, rounded down
    pub overdue_days: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueSummary {
    pub count: u64,
    pub total_amount: Amount,
    pub total_unpaid: Amount,
    pub avg_paid_ratio: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverdueSummary {
    pub count: u64,
    pub total_amount: Amount,
    pub total_unpaid: Amount,
    pub avg_overdue_days: i64,
}

/// Transactions falling due in the current business month
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueSchedule {
    pub rows: Vec<DueRow>,
    pub summary: DueSummary,
}

/// Transactions whose due date has passed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverdueSchedule {
    pub rows: Vec<OverdueRow>,
    pub summary: OverdueSummary,
}

/// Every independently loaded dashboard view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardView {
    TotalUnpaid,
    Aging,
    TopDebtors,
    MonthlyUnpaid,
    MonthlySales,
    CustomerTypeUnpaid,
    DueThisMonth,
    Overdue,
}

impl From<RollupView> for DashboardView {
    fn from(view: RollupView) -> Self {
        match view {
            RollupView::TotalUnpaid => DashboardView::TotalUnpaid,
            RollupView::Aging => DashboardView::Aging,
            RollupView::TopDebtors => DashboardView::TopDebtors,
        }
    }
}

impl fmt::Display for DashboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DashboardView::TotalUnpaid => "total_unpaid",
            DashboardView::Aging => "aging",
            DashboardView::TopDebtors => "top_debtors",
            DashboardView::MonthlyUnpaid => "monthly_unpaid",
            DashboardView::MonthlySales => "monthly_sales",
            DashboardView::CustomerTypeUnpaid => "customer_type_unpaid",
            DashboardView::DueThisMonth => "due_this_month",
            DashboardView::Overdue => "overdue",
        };
        f.write_str(name)
    }
}

/// The full dashboard payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
    /// Business date the dashboard was computed for
    pub as_of: NaiveDate,
    pub rollup: PortfolioRollup,
    pub monthly_unpaid: Vec<MonthlyTotal>,
    pub monthly_sales: Vec<MonthlyTotal>,
    pub customer_type_unpaid: Vec<TypeTotal>,
    pub due_this_month: DueSchedule,
    pub overdue: OverdueSchedule,
    pub degraded_views: Vec<DashboardView>,
}

/// Calendar-aware statistics over enriched transactions
#[derive(Debug, Clone)]
pub struct DashboardStatistics {
    timezone: Timezone,
    lookback_months: u32,
}

impl DashboardStatistics {
    pub fn new(timezone: Timezone, lookback_months: u32) -> Self {
        Self {
            timezone,
            lookback_months,
        }
    }

    pub fn timezone(&self) -> Timezone {
        self.timezone
    }

    /// Business date of an instant
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        self.timezone.local_date(now)
    }

    /// Start of the monthly statistics window
    ///
    /// Midnight on the first day of the month `lookback_months` before the
    /// month containing `now`.
    pub fn lookback_start(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, TemporalError> {
        let first = self
            .timezone
            .month_of(now)
            .minus_months(self.lookback_months)
            .first_day()?;
        Ok(self.midnight(first))
    }

    /// `[first day, first day of next month)` of the business month of `now`
    pub fn current_month_range(
        &self,
        now: DateTime<Utc>,
    ) -> Result<(NaiveDate, NaiveDate), TemporalError> {
        self.timezone.month_of(now).date_range()
    }

    /// Σ max(unpaid, 0) per creation month for transactions not tagged "paid"
    pub fn monthly_unpaid(&self, transactions: &[EnrichedTransaction]) -> Vec<MonthlyTotal> {
        self.bucket_by_month(
            transactions.iter().filter(|tx| !tx.status.is_paid()),
            |tx| tx.unpaid_amount.clamp_non_negative(),
        )
    }

    /// Σ amount per creation month
    pub fn monthly_sales(&self, transactions: &[EnrichedTransaction]) -> Vec<MonthlyTotal> {
        self.bucket_by_month(transactions.iter(), |tx| tx.amount)
    }

    fn bucket_by_month<'a, I, F>(&self, transactions: I, value: F) -> Vec<MonthlyTotal>
    where
        I: Iterator<Item = &'a EnrichedTransaction>,
        F: Fn(&EnrichedTransaction) -> Amount,
    {
        let mut buckets: BTreeMap<Month, Amount> = BTreeMap::new();
        for tx in transactions {
            *buckets.entry(self.timezone.month_of(tx.created_at)).or_default() += value(tx);
        }
        buckets
            .into_iter()
            .map(|(month, total)| MonthlyTotal { month, total })
            .collect()
    }

    /// Outstanding balance per customer type
    ///
    /// Each customer's Σ max(unpaid, 0) is credited in full to every one of
    /// its effective types. Sorted by total descending, ties by type name.
    pub fn customer_type_unpaid(
        &self,
        customers: &[Customer],
        transactions: &[EnrichedTransaction],
    ) -> Vec<TypeTotal> {
        let mut per_customer: HashMap<CustomerId, Amount> = HashMap::new();
        for tx in transactions {
            *per_customer.entry(tx.customer_id).or_default() +=
                tx.unpaid_amount.clamp_non_negative();
        }

        let mut per_type: HashMap<String, Amount> = HashMap::new();
        for customer in customers {
            let unpaid = per_customer.get(&customer.id).copied().unwrap_or_default();
            for customer_type in customer.effective_types() {
                *per_type.entry(customer_type).or_default() += unpaid;
            }
        }

        let mut totals: Vec<TypeTotal> = per_type
            .into_iter()
            .map(|(customer_type, total)| TypeTotal { customer_type, total })
            .collect();
        totals.sort_by(|a, b| {
            Reverse(a.total)
                .cmp(&Reverse(b.total))
                .then_with(|| a.customer_type.cmp(&b.customer_type))
        });
        totals
    }

    /// Unsettled transactions due within the business month of `now`
    pub fn due_this_month(
        &self,
        transactions: &[EnrichedTransaction],
        names: &HashMap<CustomerId, String>,
        now: DateTime<Utc>,
    ) -> Result<DueSchedule, TemporalError> {
        let (from, before) = self.current_month_range(now)?;

        let rows: Vec<DueRow> = self
            .schedule_lines(transactions, names, |due| due >= from && due < before)
            .into_iter()
            .map(|line| {
                let seconds = (self.midnight(line.due_date) - now).num_seconds();
                DueRow {
                    days_left: ceil_days(seconds),
                    line,
                }
            })
            .collect();

        let ratios: Vec<i64> = rows.iter().map(|r| r.line.paid_ratio).collect();
        let summary = DueSummary {
            count: rows.len() as u64,
            total_amount: rows.iter().map(|r| r.line.amount).sum(),
            total_unpaid: rows.iter().map(|r| r.line.unpaid_amount).sum(),
            avg_paid_ratio: rounded_mean(&ratios),
        };
        Ok(DueSchedule { rows, summary })
    }

    /// Unsettled transactions whose due date is before the business date of `now`
    pub fn overdue(
        &self,
        transactions: &[EnrichedTransaction],
        names: &HashMap<CustomerId, String>,
        now: DateTime<Utc>,
    ) -> OverdueSchedule {
        let today = self.today(now);

        let rows: Vec<OverdueRow> = self
            .schedule_lines(transactions, names, |due| due < today)
            .into_iter()
            .map(|line| {
                let seconds = (now - self.midnight(line.due_date)).num_seconds();
                OverdueRow {
                    overdue_days: seconds.div_euclid(SECONDS_PER_DAY),
                    line,
                }
            })
            .collect();

        let days: Vec<i64> = rows.iter().map(|r| r.overdue_days).collect();
        let summary = OverdueSummary {
            count: rows.len() as u64,
            total_amount: rows.iter().map(|r| r.line.amount).sum(),
            total_unpaid: rows.iter().map(|r| r.line.unpaid_amount).sum(),
            avg_overdue_days: rounded_mean(&days),
        };
        OverdueSchedule { rows, summary }
    }

    fn schedule_lines<F>(
        &self,
        transactions: &[EnrichedTransaction],
        names: &HashMap<CustomerId, String>,
        in_range: F,
    ) -> Vec<ScheduleLine>
    where
        F: Fn(NaiveDate) -> bool,
    {
        let mut lines: Vec<ScheduleLine> = transactions
            .iter()
            .filter(|tx| !tx.status.is_paid())
            .filter_map(|tx| {
                let due_date = tx.due_date.filter(|due| in_range(*due))?;
                Some(ScheduleLine {
                    id: tx.id,
                    customer_id: tx.customer_id,
                    customer_name: names.get(&tx.customer_id).cloned().unwrap_or_default(),
                    amount: tx.amount,
                    paid_amount: tx.paid_amount,
                    unpaid_amount: tx.unpaid_amount,
                    paid_ratio: tx.paid_ratio,
                    due_date,
                    status: tx.status.clone(),
                })
            })
            .collect();
        lines.sort_by_key(|line| (line.due_date, line.id));
        lines
    }

    /// Midnight of a business date as UTC
    fn midnight(&self, date: NaiveDate) -> DateTime<Utc> {
        self.timezone
            .start_of_day(date)
            .unwrap_or_else(|| Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
    }
}

fn ceil_days(seconds: i64) -> i64 {
    -(-seconds).div_euclid(SECONDS_PER_DAY)
}
