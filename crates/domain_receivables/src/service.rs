//! Receivables application service
//!
//! Orchestrates port reads and the pure engine components. Customer-level
//! operations propagate typed failures; the rollup and dashboard isolate a
//! failed view and fall back to its empty default.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use core_kernel::{CustomerId, HealthCheckResult, OperationMetadata, PortError};

use crate::config::ReceivablesConfig;
use crate::customer::Customer;
use crate::enrichment::{EnrichedTransaction, TransactionEnricher};
use crate::error::ReceivablesError;
use crate::payment::{Payment, PaymentAggregator};
use crate::ports::{
    CustomerFilter, ReceivablesPort, ReceivablesPortExt, TransactionFilter, TransactionOrder,
};
use crate::projections::{SmsVariables, Statement, TransactionOverview};
use crate::rollup::{PortfolioRollup, PortfolioRollupBuilder, RollupView, TopDebtor};
use crate::statistics::{Dashboard, DashboardStatistics, DashboardView};
use crate::summary::{CustomerSummary, CustomerSummaryBuilder};
use crate::transaction::{Transaction, TransactionStatus};

/// Entry point for every receivables read
///
/// # Example
///
/// ```rust,ignore
/// let service = ReceivablesService::new(port, ReceivablesConfig::default());
/// let summary = service.customer_summary("CUS-0190...").await?;
/// println!("{} unpaid", summary.total_unpaid);
/// ```
pub struct ReceivablesService {
    port: Arc<dyn ReceivablesPort>,
    config: ReceivablesConfig,
    summaries: CustomerSummaryBuilder,
    rollups: PortfolioRollupBuilder,
    statistics: DashboardStatistics,
}

impl ReceivablesService {
    pub fn new(port: Arc<dyn ReceivablesPort>, config: ReceivablesConfig) -> Self {
        let enricher = TransactionEnricher::new(config.on_credit_marker.clone());
        Self {
            summaries: CustomerSummaryBuilder::new(enricher),
            rollups: PortfolioRollupBuilder::new(config.top_debtor_limit),
            statistics: DashboardStatistics::new(config.timezone, config.stats_lookback_months),
            port,
            config,
        }
    }

    pub fn config(&self) -> &ReceivablesConfig {
        &self.config
    }

    /// Health of the underlying data source
    pub async fn health(&self) -> HealthCheckResult {
        self.port.health_check().await
    }

    /// Parses a customer identifier supplied by a caller
    pub fn parse_customer_id(raw: &str) -> Result<CustomerId, ReceivablesError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ReceivablesError::invalid_argument("customer id is required"));
        }
        trimmed.parse().map_err(|_| {
            ReceivablesError::invalid_argument(format!("malformed customer id: {}", trimmed))
        })
    }

    // ========================================================================
    // Customer-level reads
    // ========================================================================

    /// Builds the summary for a customer identified by a raw id string
    ///
    /// # Errors
    ///
    /// * `InvalidArgument` - the id is empty or malformed
    /// * `NotFound` - no such customer
    /// * `DependencyFailure` - any underlying read failed
    pub async fn customer_summary(&self, raw_id: &str) -> Result<CustomerSummary, ReceivablesError> {
        let id = Self::parse_customer_id(raw_id)?;
        self.customer_summary_for(id).await
    }

    /// Builds the summary for a known customer id
    #[instrument(skip(self), fields(customer_id = %id))]
    pub async fn customer_summary_for(
        &self,
        id: CustomerId,
    ) -> Result<CustomerSummary, ReceivablesError> {
        let metadata = Self::metadata("customer_summary");

        let exists = self
            .port
            .customer_exists(id, Some(metadata.clone()))
            .await
            .map_err(|e| ReceivablesError::from_port("customer_exists", e))?;
        if !exists {
            return Err(ReceivablesError::not_found("Customer", id));
        }

        let filter = TransactionFilter::for_customer(id);
        let transaction_count = self
            .port
            .count_transactions(filter.clone(), Some(metadata.clone()))
            .await
            .map_err(|e| ReceivablesError::from_port("count_transactions", e))?;
        let (transactions, payments) = self.load_records(filter, metadata).await?;

        let summary = self
            .summaries
            .build(id, &transactions, payments, transaction_count);
        debug!(
            transaction_count = summary.transaction_count,
            total_unpaid = %summary.total_unpaid,
            "Built customer summary"
        );
        Ok(summary)
    }

    /// Statement export rows for a customer
    pub async fn statement(&self, raw_id: &str) -> Result<Statement, ReceivablesError> {
        let (customer, summary) = self.customer_with_summary(raw_id).await?;
        Ok(Statement::from_summary(
            &customer,
            &summary,
            self.config.timezone,
        ))
    }

    /// Reminder message variables for a customer
    pub async fn sms_variables(&self, raw_id: &str) -> Result<SmsVariables, ReceivablesError> {
        let (customer, summary) = self.customer_with_summary(raw_id).await?;
        Ok(SmsVariables::from_summary(&customer, &summary))
    }

    async fn customer_with_summary(
        &self,
        raw_id: &str,
    ) -> Result<(Customer, CustomerSummary), ReceivablesError> {
        let id = Self::parse_customer_id(raw_id)?;
        let customer = self
            .port
            .get_customer(id, Some(Self::metadata("customer_lookup")))
            .await
            .map_err(|e| ReceivablesError::from_port("get_customer", e))?;
        let summary = self.customer_summary_for(id).await?;
        Ok((customer, summary))
    }

    // ========================================================================
    // Cross-customer reads
    // ========================================================================

    /// Per-customer totals over every transaction not tagged "deleted"
    ///
    /// Each row's count is the number of detail rows read for that customer.
    #[instrument(skip(self))]
    pub async fn transaction_overview(&self) -> Result<TransactionOverview, ReceivablesError> {
        let metadata = Self::metadata("transaction_overview");
        let filter = TransactionFilter::excluding_status(TransactionStatus::Deleted);
        let (transactions, payments) = self.load_records(filter, metadata.clone()).await?;

        let mut by_customer: HashMap<CustomerId, Vec<Transaction>> = HashMap::new();
        for tx in transactions {
            by_customer.entry(tx.customer_id).or_default().push(tx);
        }
        let mut payments_by_tx = PaymentAggregator::group_by_transaction(payments);

        let summaries: Vec<CustomerSummary> = by_customer
            .iter()
            .map(|(customer_id, txs)| {
                let payments: Vec<Payment> = txs
                    .iter()
                    .flat_map(|tx| payments_by_tx.remove(&tx.id).unwrap_or_default())
                    .collect();
                self.summaries
                    .build(*customer_id, txs, payments, txs.len() as u64)
            })
            .collect();

        let ids: Vec<CustomerId> = by_customer.keys().copied().collect();
        let names = self
            .customer_names(ids, metadata)
            .await
            .map_err(|e| ReceivablesError::from_port("fetch_customers", e))?;

        Ok(TransactionOverview::from_summaries(&summaries, &names))
    }

    /// Global unpaid total, aging series and top debtors
    ///
    /// Each view is read separately. A failed view is logged, listed in
    /// `degraded_views` and left at its default.
    #[instrument(skip(self))]
    pub async fn portfolio_rollup(&self) -> PortfolioRollup {
        let mut rollup = PortfolioRollup::default();

        match self.load_rollup_view(RollupView::TotalUnpaid).await {
            Ok(txs) => rollup.total_unpaid = self.rollups.total_unpaid(&txs),
            Err(e) => Self::degrade(&mut rollup.degraded_views, RollupView::TotalUnpaid, &e),
        }

        match self.load_rollup_view(RollupView::Aging).await {
            Ok(txs) => rollup.aging = self.rollups.aging_series(&txs),
            Err(e) => Self::degrade(&mut rollup.degraded_views, RollupView::Aging, &e),
        }

        match self.load_rollup_view(RollupView::TopDebtors).await {
            Ok(txs) => {
                let mut debtors = self.rollups.top_debtors(&txs);
                self.attach_debtor_names(&mut debtors).await;
                rollup.top_debtors = debtors;
            }
            Err(e) => Self::degrade(&mut rollup.degraded_views, RollupView::TopDebtors, &e),
        }

        info!(
            total_unpaid = %rollup.total_unpaid,
            aging_points = rollup.aging.len(),
            top_debtors = rollup.top_debtors.len(),
            degraded = rollup.degraded_views.len(),
            "Portfolio rollup computed"
        );
        rollup
    }

    /// Full dashboard as of `now`
    #[instrument(skip(self))]
    pub async fn dashboard(&self, now: DateTime<Utc>) -> Dashboard {
        let rollup = self.portfolio_rollup().await;
        let mut degraded: Vec<DashboardView> =
            rollup.degraded_views.iter().copied().map(Into::into).collect();
        let stats = &self.statistics;

        let monthly_unpaid = match self.load_windowed(now, Some(TransactionStatus::Paid)).await {
            Ok(txs) => stats.monthly_unpaid(&txs),
            Err(e) => Self::degrade(&mut degraded, DashboardView::MonthlyUnpaid, &e),
        };

        let monthly_sales = match self.load_windowed(now, None).await {
            Ok(txs) => stats.monthly_sales(&txs),
            Err(e) => Self::degrade(&mut degraded, DashboardView::MonthlySales, &e),
        };

        let customer_type_unpaid = match self.load_customer_type_inputs().await {
            Ok((customers, txs)) => stats.customer_type_unpaid(&customers, &txs),
            Err(e) => Self::degrade(&mut degraded, DashboardView::CustomerTypeUnpaid, &e),
        };

        let due_this_month = match self.load_due_this_month(now).await {
            Ok(schedule) => schedule,
            Err(e) => Self::degrade(&mut degraded, DashboardView::DueThisMonth, &e),
        };

        let overdue = match self.load_overdue(now).await {
            Ok(schedule) => schedule,
            Err(e) => Self::degrade(&mut degraded, DashboardView::Overdue, &e),
        };

        Dashboard {
            as_of: stats.today(now),
            rollup,
            monthly_unpaid,
            monthly_sales,
            customer_type_unpaid,
            due_this_month,
            overdue,
            degraded_views: degraded,
        }
    }

    // ========================================================================
    // View loaders
    // ========================================================================

    async fn load_rollup_view(
        &self,
        view: RollupView,
    ) -> Result<Vec<EnrichedTransaction>, ReceivablesError> {
        let filter = TransactionFilter::unpaid().ordered(TransactionOrder::CreatedAsc);
        self.load_enriched(filter, Self::metadata(&view.to_string()))
            .await
    }

    async fn load_windowed(
        &self,
        now: DateTime<Utc>,
        excluded: Option<TransactionStatus>,
    ) -> Result<Vec<EnrichedTransaction>, ReceivablesError> {
        let since = self
            .statistics
            .lookback_start(now)
            .map_err(|e| ReceivablesError::invalid_argument(e.to_string()))?;
        let filter = TransactionFilter {
            status_not: excluded,
            ..Default::default()
        }
        .created_from(since)
        .ordered(TransactionOrder::CreatedAsc);
        self.load_enriched(filter, Self::metadata("monthly")).await
    }

    async fn load_customer_type_inputs(
        &self,
    ) -> Result<(Vec<Customer>, Vec<EnrichedTransaction>), ReceivablesError> {
        let metadata = Self::metadata("customer_type_unpaid");
        let customers = self
            .port
            .fetch_customers(CustomerFilter::default(), Some(metadata.clone()))
            .await
            .map_err(|e| ReceivablesError::from_port("fetch_customers", e))?;
        let transactions = self
            .load_enriched(TransactionFilter::default(), metadata)
            .await?;
        Ok((customers, transactions))
    }

    async fn load_due_this_month(
        &self,
        now: DateTime<Utc>,
    ) -> Result<crate::statistics::DueSchedule, ReceivablesError> {
        let (from, before) = self
            .statistics
            .current_month_range(now)
            .map_err(|e| ReceivablesError::invalid_argument(e.to_string()))?;
        let filter = TransactionFilter::excluding_status(TransactionStatus::Paid)
            .due_between(Some(from), Some(before));
        let metadata = Self::metadata("due_this_month");
        let transactions = self.load_enriched(filter, metadata.clone()).await?;
        let names = self.names_for(&transactions, metadata).await;
        self.statistics
            .due_this_month(&transactions, &names, now)
            .map_err(|e| ReceivablesError::invalid_argument(e.to_string()))
    }

    async fn load_overdue(
        &self,
        now: DateTime<Utc>,
    ) -> Result<crate::statistics::OverdueSchedule, ReceivablesError> {
        let today = self.statistics.today(now);
        let filter = TransactionFilter::excluding_status(TransactionStatus::Paid)
            .due_between(None, Some(today));
        let metadata = Self::metadata("overdue");
        let transactions = self.load_enriched(filter, metadata.clone()).await?;
        let names = self.names_for(&transactions, metadata).await;
        Ok(self.statistics.overdue(&transactions, &names, now))
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn load_records(
        &self,
        filter: TransactionFilter,
        metadata: OperationMetadata,
    ) -> Result<(Vec<Transaction>, Vec<Payment>), ReceivablesError> {
        self.port
            .fetch_transactions_with_payments(filter, Some(metadata))
            .await
            .map_err(|e| ReceivablesError::from_port("fetch_transactions_with_payments", e))
    }

    async fn load_enriched(
        &self,
        filter: TransactionFilter,
        metadata: OperationMetadata,
    ) -> Result<Vec<EnrichedTransaction>, ReceivablesError> {
        let (transactions, payments) = self.load_records(filter, metadata).await?;
        let mut grouped = PaymentAggregator::group_by_transaction(payments);
        let enricher = self.summaries.enricher();
        Ok(transactions
            .iter()
            .map(|tx| enricher.enrich(tx, grouped.remove(&tx.id).unwrap_or_default()))
            .collect())
    }

    async fn customer_names(
        &self,
        ids: Vec<CustomerId>,
        metadata: OperationMetadata,
    ) -> Result<HashMap<CustomerId, String>, PortError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let customers = self
            .port
            .fetch_customers(CustomerFilter::by_ids(ids), Some(metadata))
            .await?;
        Ok(customers.into_iter().map(|c| (c.id, c.name)).collect())
    }

    /// Names for the customers owning `transactions`; empty on failure
    async fn names_for(
        &self,
        transactions: &[EnrichedTransaction],
        metadata: OperationMetadata,
    ) -> HashMap<CustomerId, String> {
        let mut ids: Vec<CustomerId> = transactions.iter().map(|tx| tx.customer_id).collect();
        ids.sort();
        ids.dedup();
        match self.customer_names(ids, metadata).await {
            Ok(names) => names,
            Err(e) => {
                warn!(error = %e, "Customer name lookup failed; names left blank");
                HashMap::new()
            }
        }
    }

    async fn attach_debtor_names(&self, debtors: &mut [TopDebtor]) {
        let ids: Vec<CustomerId> = debtors.iter().map(|d| d.customer_id).collect();
        match self.customer_names(ids, Self::metadata("top_debtors")).await {
            Ok(names) => {
                for debtor in debtors.iter_mut() {
                    debtor.customer_name = names.get(&debtor.customer_id).cloned();
                }
            }
            Err(e) => warn!(error = %e, "Customer name lookup failed; debtor names left blank"),
        }
    }

    fn degrade<V, T>(degraded: &mut Vec<V>, view: V, error: &ReceivablesError) -> T
    where
        V: std::fmt::Display + Copy,
        T: Default,
    {
        warn!(view = %view, kind = ?error.kind(), error = %error, "View degraded to empty default");
        degraded.push(view);
        T::default()
    }

    fn metadata(view: &str) -> OperationMetadata {
        OperationMetadata::for_view(view)
    }
}
