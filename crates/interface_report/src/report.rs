//! Report selection and rendering

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};

use domain_receivables::ReceivablesService;

use crate::error::ReportError;

/// The reports this crate can produce
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    /// Portfolio rollup plus the monthly and schedule statistics
    #[default]
    Dashboard,
    /// Portfolio rollup only
    Rollup,
    /// One customer's summary with enriched transactions
    Summary,
    /// One customer's statement rows
    Statement,
    /// Message variables for one customer, optionally rendered
    Sms,
    /// Every customer's summary with global totals
    Overview,
    /// Data source health
    Health,
}

impl ReportKind {
    pub const ALL: [ReportKind; 7] = [
        ReportKind::Dashboard,
        ReportKind::Rollup,
        ReportKind::Summary,
        ReportKind::Statement,
        ReportKind::Sms,
        ReportKind::Overview,
        ReportKind::Health,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Dashboard => "dashboard",
            ReportKind::Rollup => "rollup",
            ReportKind::Summary => "summary",
            ReportKind::Statement => "statement",
            ReportKind::Sms => "sms",
            ReportKind::Overview => "overview",
            ReportKind::Health => "health",
        }
    }

    /// True for reports scoped to a single customer
    pub fn needs_customer(&self) -> bool {
        matches!(
            self,
            ReportKind::Summary | ReportKind::Statement | ReportKind::Sms
        )
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ReportKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| ReportError::UnknownKind(s.to_string()))
    }
}

/// A fully resolved report invocation
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub kind: ReportKind,
    pub customer_id: Option<String>,
    pub template: Option<String>,
    /// Instant the dashboard is computed for
    pub now: DateTime<Utc>,
}

impl ReportRequest {
    pub fn new(kind: ReportKind) -> Self {
        Self {
            kind,
            customer_id: None,
            template: None,
            now: Utc::now(),
        }
    }

    pub fn for_customer(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    fn customer(&self) -> Result<&str, ReportError> {
        self.customer_id
            .as_deref()
            .ok_or(ReportError::MissingArgument("customer_id"))
    }
}

/// SMS report body
#[derive(Debug, Clone, Serialize)]
pub struct SmsReport {
    pub variables: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Produces the requested report as a JSON value
///
/// Aggregate reports (dashboard, rollup) never fail; their unavailable
/// parts are listed under `degraded_views`.
#[instrument(skip(service, request), fields(kind = %request.kind))]
pub async fn run_report(
    service: &ReceivablesService,
    request: &ReportRequest,
) -> Result<Value, ReportError> {
    let value = match request.kind {
        ReportKind::Dashboard => serde_json::to_value(service.dashboard(request.now).await)?,
        ReportKind::Rollup => serde_json::to_value(service.portfolio_rollup().await)?,
        ReportKind::Summary => {
            serde_json::to_value(service.customer_summary(request.customer()?).await?)?
        }
        ReportKind::Statement => {
            serde_json::to_value(service.statement(request.customer()?).await?)?
        }
        ReportKind::Sms => {
            let variables = service.sms_variables(request.customer()?).await?;
            let message = request.template.as_deref().map(|t| variables.render(t));
            serde_json::to_value(SmsReport {
                variables: variables.to_map(),
                message,
            })?
        }
        ReportKind::Overview => serde_json::to_value(service.transaction_overview().await?)?,
        ReportKind::Health => serde_json::to_value(service.health().await)?,
    };

    info!("Report produced");
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parsing() {
        assert_eq!("dashboard".parse::<ReportKind>().unwrap(), ReportKind::Dashboard);
        assert_eq!(" SMS ".parse::<ReportKind>().unwrap(), ReportKind::Sms);
        assert!(matches!(
            "ledger".parse::<ReportKind>(),
            Err(ReportError::UnknownKind(_))
        ));
    }

    #[test]
    fn test_kind_round_trips_through_display() {
        for kind in ReportKind::ALL {
            assert_eq!(kind.to_string().parse::<ReportKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_customer_scoped_kinds() {
        assert!(ReportKind::Summary.needs_customer());
        assert!(ReportKind::Sms.needs_customer());
        assert!(!ReportKind::Overview.needs_customer());
    }
}
