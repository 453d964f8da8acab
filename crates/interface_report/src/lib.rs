//! Reporting Surface
//!
//! Exposes the receivables engine's read models as JSON documents on the
//! command line. The `receivables-report` binary wires the PostgreSQL
//! adapter into [`ReceivablesService`](domain_receivables::ReceivablesService)
//! and prints one report per invocation.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_report::{run_report, ReportKind, ReportRequest};
//!
//! let request = ReportRequest::new(ReportKind::Summary).for_customer("CUS-...");
//! let json = run_report(&service, &request).await?;
//! ```

pub mod config;
pub mod error;
pub mod report;

pub use crate::config::ReportConfig;
pub use crate::error::{ErrorResponse, ReportError};
pub use crate::report::{run_report, ReportKind, ReportRequest, SmsReport};

/// Resolves the request from configuration and positional arguments
///
/// Arguments take precedence: `[kind] [customer-id]`.
pub fn resolve_request(config: &ReportConfig, args: &[String]) -> Result<ReportRequest, ReportError> {
    let kind = match args.first() {
        Some(raw) => raw.parse()?,
        None => config.kind,
    };

    let mut request = ReportRequest::new(kind);
    request.customer_id = args.get(1).cloned().or_else(|| config.customer_id.clone());
    request.template = config.template.clone();

    if kind.needs_customer() && request.customer_id.is_none() {
        return Err(ReportError::MissingArgument("customer_id"));
    }
    Ok(request)
}
