//! Receivables report binary
//!
//! Prints one report as JSON on stdout. Logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! receivables-report                       # dashboard
//! receivables-report summary CUS-<uuid>
//! REPORT_KIND=overview REPORT_DATABASE__URL=postgres://... receivables-report
//! ```
//!
//! # Environment Variables
//!
//! * `REPORT_KIND` - dashboard, rollup, summary, statement, sms, overview, health
//! * `REPORT_CUSTOMER_ID` - customer for summary, statement and sms
//! * `REPORT_TEMPLATE` - SMS template with `{고객명}`-style placeholders
//! * `REPORT_DATABASE__URL` - PostgreSQL connection string (`DATABASE_URL` also works)
//! * `REPORT_RECEIVABLES__TIMEZONE` - business timezone (default: Asia/Seoul)
//! * `REPORT_LOG_LEVEL` / `RUST_LOG` - log filter (default: info)
//! * `REPORT_JSON_LOGS` - emit logs as JSON lines

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use domain_receivables::{ReceivablesPort, ReceivablesService};
use infra_db::{create_pool, run_migrations, PostgresReceivablesAdapter};
use interface_report::{resolve_request, run_report, ReportConfig, ReportError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => return fail(&ReportError::from(e)),
    };

    init_tracing(&config.log_level, config.json_logs);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<ReportError>() {
            Some(report_error) => fail(report_error),
            None => {
                tracing::error!(error = %format!("{:#}", e), "Report failed");
                ExitCode::FAILURE
            }
        },
    }
}

async fn run(config: ReportConfig) -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let request = resolve_request(&config, &args)?;

    tracing::info!(kind = %request.kind, "Starting receivables report");

    let pool = create_pool(config.database.clone())
        .await
        .map_err(ReportError::from)?;
    if config.migrate {
        run_migrations(&pool).await.map_err(ReportError::from)?;
    }

    let port: Arc<dyn ReceivablesPort> = Arc::new(PostgresReceivablesAdapter::new(pool));
    let service = ReceivablesService::new(port, config.receivables.clone());

    let report = run_report(&service, &request).await?;
    let rendered = if config.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .context("rendering report")?;

    println!("{}", rendered);
    Ok(())
}

/// Loads configuration, honouring `DATABASE_URL` when no prefixed URL is set
fn load_config() -> Result<ReportConfig, config::ConfigError> {
    let mut config = ReportConfig::from_env()?;
    if std::env::var("REPORT_DATABASE__URL").is_err() {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database.url = url;
        }
    }
    Ok(config)
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn fail(error: &ReportError) -> ExitCode {
    tracing::error!(error = %error, "Report failed");
    if let Ok(body) = serde_json::to_string(&error.to_response()) {
        println!("{}", body);
    }
    ExitCode::from(u8::try_from(error.exit_code()).unwrap_or(1))
}
