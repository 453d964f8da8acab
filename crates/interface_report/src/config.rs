//! Report configuration

use serde::Deserialize;

use domain_receivables::ReceivablesConfig;
use infra_db::DatabaseConfig;

use crate::report::ReportKind;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "REPORT";

/// Report configuration
///
/// Loaded from `REPORT_*` variables; nested sections use a double
/// underscore, e.g. `REPORT_DATABASE__URL` or `REPORT_RECEIVABLES__TIMEZONE`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Which report to produce
    pub kind: ReportKind,
    /// Target customer for per-customer reports
    pub customer_id: Option<String>,
    /// Message template for the SMS report
    pub template: Option<String>,
    /// Log level
    pub log_level: String,
    /// Emit logs as JSON lines
    pub json_logs: bool,
    /// Pretty-print the report
    pub pretty: bool,
    /// Apply migrations before reading
    pub migrate: bool,
    pub database: DatabaseConfig,
    pub receivables: ReceivablesConfig,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            kind: ReportKind::Dashboard,
            customer_id: None,
            template: None,
            log_level: "info".to_string(),
            json_logs: false,
            pretty: true,
            migrate: false,
            database: DatabaseConfig::default(),
            receivables: ReceivablesConfig::default(),
        }
    }
}

impl ReportConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_environment(Self::environment())
    }

    /// Loads configuration from an explicit environment source
    pub fn from_environment(env: config::Environment) -> Result<Self, config::ConfigError> {
        let config: Self = config::Config::builder()
            .add_source(env)
            .build()?
            .try_deserialize()?;
        config
            .receivables
            .validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(config)
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    /// Same source as [`ReportConfig::from_env`], backed by a map
    pub fn environment_from(vars: std::collections::HashMap<String, String>) -> config::Environment {
        Self::environment().source(Some(vars))
    }
}
