//! Engine configuration

use serde::{Deserialize, Serialize};

use core_kernel::{CoreError, Timezone};

use crate::rollup::DEFAULT_TOP_DEBTOR_LIMIT;
use crate::transaction::ON_CREDIT_MARKER;

/// Tunables for the receivables engine
///
/// Every field has a default, so a partially specified config source
/// deserializes cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceivablesConfig {
    /// Description that is moved into the `note` field
    pub on_credit_marker: String,
    /// Number of debtors ranked in the portfolio rollup
    pub top_debtor_limit: usize,
    /// Whole months before the current one covered by monthly statistics
    pub stats_lookback_months: u32,
    /// Timezone that defines calendar days and months
    pub timezone: Timezone,
}

impl Default for ReceivablesConfig {
    fn default() -> Self {
        Self {
            on_credit_marker: ON_CREDIT_MARKER.to_string(),
            top_debtor_limit: DEFAULT_TOP_DEBTOR_LIMIT,
            stats_lookback_months: 6,
            timezone: Timezone::default(),
        }
    }
}

/// Longest supported statistics window
pub const MAX_LOOKBACK_MONTHS: u32 = 120;

impl ReceivablesConfig {
    /// Rejects settings the engine cannot work with
    ///
    /// A blank marker would move every empty description into the note.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.on_credit_marker.trim().is_empty() {
            return Err(CoreError::configuration(
                "on_credit_marker",
                "must not be blank",
            ));
        }
        if self.stats_lookback_months > MAX_LOOKBACK_MONTHS {
            return Err(CoreError::configuration(
                "stats_lookback_months",
                format!("must be at most {}", MAX_LOOKBACK_MONTHS),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: ReceivablesConfig =
            serde_json::from_str(r#"{"top_debtor_limit": 10, "timezone": "UTC"}"#).unwrap();
        assert_eq!(config.top_debtor_limit, 10);
        assert_eq!(config.on_credit_marker, "외상");
        assert_eq!(config.stats_lookback_months, 6);
        assert_eq!(config.timezone, "UTC".parse::<Timezone>().unwrap());
    }

    #[test]
    fn test_validate() {
        assert!(ReceivablesConfig::default().validate().is_ok());

        let blank = ReceivablesConfig {
            on_credit_marker: "  ".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            blank.validate(),
            Err(CoreError::Configuration { field: "on_credit_marker", .. })
        ));

        let long = ReceivablesConfig {
            stats_lookback_months: MAX_LOOKBACK_MONTHS + 1,
            ..Default::default()
        };
        assert!(long.validate().is_err());
    }
}
