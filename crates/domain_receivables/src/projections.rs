//! Read-only presentation views over customer summaries
//!
//! Nothing here recomputes payment arithmetic; every figure is copied from
//! a [`CustomerSummary`] or its enriched transactions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use core_kernel::{Amount, CustomerId, Timezone};

use crate::customer::Customer;
use crate::summary::{CustomerSummary, SummaryTotals};

/// One line of a customer statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementRow {
    /// Business date the transaction was created
    pub date: NaiveDate,
    pub description: String,
    pub note: String,
    pub amount: Amount,
    pub paid_amount: Amount,
    pub unpaid_amount: Amount,
    pub paid_ratio: i64,
    pub due_date: Option<NaiveDate>,
}

/// Statement export for a single customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub transaction_count: u64,
    /// Newest first, as in the summary
    pub rows: Vec<StatementRow>,
    pub totals: SummaryTotals,
}

impl Statement {
    pub fn from_summary(customer: &Customer, summary: &CustomerSummary, timezone: Timezone) -> Self {
        let rows = summary
            .transactions
            .iter()
            .map(|tx| StatementRow {
                date: timezone.local_date(tx.created_at),
                description: tx.description.clone(),
                note: tx.note.clone(),
                amount: tx.amount,
                paid_amount: tx.paid_amount,
                unpaid_amount: tx.unpaid_amount,
                paid_ratio: tx.paid_ratio,
                due_date: tx.due_date,
            })
            .collect();

        Self {
            customer_id: summary.customer_id,
            customer_name: customer.name.clone(),
            transaction_count: summary.transaction_count,
            rows,
            totals: summary.totals(),
        }
    }
}

/// Template variable holding the customer name
pub const VAR_CUSTOMER_NAME: &str = "고객명";
/// Template variable holding the grouped unpaid total
pub const VAR_TOTAL_UNPAID: &str = "미수금";
/// Template variable holding the transaction count
pub const VAR_TRANSACTION_COUNT: &str = "거래건수";

/// Values substituted into reminder message templates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsVariables {
    pub customer_name: String,
    pub total_unpaid: Amount,
    pub transaction_count: u64,
}

impl SmsVariables {
    pub fn from_summary(customer: &Customer, summary: &CustomerSummary) -> Self {
        Self {
            customer_name: customer.name.clone(),
            total_unpaid: summary.total_unpaid,
            transaction_count: summary.transaction_count,
        }
    }

    /// Template variables keyed by placeholder name
    pub fn to_map(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (VAR_CUSTOMER_NAME.to_string(), self.customer_name.clone()),
            (VAR_TOTAL_UNPAID.to_string(), self.total_unpaid.grouped()),
            (
                VAR_TRANSACTION_COUNT.to_string(),
                self.transaction_count.to_string(),
            ),
        ])
    }

    /// Fills a template with these variables
    pub fn render(&self, template: &str) -> String {
        fill_template(template, &self.to_map())
    }
}

/// Replaces every `{key}` placeholder in `template`
///
/// Unknown keys and keys mapped to an empty value become the empty string.
/// An unmatched `{` is copied through unchanged.
pub fn fill_template(template: &str, variables: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open + 1..].find('}') else {
            break;
        };
        out.push_str(&rest[..open]);
        let key = &rest[open + 1..open + 1 + close];
        if let Some(value) = variables.get(key) {
            out.push_str(value);
        }
        rest = &rest[open + close + 2..];
    }

    out.push_str(rest);
    out
}

/// One customer's line in the cross-customer overview
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverviewRow {
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub transaction_count: u64,
    pub total_amount: Amount,
    pub total_paid: Amount,
    pub total_unpaid: Amount,
    pub total_ratio: i64,
}

/// Totals across every customer in the overview
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverviewTotals {
    pub total_transactions: u64,
    pub total_customers: u64,
    pub total_amount: Amount,
    pub total_paid: Amount,
    pub total_unpaid: Amount,
    pub paid_ratio: i64,
}

/// Per-customer rows plus global totals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOverview {
    pub data: Vec<OverviewRow>,
    pub global: OverviewTotals,
}

impl TransactionOverview {
    /// Builds the overview from per-customer summaries
    ///
    /// Rows are ordered by customer name, then id. Customers missing from
    /// `names` get an empty name.
    pub fn from_summaries(
        summaries: &[CustomerSummary],
        names: &HashMap<CustomerId, String>,
    ) -> Self {
        let mut data: Vec<OverviewRow> = summaries
            .iter()
            .map(|s| OverviewRow {
                customer_id: s.customer_id,
                customer_name: names.get(&s.customer_id).cloned().unwrap_or_default(),
                transaction_count: s.transaction_count,
                total_amount: s.total_amount,
                total_paid: s.total_paid,
                total_unpaid: s.total_unpaid,
                total_ratio: s.total_ratio,
            })
            .collect();
        data.sort_by(|a, b| {
            a.customer_name
                .cmp(&b.customer_name)
                .then(a.customer_id.cmp(&b.customer_id))
        });

        let totals = SummaryTotals::from_sums(
            summaries.iter().map(|s| s.total_amount).sum(),
            summaries.iter().map(|s| s.total_paid).sum(),
        );
        let global = OverviewTotals {
            total_transactions: summaries.iter().map(|s| s.transaction_count).sum(),
            total_customers: summaries.len() as u64,
            total_amount: totals.total_amount,
            total_paid: totals.total_paid,
            total_unpaid: totals.total_unpaid,
            paid_ratio: totals.total_ratio,
        };

        Self { data, global }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_fill_template() {
        let variables = vars(&[("고객명", "홍길동"), ("미수금", "1,500,000")]);
        assert_eq!(
            fill_template("{고객명}님, 미수금 {미수금}원입니다.", &variables),
            "홍길동님, 미수금 1,500,000원입니다."
        );
    }

    #[test]
    fn test_fill_template_unknown_and_empty_keys() {
        let variables = vars(&[("empty", "")]);
        assert_eq!(fill_template("a{missing}b{empty}c", &variables), "abc");
        assert_eq!(fill_template("{}", &variables), "");
    }

    #[test]
    fn test_fill_template_unmatched_brace() {
        let variables = vars(&[("x", "1")]);
        assert_eq!(fill_template("{x} and {open", &variables), "1 and {open");
        assert_eq!(fill_template("no placeholders", &variables), "no placeholders");
    }

    #[test]
    fn test_sms_variables_map() {
        let variables = SmsVariables {
            customer_name: "한빛상사".to_string(),
            total_unpaid: Amount::new(1_234_500),
            transaction_count: 7,
        };
        let map = variables.to_map();
        assert_eq!(map[VAR_CUSTOMER_NAME], "한빛상사");
        assert_eq!(map[VAR_TOTAL_UNPAID], "1,234,500");
        assert_eq!(map[VAR_TRANSACTION_COUNT], "7");
        assert_eq!(
            variables.render("{고객명} {거래건수}건 {미수금}원"),
            "한빛상사 7건 1,234,500원"
        );
    }
}
