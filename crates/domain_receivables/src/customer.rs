//! Customer records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::CustomerId;

/// Type label used when a customer has no type recorded
pub const FALLBACK_CUSTOMER_TYPE: &str = "기타";

/// A customer who owes receivables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    /// Multi-valued classification (e.g. retail, wholesale)
    #[serde(default)]
    pub customer_types: Vec<String>,
    /// Legacy single-valued classification
    #[serde(default)]
    pub customer_type: Option<String>,
    pub mobile: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// Creates a customer with no types or contact details
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CustomerId::new_v7(),
            name: name.into(),
            customer_types: Vec::new(),
            customer_type: None,
            mobile: None,
            phone: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: CustomerId) -> Self {
        self.id = id;
        self
    }

    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.customer_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_legacy_type(mut self, customer_type: impl Into<String>) -> Self {
        self.customer_type = Some(customer_type.into());
        self
    }

    pub fn with_mobile(mut self, mobile: impl Into<String>) -> Self {
        self.mobile = Some(mobile.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Types this customer is credited to
    ///
    /// Falls back to the legacy single type, then to [`FALLBACK_CUSTOMER_TYPE`].
    /// Blank labels are ignored.
    pub fn effective_types(&self) -> Vec<String> {
        let types: Vec<String> = self
            .customer_types
            .iter()
            .filter(|t| !t.trim().is_empty())
            .cloned()
            .collect();
        if !types.is_empty() {
            return types;
        }

        match self.customer_type.as_deref() {
            Some(single) if !single.trim().is_empty() => vec![single.to_string()],
            _ => vec![FALLBACK_CUSTOMER_TYPE.to_string()],
        }
    }

    /// Preferred contact number: mobile first, then phone
    pub fn contact_number(&self) -> Option<&str> {
        self.mobile
            .as_deref()
            .filter(|m| !m.is_empty())
            .or_else(|| self.phone.as_deref().filter(|p| !p.is_empty()))
    }
}
