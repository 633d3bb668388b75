use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of the internal product catalog. The reconciler only reads these
/// and issues targeted price updates by id; everything else belongs to the
/// catalog's owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocalProduct {
    pub id: i64,
    pub display_name: Option<String>,
    pub product_link: Option<String>,
    pub current_price: Option<Decimal>,
    pub last_updated_at: Option<DateTime<Utc>>,
}

impl LocalProduct {
    /// Trimmed display name, if the record carries a non-blank one.
    pub fn name_key(&self) -> Option<&str> {
        self.display_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Trimmed product link, if the record carries a non-blank one.
    pub fn link_key(&self) -> Option<&str> {
        self.product_link
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Records with neither a usable name nor a usable link never enter the
    /// candidate set.
    pub fn has_match_key(&self) -> bool {
        self.name_key().is_some() || self.link_key().is_some()
    }

    /// Human-readable label used in log lines and failure reasons.
    pub fn label(&self) -> String {
        match self.name_key() {
            Some(name) => format!("{} (id {})", name, self.id),
            None => format!("record {}", self.id),
        }
    }
}
