use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One product tracked by the remote price-monitoring service. Depending on
/// the API variant the prices arrive per monitored storefront URL, per site
/// summary, or both; both shapes live behind this one type and callers probe
/// capabilities instead of branching on response variants.
///
/// Price fields stay raw JSON until extraction: the service reports them as
/// numbers, formatted strings, or null, and deserialization must never fail
/// on a malformed one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RemoteProduct {
    pub name: String,
    #[serde(default)]
    pub monitored_urls: Vec<MonitoredUrl>,
    // Object key order is the service's site order; preserved on parse.
    #[serde(default)]
    pub site_summaries: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonitoredUrl {
    pub url: String,
    #[serde(default)]
    pub price: Option<Value>,
}

impl RemoteProduct {
    pub fn has_url_prices(&self) -> bool {
        !self.monitored_urls.is_empty()
    }

    pub fn has_site_summaries(&self) -> bool {
        !self.site_summaries.is_empty()
    }

    /// Price value reported for a site summary entry, if any.
    pub fn summary_price(entry: &Value) -> Option<&Value> {
        let price = entry.get("price")?;
        if price.is_null() { None } else { Some(price) }
    }
}
