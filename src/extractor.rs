use regex::Regex;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::matcher::{MatchResult, PriceSource};
use crate::models::RemoteProduct;

static PRICE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("price token pattern"));

/// Parse a raw reported price into a usable decimal. The service reports
/// prices as JSON numbers or as strings that may carry a currency symbol and
/// thousands separators. Zero, negative, absent, and non-numeric values all
/// count as "no usable price".
pub fn parse_positive_price(value: &Value) -> Option<Decimal> {
    parse_decimal(value).filter(|price| price.is_sign_positive() && !price.is_zero())
}

fn parse_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            let repr = n.to_string();
            Decimal::from_str(&repr)
                .or_else(|_| Decimal::from_scientific(&repr))
                .ok()
        }
        Value::String(s) => parse_decimal_str(s),
        _ => None,
    }
}

fn parse_decimal_str(s: &str) -> Option<Decimal> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(price) = Decimal::from_str(trimmed) {
        return Some(price);
    }
    // Lenient pass: "$1,299.99", "AU$ 15.00" and the like.
    let cleaned = trimmed.replace(',', "");
    let token = PRICE_TOKEN.find(&cleaned)?;
    Decimal::from_str(token.as_str()).ok()
}

/// Derive the authoritative current price from a match. A monitored-URL
/// source reads that URL's reported price; a site-summary source takes the
/// first site, in the order the service listed them, whose price parses
/// positive.
pub fn extract(result: &MatchResult<'_>) -> Option<Decimal> {
    match result.source {
        PriceSource::MonitoredUrl(index) => result
            .remote
            .monitored_urls
            .get(index)?
            .price
            .as_ref()
            .and_then(parse_positive_price),
        PriceSource::SiteSummaries => result
            .remote
            .site_summaries
            .values()
            .find_map(|entry| RemoteProduct::summary_price(entry).and_then(parse_positive_price)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MonitoredUrl, RemoteProduct};
    use rstest::rstest;
    use rust_decimal::prelude::FromPrimitive;
    use serde_json::json;

    #[rstest]
    #[case(json!("129.99"), "129.99")]
    #[case(json!(129.99), "129.99")]
    #[case(json!(79), "79")]
    #[case(json!("$1,299.99"), "1299.99")]
    #[case(json!("US$ 19.99"), "19.99")]
    #[case(json!(" 42.50 "), "42.50")]
    fn test_accepts_positive_prices(#[case] raw: Value, #[case] expected: &str) {
        let expected = Decimal::from_str(expected).unwrap();
        assert_eq!(parse_positive_price(&raw), Some(expected));
    }

    #[rstest]
    #[case(json!(0))]
    #[case(json!("0.00"))]
    #[case(json!(-5.5))]
    #[case(json!("-12.00"))]
    #[case(json!(null))]
    #[case(json!("out of stock"))]
    #[case(json!(""))]
    #[case(json!({"amount": "12.00"}))]
    #[case(json!(true))]
    fn test_rejects_unusable_prices(#[case] raw: Value) {
        assert_eq!(parse_positive_price(&raw), None);
    }

    #[test]
    fn test_accepts_any_finite_positive_fraction() {
        let raw = json!(0.01);
        assert_eq!(parse_positive_price(&raw), Decimal::from_f64(0.01));
    }

    #[test]
    fn test_extract_from_monitored_url() {
        let remote = RemoteProduct {
            name: "Classic Tote".to_string(),
            monitored_urls: vec![
                MonitoredUrl {
                    url: "https://a.example.com/tote".to_string(),
                    price: None,
                },
                MonitoredUrl {
                    url: "https://b.example.com/tote".to_string(),
                    price: Some(json!("129.99")),
                },
            ],
            site_summaries: Default::default(),
        };
        let result = MatchResult {
            remote: &remote,
            source: PriceSource::MonitoredUrl(1),
        };

        assert_eq!(
            extract(&result),
            Some(Decimal::from_str("129.99").unwrap())
        );
    }

    #[test]
    fn test_extract_unpriced_url_is_absent() {
        let remote = RemoteProduct {
            name: "Classic Tote".to_string(),
            monitored_urls: vec![MonitoredUrl {
                url: "https://a.example.com/tote".to_string(),
                price: Some(json!(null)),
            }],
            site_summaries: Default::default(),
        };
        let result = MatchResult {
            remote: &remote,
            source: PriceSource::MonitoredUrl(0),
        };

        assert_eq!(extract(&result), None);
    }

    #[test]
    fn test_extract_first_positive_site_in_order() {
        let raw = r#"{
            "name": "Weekender Duffel",
            "siteSummaries": {
                "zeta-mart": {"price": null},
                "acme-store": {"price": 0},
                "bargain-bin": {"price": "79.99"},
                "last-resort": {"price": "99.99"}
            }
        }"#;
        let remote: RemoteProduct = serde_json::from_str(raw).unwrap();
        let result = MatchResult {
            remote: &remote,
            source: PriceSource::SiteSummaries,
        };

        assert_eq!(extract(&result), Some(Decimal::from_str("79.99").unwrap()));
    }

    #[test]
    fn test_extract_no_positive_site_is_absent() {
        let raw = r#"{
            "name": "Weekender Duffel",
            "siteSummaries": {
                "zeta-mart": {"price": null},
                "acme-store": {"price": "sold out"}
            }
        }"#;
        let remote: RemoteProduct = serde_json::from_str(raw).unwrap();
        let result = MatchResult {
            remote: &remote,
            source: PriceSource::SiteSummaries,
        };

        assert_eq!(extract(&result), None);
    }
}
