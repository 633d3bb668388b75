use url::Url;

/// Query parameters that carry session, campaign, referral, or affiliate
/// tracking state. Storefronts append these freely, so the same product page
/// shows up under many textual URLs; comparisons only happen on the stripped
/// form.
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "utm_id",
    "gclid",
    "fbclid",
    "msclkid",
    "igshid",
    "mc_cid",
    "mc_eid",
    "ref",
    "referrer",
    "campaign",
    "campaign_id",
    "cmpid",
    "affiliate",
    "affiliate_id",
    "affid",
    "aff_id",
    "tag",
    "sessionid",
    "session_id",
    "sid",
    "phpsessid",
    "jsessionid",
];

fn is_tracking_param(name: &str) -> bool {
    TRACKING_PARAMS
        .iter()
        .any(|p| p.eq_ignore_ascii_case(name))
}

/// Canonicalize a storefront URL for comparison by dropping the tracking
/// parameters above. Scheme, host, path, fragment, and every other query
/// parameter pass through unchanged. Total: input that does not parse as a
/// URL is returned as-is.
pub fn normalize(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };

    if parsed.query().is_none() {
        return parsed.into();
    }

    let kept: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(name, _)| !is_tracking_param(name))
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();

    if kept.is_empty() {
        parsed.set_query(None);
    } else {
        parsed
            .query_pairs_mut()
            .clear()
            .extend_pairs(kept.iter().map(|(n, v)| (n.as_str(), v.as_str())));
    }

    parsed.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://shop.example.com/tote?utm_source=mail&color=red")]
    #[case("https://shop.example.com/tote")]
    #[case("https://shop.example.com/tote?gclid=abc123")]
    #[case("not a url at all")]
    #[case("https://shop.example.com/search?q=leather+tote")]
    fn test_normalize_is_idempotent(#[case] url: &str) {
        let once = normalize(url);
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_strips_tracking_params_only() {
        let normalized = normalize(
            "https://shop.example.com/tote?color=red&utm_source=mail&fbclid=xyz&size=large",
        );
        assert_eq!(
            normalized,
            "https://shop.example.com/tote?color=red&size=large"
        );
    }

    #[test]
    fn test_all_params_tracking_drops_query_entirely() {
        let normalized = normalize("https://shop.example.com/tote?utm_campaign=spring&gclid=1");
        assert_eq!(normalized, "https://shop.example.com/tote");
    }

    #[rstest]
    #[case("https://shop.example.com/a/b/c?utm_source=x")]
    #[case("http://shop.example.com:8080/tote?ref=partner")]
    fn test_scheme_host_path_untouched(#[case] url: &str) {
        let before = Url::parse(url).unwrap();
        let after = Url::parse(&normalize(url)).unwrap();

        assert_eq!(before.scheme(), after.scheme());
        assert_eq!(before.host_str(), after.host_str());
        assert_eq!(before.port(), after.port());
        assert_eq!(before.path(), after.path());
    }

    #[test]
    fn test_unparseable_input_returned_verbatim() {
        assert_eq!(normalize("::::"), "::::");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_denylist_match_is_case_insensitive() {
        let normalized = normalize("https://shop.example.com/tote?UTM_Source=mail&color=red");
        assert_eq!(normalized, "https://shop.example.com/tote?color=red");
    }

    #[test]
    fn test_fragment_preserved() {
        let normalized = normalize("https://shop.example.com/tote?utm_source=x#reviews");
        assert_eq!(normalized, "https://shop.example.com/tote#reviews");
    }
}
