use serde::{Deserialize, Serialize};

use crate::extractor::parse_positive_price;
use crate::models::{LocalProduct, RemoteProduct};
use crate::normalizer::normalize;

/// Matching strategies, strongest first. A deployment enables an ordered
/// subset depending on which keys its catalog and the remote feed both
/// populate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    ExactName,
    PartialName,
    Url,
}

impl MatchStrategy {
    pub fn default_order() -> Vec<MatchStrategy> {
        vec![
            MatchStrategy::ExactName,
            MatchStrategy::PartialName,
            MatchStrategy::Url,
        ]
    }
}

/// Where the matched product's authoritative price comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource {
    /// A specific entry of `RemoteProduct::monitored_urls`.
    MonitoredUrl(usize),
    /// The product's site-summary map, first positively priced site wins.
    SiteSummaries,
}

#[derive(Debug, Clone, Copy)]
pub struct MatchResult<'a> {
    pub remote: &'a RemoteProduct,
    pub source: PriceSource,
}

#[derive(Debug)]
pub enum MatchOutcome<'a> {
    Matched(MatchResult<'a>),
    /// At least one candidate matched, but none carries a usable price
    /// source. Weaker strategies are not consulted after this.
    Priceless,
    NoMatch,
}

enum StrategyOutcome<'a> {
    Matched(MatchResult<'a>),
    Priceless,
    NoCandidate,
}

pub struct ProductMatcher {
    strategies: Vec<MatchStrategy>,
}

impl ProductMatcher {
    pub fn new(strategies: Vec<MatchStrategy>) -> Self {
        Self { strategies }
    }

    /// Select at most one remote product for a local record. Strategies run
    /// in their configured order and short-circuit on the first that
    /// produces a candidate; a matched-but-priceless candidate set ends the
    /// attempt without falling through to weaker strategies.
    pub fn find_match<'a>(
        &self,
        local: &LocalProduct,
        catalog: &'a [RemoteProduct],
    ) -> MatchOutcome<'a> {
        for strategy in &self.strategies {
            match self.apply(*strategy, local, catalog) {
                StrategyOutcome::Matched(result) => return MatchOutcome::Matched(result),
                StrategyOutcome::Priceless => return MatchOutcome::Priceless,
                StrategyOutcome::NoCandidate => continue,
            }
        }
        MatchOutcome::NoMatch
    }

    fn apply<'a>(
        &self,
        strategy: MatchStrategy,
        local: &LocalProduct,
        catalog: &'a [RemoteProduct],
    ) -> StrategyOutcome<'a> {
        match strategy {
            MatchStrategy::ExactName | MatchStrategy::PartialName => {
                self.match_by_name(strategy, local, catalog)
            }
            MatchStrategy::Url => self.match_by_url(local, catalog),
        }
    }

    fn match_by_name<'a>(
        &self,
        strategy: MatchStrategy,
        local: &LocalProduct,
        catalog: &'a [RemoteProduct],
    ) -> StrategyOutcome<'a> {
        let Some(key) = local.name_key() else {
            return StrategyOutcome::NoCandidate;
        };
        let key = fold(key);

        // Tie-break policy lives here: catalog order, first candidate with a
        // price source wins. Unpriced candidates are skipped, not returned.
        let mut saw_candidate = false;
        for remote in catalog {
            let name = fold(remote.name.trim());
            if name.is_empty() {
                continue;
            }
            let hit = match strategy {
                MatchStrategy::ExactName => name == key,
                MatchStrategy::PartialName => name.contains(&key) || key.contains(&name),
                MatchStrategy::Url => unreachable!("url matching handled separately"),
            };
            if !hit {
                continue;
            }
            saw_candidate = true;
            if let Some(source) = price_source(remote) {
                return StrategyOutcome::Matched(MatchResult { remote, source });
            }
        }

        if saw_candidate {
            StrategyOutcome::Priceless
        } else {
            StrategyOutcome::NoCandidate
        }
    }

    fn match_by_url<'a>(
        &self,
        local: &LocalProduct,
        catalog: &'a [RemoteProduct],
    ) -> StrategyOutcome<'a> {
        let Some(link) = local.link_key() else {
            return StrategyOutcome::NoCandidate;
        };
        let local_url = normalize(link);

        let mut saw_candidate = false;
        for remote in catalog {
            let hit = remote.monitored_urls.iter().enumerate().find(|(_, m)| {
                let remote_url = normalize(&m.url);
                !remote_url.is_empty()
                    && (remote_url == local_url
                        || remote_url.contains(&local_url)
                        || local_url.contains(&remote_url))
            });
            let Some((index, monitored)) = hit else {
                continue;
            };
            saw_candidate = true;

            // Prefer the matched URL's own price; a product identified by
            // URL can still price from a sibling URL or its site summaries.
            let source = if monitored
                .price
                .as_ref()
                .and_then(parse_positive_price)
                .is_some()
            {
                Some(PriceSource::MonitoredUrl(index))
            } else {
                price_source(remote)
            };
            if let Some(source) = source {
                return StrategyOutcome::Matched(MatchResult { remote, source });
            }
        }

        if saw_candidate {
            StrategyOutcome::Priceless
        } else {
            StrategyOutcome::NoCandidate
        }
    }
}

impl Default for ProductMatcher {
    fn default() -> Self {
        Self::new(MatchStrategy::default_order())
    }
}

fn fold(s: &str) -> String {
    s.trim().to_lowercase()
}

/// The price-bearing sub-record of a candidate: first monitored URL in
/// catalog order with a strictly positive price, else the site-summary map
/// when the product carries one.
fn price_source(remote: &RemoteProduct) -> Option<PriceSource> {
    let priced_url = remote
        .monitored_urls
        .iter()
        .position(|m| m.price.as_ref().and_then(parse_positive_price).is_some());
    if let Some(index) = priced_url {
        return Some(PriceSource::MonitoredUrl(index));
    }
    if remote.has_site_summaries() {
        return Some(PriceSource::SiteSummaries);
    }
    None
}
