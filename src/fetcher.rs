use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::FixedInterval;
use tracing::{debug, info};

use crate::config::RemoteServiceConfig;
use crate::models::RemoteProduct;
use crate::utils::error::{AppError, Result};

/// One page of the remote service's product listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogPage {
    #[serde(default)]
    results: Vec<RemoteProduct>,
    #[serde(default)]
    next_page_available: bool,
}

/// Client for the remote price-monitoring service's paginated product
/// listing. `fetch_all` is all-or-nothing: reconciling against a partial
/// snapshot would turn missing pages into spurious no-match failures.
pub struct RemoteCatalog {
    http: reqwest::Client,
    config: RemoteServiceConfig,
}

impl RemoteCatalog {
    pub fn new(config: RemoteServiceConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "X-Api-Key",
            HeaderValue::from_str(&config.api_key)
                .map_err(|e| AppError::Fetch(format!("invalid api key header: {e}")))?,
        );
        headers.insert(
            "X-Api-Secret",
            HeaderValue::from_str(&config.api_secret)
                .map_err(|e| AppError::Fetch(format!("invalid api secret header: {e}")))?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;

        Ok(Self { http, config })
    }

    /// Retrieve the complete remote catalog as one in-memory snapshot.
    pub async fn fetch_all(&self) -> Result<Vec<RemoteProduct>> {
        let page_size = self.config.page_size;
        let mut products = Vec::new();
        let mut offset: usize = 0;

        loop {
            let page = self.fetch_page_with_retry(offset).await?;
            let fetched = page.results.len();
            products.extend(page.results);
            debug!(offset, fetched, "fetched remote catalog page");

            // Only an exactly-full page with the next-page flag set continues
            // the scan; a short page is final even when the flag says otherwise.
            if !page.next_page_available || fetched != page_size {
                break;
            }
            offset += page_size;
            tokio::time::sleep(Duration::from_millis(self.config.page_delay_ms)).await;
        }

        info!(products = products.len(), "remote catalog snapshot complete");
        Ok(products)
    }

    async fn fetch_page_with_retry(&self, offset: usize) -> Result<CatalogPage> {
        let retries = self.config.retry_attempts.saturating_sub(1) as usize;
        let strategy = FixedInterval::from_millis(self.config.retry_delay_ms).take(retries);
        Retry::spawn(strategy, || self.fetch_page(offset)).await
    }

    async fn fetch_page(&self, offset: usize) -> Result<CatalogPage> {
        let url = format!("{}/v1/products", self.config.base_url.trim_end_matches('/'));
        let response = self
            .http
            .get(&url)
            .query(&[("start", offset)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Fetch(format!(
                "page at offset {} returned {}",
                offset,
                response.status()
            )));
        }

        Ok(response.json().await?)
    }
}
