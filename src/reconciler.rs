use chrono::Utc;
use futures::future::join_all;
use rust_decimal::Decimal;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ReconcilerConfig;
use crate::extractor;
use crate::fetcher::RemoteCatalog;
use crate::matcher::{MatchOutcome, ProductMatcher};
use crate::models::{LocalProduct, RecordFailure, RemoteProduct, SummaryReport};
use crate::store::PriceStore;
use crate::utils::error::{AppError, Result};

/// Drives one reconciliation run: list the matchable local records, fetch
/// the remote snapshot once, then match, extract, and update each record
/// with per-record failure isolation.
pub struct Reconciler<S: PriceStore> {
    store: S,
    remote: RemoteCatalog,
    matcher: ProductMatcher,
    config: ReconcilerConfig,
}

impl<S: PriceStore> Reconciler<S> {
    pub fn new(
        store: S,
        remote: RemoteCatalog,
        matcher: ProductMatcher,
        config: ReconcilerConfig,
    ) -> Self {
        Self {
            store,
            remote,
            matcher,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// One end-to-end run. Store and fetch errors here abort the run; once
    /// the snapshot exists, failures stay scoped to single records.
    pub async fn run(&self) -> Result<SummaryReport> {
        let records = self.store.select_linked_records().await?;
        let catalog = self.remote.fetch_all().await?;
        Ok(self.reconcile_all(&records, &catalog).await)
    }

    /// Process records in batches: everything inside a batch runs
    /// concurrently against the immutable snapshot, the driver waits for the
    /// whole batch, then sleeps before the next one to keep outbound store
    /// writes bounded.
    pub async fn reconcile_all(
        &self,
        records: &[LocalProduct],
        catalog: &[RemoteProduct],
    ) -> SummaryReport {
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        let mut success_count = 0;
        let mut failures = Vec::new();

        info!(
            %run_id,
            records = records.len(),
            remote_products = catalog.len(),
            "starting reconciliation run"
        );

        let mut first_batch = true;
        for batch in records.chunks(self.config.batch_size.max(1)) {
            if !first_batch {
                tokio::time::sleep(Duration::from_millis(self.config.batch_delay_ms)).await;
            }
            first_batch = false;

            let outcomes = join_all(
                batch
                    .iter()
                    .map(|record| self.reconcile_record(record, catalog)),
            )
            .await;

            for (record, outcome) in batch.iter().zip(outcomes) {
                match outcome {
                    Ok(price) => {
                        debug!(record = record.id, %price, "price updated");
                        success_count += 1;
                    }
                    Err(err) => {
                        warn!(record = record.id, reason = %err, "record not updated");
                        failures.push(RecordFailure {
                            record_id: record.id,
                            reason: err.to_string(),
                        });
                    }
                }
            }
        }

        let report = SummaryReport {
            run_id,
            success_count,
            failure_count: failures.len(),
            failures,
            total_time_ms: started.elapsed().as_millis() as u64,
        };
        info!(
            %run_id,
            updated = report.success_count,
            failed = report.failure_count,
            "reconciliation run complete"
        );
        report
    }

    async fn reconcile_record(
        &self,
        record: &LocalProduct,
        catalog: &[RemoteProduct],
    ) -> Result<Decimal> {
        // The store already filters these out; a record without keys must
        // never reach the matcher as a wildcard.
        if !record.has_match_key() {
            return Err(AppError::NoMatch {
                record: record.label(),
            });
        }

        let matched = match self.matcher.find_match(record, catalog) {
            MatchOutcome::Matched(result) => result,
            MatchOutcome::Priceless => {
                return Err(AppError::NoPrice {
                    record: record.label(),
                });
            }
            MatchOutcome::NoMatch => {
                return Err(AppError::NoMatch {
                    record: record.label(),
                });
            }
        };

        let price = extractor::extract(&matched).ok_or_else(|| AppError::NoPrice {
            record: record.label(),
        })?;

        self.store.update_price(record.id, price, Utc::now()).await?;
        Ok(price)
    }
}
