use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::config::SchedulerConfig;
use crate::reconciler::Reconciler;
use crate::store::PriceStore;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RunStats {
    pub run_count: u64,
    pub success_count: u64,
    pub error_count: u64,
    pub last_run: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Fires the reconciler on the configured cron interval. One job, one
/// system-wide run at a time; overlapping runs are prevented by the run
/// itself holding the tokio task until completion.
pub struct ReconcileScheduler<S: PriceStore + 'static> {
    scheduler: JobScheduler,
    reconciler: Arc<Reconciler<S>>,
    stats: Arc<RwLock<RunStats>>,
    config: SchedulerConfig,
}

impl<S: PriceStore + 'static> ReconcileScheduler<S> {
    pub async fn new(reconciler: Arc<Reconciler<S>>, config: SchedulerConfig) -> Result<Self> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            scheduler,
            reconciler,
            stats: Arc::new(RwLock::new(RunStats::default())),
            config,
        })
    }

    pub async fn start(&mut self) -> Result<()> {
        if !Self::validate_cron_expression(&self.config.interval) {
            return Err(anyhow::anyhow!(
                "Invalid cron expression: {}",
                self.config.interval
            ));
        }

        let reconciler = Arc::clone(&self.reconciler);
        let stats = Arc::clone(&self.stats);

        // The job scheduler wants a seconds field in front of the usual five.
        let schedule = format!("0 {}", self.config.interval);
        let job = Job::new_async(schedule.as_str(), move |_uuid, _l| {
            let reconciler = Arc::clone(&reconciler);
            let stats = Arc::clone(&stats);

            Box::pin(async move {
                tracing::debug!("starting scheduled reconciliation");
                let outcome = reconciler.run().await;

                let mut stats = stats.write().await;
                stats.run_count += 1;
                stats.last_run = Some(Utc::now());
                match outcome {
                    Ok(report) => {
                        tracing::info!(
                            updated = report.success_count,
                            failed = report.failure_count,
                            "scheduled reconciliation complete"
                        );
                        stats.success_count += 1;
                        stats.last_error = None;
                    }
                    Err(e) => {
                        tracing::error!("scheduled reconciliation failed: {}", e);
                        stats.error_count += 1;
                        stats.last_error = Some(e.to_string());
                    }
                }
            })
        })?;

        self.scheduler.add(job).await?;
        self.scheduler.start().await?;
        tracing::info!(interval = %self.config.interval, "reconcile scheduler started");
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        self.scheduler.shutdown().await?;
        tracing::info!("reconcile scheduler shutdown");
        Ok(())
    }

    pub async fn stats(&self) -> RunStats {
        self.stats.read().await.clone()
    }

    /// Validate a cron expression
    pub fn validate_cron_expression(expression: &str) -> bool {
        // Basic cron validation - 5 parts (minute hour day month weekday)
        let parts: Vec<&str> = expression.split_whitespace().collect();
        if parts.len() != 5 {
            return false;
        }

        // Each part should be valid
        for part in parts {
            if part.is_empty() {
                return false;
            }
            // Allow numbers, ranges, lists, wildcards, and steps
            if !part
                .chars()
                .all(|c| c.is_ascii_digit() || c == '*' || c == '-' || c == ',' || c == '/')
            {
                return false;
            }
        }

        true
    }
}
