use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// One record that could not be updated, with the human-readable reason.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordFailure {
    pub record_id: i64,
    pub reason: String,
}

/// Outcome of one reconciliation run. Failures are listed in the order the
/// records were processed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryReport {
    pub run_id: Uuid,
    pub success_count: usize,
    pub failure_count: usize,
    pub failures: Vec<RecordFailure>,
    pub total_time_ms: u64,
}

impl SummaryReport {
    pub fn records_processed(&self) -> usize {
        self.success_count + self.failure_count
    }
}

impl fmt::Display for SummaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Reconciliation run {}: {} updated, {} failed ({} records, {}ms)",
            self.run_id,
            self.success_count,
            self.failure_count,
            self.records_processed(),
            self.total_time_ms,
        )?;
        for failure in &self.failures {
            writeln!(f, "  record {}: {}", failure.record_id, failure.reason)?;
        }
        Ok(())
    }
}
