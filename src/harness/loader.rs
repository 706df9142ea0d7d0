use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};

use super::{HarnessError, ProgressCounter, WorkOperation, WorkOutcome};

/// One failed batch slot, kept for diagnostics.
#[derive(Debug, Clone)]
pub struct BatchFailure {
    pub slot: u64,
    pub error: String,
}

/// Aggregate view over one batch load invocation.
///
/// `succeeded + failed == submitted` always; each slot is attempted exactly
/// once with no implicit retry.
#[derive(Debug)]
pub struct BatchReport {
    pub submitted: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub elapsed: Duration,
    pub failures: Vec<BatchFailure>,
}

/// Generates `total` records through a factory and submits each to a create
/// operation, one tokio task per slot.
///
/// A failing factory or operation marks its own slot as failed and leaves
/// every sibling slot untouched. The loader waits for all slots; there is no
/// batch-level timeout.
pub struct BatchLoader {
    progress_log_every: u64,
    max_in_flight: Option<usize>,
}

impl BatchLoader {
    /// `max_in_flight` of `None` (or a config value of 0) spawns every slot
    /// up front and lets the runtime multiplex them.
    pub fn new(progress_log_every: u64, max_in_flight: Option<usize>) -> Self {
        Self {
            progress_log_every,
            max_in_flight: max_in_flight.filter(|&n| n > 0),
        }
    }

    pub async fn load_batch<R, O, F>(
        &self,
        total: u64,
        factory: F,
        op: Arc<O>,
        progress: ProgressCounter,
    ) -> Result<BatchReport, HarnessError>
    where
        R: Send + 'static,
        O: WorkOperation<R> + 'static,
        O::Output: 'static,
        F: Fn(u64) -> anyhow::Result<R> + Send + Sync + 'static,
    {
        let started = Instant::now();
        info!(total, "batch load starting");

        let factory = Arc::new(factory);
        let limiter = self.max_in_flight.map(|n| Arc::new(Semaphore::new(n)));

        let mut tasks: JoinSet<WorkOutcome<u64, O::Output>> = JoinSet::new();
        for slot in 0..total {
            let factory = Arc::clone(&factory);
            let op = Arc::clone(&op);
            let limiter = limiter.clone();
            tasks.spawn(async move {
                let _permit = match limiter {
                    // The semaphore is never closed while tasks run.
                    Some(sem) => sem.acquire_owned().await.ok(),
                    None => None,
                };
                let record = match (*factory)(slot) {
                    Ok(record) => record,
                    Err(e) => {
                        return WorkOutcome::Failure {
                            item: slot,
                            error: format!("factory: {e:#}"),
                        }
                    }
                };
                match op.execute(record).await {
                    Ok(value) => WorkOutcome::Success { item: slot, value },
                    Err(e) => WorkOutcome::Failure {
                        item: slot,
                        error: format!("{e:#}"),
                    },
                }
            });
        }

        let mut succeeded = 0u64;
        let mut failures = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let outcome = joined.map_err(|e| HarnessError::Dispatch(e.to_string()))?;
            match outcome {
                WorkOutcome::Success { .. } => succeeded += 1,
                WorkOutcome::Failure { item, error } => {
                    error!(slot = item, error = %error, "batch slot failed");
                    failures.push(BatchFailure { slot: item, error });
                }
            }
            let done = progress.step();
            if self.progress_log_every > 0 && done % self.progress_log_every == 0 {
                info!(done, total, "batch progress");
            }
        }

        let report = BatchReport {
            submitted: total,
            succeeded,
            failed: failures.len() as u64,
            elapsed: started.elapsed(),
            failures,
        };
        info!(
            submitted = report.submitted,
            succeeded = report.succeeded,
            failed = report.failed,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "batch load done"
        );
        Ok(report)
    }
}
