use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::{timeout_at, Instant};
use tracing::{error, info, warn};

use super::{HarnessError, ProgressCounter, WorkOperation, WorkOutcome};

/// One (latency class, id) pair to probe through the slow read path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SweepProbe {
    pub latency_class: u32,
    pub id: u64,
}

impl fmt::Display for SweepProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "latency_class={} id={}", self.latency_class, self.id)
    }
}

/// Aggregate view over one sweep invocation.
///
/// `succeeded + failed + timed_out == submitted`. A non-zero `timed_out`
/// means the deadline cut the sweep short; outcomes collected before the
/// deadline stay valid and counted exactly once.
#[derive(Debug)]
pub struct SweepReport {
    pub submitted: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub timed_out: u64,
    pub elapsed: Duration,
}

impl SweepReport {
    pub fn is_complete(&self) -> bool {
        self.timed_out == 0
    }
}

/// Exhausts a slow read operation over ids `1..=max_id` for every latency
/// class, all probes in flight at once.
///
/// Each probe runs as its own tokio task, so tens of thousands of
/// simultaneously suspended probes cost a handful of OS threads. A probe
/// failure is recorded and logged with its probe context and never cancels
/// siblings. The whole sweep is bounded by one global deadline; on expiry the
/// executor stops waiting, aborts the probes still in flight and reports them
/// as timed out (results of aborted probes are discarded, never half-counted).
pub struct SweepExecutor {
    progress_log_every: u64,
}

impl SweepExecutor {
    /// `progress_log_every` is in completed ids per latency class.
    pub fn new(progress_log_every: u64) -> Self {
        Self { progress_log_every }
    }

    pub async fn sweep<O>(
        &self,
        max_id: u64,
        latency_classes: &[u32],
        op: Arc<O>,
        timeout: Duration,
        progress: ProgressCounter,
    ) -> Result<SweepReport, HarnessError>
    where
        O: WorkOperation<SweepProbe> + 'static,
        O::Output: 'static,
    {
        let submitted = max_id * latency_classes.len() as u64;
        let started = std::time::Instant::now();
        let deadline = Instant::now() + timeout;
        info!(
            max_id,
            latency_classes = ?latency_classes,
            submitted,
            timeout_secs = timeout.as_secs(),
            "sweep starting"
        );

        let mut tasks: JoinSet<WorkOutcome<SweepProbe, O::Output>> = JoinSet::new();
        for id in 1..=max_id {
            for &latency_class in latency_classes {
                let op = Arc::clone(&op);
                let every = self.progress_log_every;
                tasks.spawn(async move {
                    let probe = SweepProbe { latency_class, id };
                    match op.execute(probe).await {
                        Ok(value) => {
                            if every > 0 && id % every == 0 {
                                info!(latency_class, id, "sweep progress");
                            }
                            WorkOutcome::Success { item: probe, value }
                        }
                        Err(e) => WorkOutcome::Failure {
                            item: probe,
                            error: format!("{e:#}"),
                        },
                    }
                });
            }
        }

        let mut succeeded = 0u64;
        let mut failed = 0u64;
        loop {
            match timeout_at(deadline, tasks.join_next()).await {
                Ok(None) => break,
                Ok(Some(Ok(outcome))) => {
                    progress.step();
                    match outcome {
                        WorkOutcome::Success { .. } => succeeded += 1,
                        WorkOutcome::Failure { item, error } => {
                            error!(
                                latency_class = item.latency_class,
                                id = item.id,
                                error = %error,
                                "sweep probe failed"
                            );
                            failed += 1;
                        }
                    }
                }
                Ok(Some(Err(e))) => return Err(HarnessError::Dispatch(e.to_string())),
                Err(_) => {
                    // Deadline: abandon and cancel whatever is still in
                    // flight so nothing mutates shared state after we return.
                    tasks.abort_all();
                    break;
                }
            }
        }

        let report = SweepReport {
            submitted,
            succeeded,
            failed,
            timed_out: submitted - succeeded - failed,
            elapsed: started.elapsed(),
        };
        if report.is_complete() {
            info!(
                submitted = report.submitted,
                succeeded = report.succeeded,
                failed = report.failed,
                elapsed_ms = report.elapsed.as_millis() as u64,
                "sweep done"
            );
        } else {
            warn!(
                submitted = report.submitted,
                succeeded = report.succeeded,
                failed = report.failed,
                timed_out = report.timed_out,
                "sweep deadline elapsed with probes outstanding"
            );
        }
        Ok(report)
    }
}
