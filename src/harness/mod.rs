//! Concurrent fan-out harness.
//!
//! Two components share one execution model: [`BatchLoader`] generates and
//! persists a batch of synthetic records, [`SweepExecutor`] exhausts a
//! (latency class, id) grid against a slow read path. Both spawn one tokio
//! task per work item, catch every per-item failure inside the task boundary
//! as a tagged [`WorkOutcome`], and aggregate outcomes so that nothing is
//! silently dropped: one outcome per submitted item, always.

pub mod loader;
pub mod sweep;

pub use loader::{BatchFailure, BatchLoader, BatchReport};
pub use sweep::{SweepExecutor, SweepProbe, SweepReport};

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Harness-level failures. Per-item failures never surface here; only the
/// inability of the dispatcher itself to run a task to completion does.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("dispatch failed: {0}")]
    Dispatch(String),
}

/// An operation the harness fans out over, supplied by the storage
/// collaborator. Must tolerate unbounded concurrent invocation; any call may
/// take arbitrary wall time and may fail independently of its siblings.
#[async_trait]
pub trait WorkOperation<I>: Send + Sync {
    type Output: Send;

    async fn execute(&self, input: I) -> anyhow::Result<Self::Output>;
}

/// Tagged result of one work item. Produced inside the worker task so no
/// error can escape a concurrent context unhandled.
#[derive(Debug)]
pub enum WorkOutcome<K, T> {
    Success { item: K, value: T },
    Failure { item: K, error: String },
}

/// Completed-item counter against a known total.
///
/// Stepped once per finished work item (success and failure both count) by
/// many concurrent workers; readable from any thread at any time without
/// blocking producers. Monotonically non-decreasing, never exceeds the total.
#[derive(Clone)]
pub struct ProgressCounter {
    done: Arc<AtomicU64>,
    total: u64,
}

impl ProgressCounter {
    pub fn new(total: u64) -> Self {
        Self {
            done: Arc::new(AtomicU64::new(0)),
            total,
        }
    }

    /// Records one completed item and returns the new position.
    pub fn step(&self) -> u64 {
        self.done.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn position(&self) -> u64 {
        self.done.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn is_complete(&self) -> bool {
        self.position() >= self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_counter_steps_and_reports() {
        let progress = ProgressCounter::new(3);
        assert_eq!(progress.position(), 0);
        assert!(!progress.is_complete());
        assert_eq!(progress.step(), 1);
        assert_eq!(progress.step(), 2);
        assert_eq!(progress.step(), 3);
        assert_eq!(progress.position(), 3);
        assert!(progress.is_complete());
    }

    #[tokio::test]
    async fn progress_counter_is_safe_under_concurrent_steps() {
        let progress = ProgressCounter::new(1000);
        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..10 {
            let progress = progress.clone();
            tasks.spawn(async move {
                for _ in 0..100 {
                    progress.step();
                }
            });
        }
        while let Some(result) = tasks.join_next().await {
            result.unwrap();
        }
        assert_eq!(progress.position(), 1000);
    }
}
