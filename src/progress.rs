//! Progress counters for a running conversion.
//!
//! Written by the pipeline as items finalize and readable from any thread.
//! Counters are independent atomics: a poller may see `processed` one item
//! ahead of `accepted`, which is harmless.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::stream::ItemOutcome;

/// Shared progress state for one conversion.
#[derive(Debug)]
pub struct ConversionProgress {
    start_time: Instant,
    processed: AtomicU64,
    accepted: AtomicU64,
    skipped: AtomicU64,
    incomplete: AtomicU64,
    total: AtomicU64,
    total_known: AtomicBool,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub processed: u64,
    pub accepted: u64,
    pub skipped: u64,
    pub incomplete: u64,
    /// `None` while the total is still unknown.
    pub total: Option<u64>,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl ProgressSnapshot {
    /// Completed fraction in `[0, 1]`, when the total is known.
    #[must_use]
    pub fn fraction(&self) -> Option<f64> {
        match self.total {
            Some(0) => Some(1.0),
            Some(total) => Some((self.processed as f64 / total as f64).min(1.0)),
            None => None,
        }
    }
}

impl Default for ConversionProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversionProgress {
    #[must_use]
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            processed: AtomicU64::new(0),
            accepted: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
            incomplete: AtomicU64::new(0),
            total: AtomicU64::new(0),
            total_known: AtomicBool::new(false),
        }
    }

    /// Publish the item total.
    pub fn set_total(&self, total: u64) {
        self.total.store(total, Ordering::Relaxed);
        self.total_known.store(true, Ordering::Release);
    }

    /// Count one finalized item. Returns the new processed count.
    pub fn record(&self, outcome: &ItemOutcome) -> u64 {
        let counter = match outcome {
            ItemOutcome::Accepted(_) => &self.accepted,
            ItemOutcome::Skipped(_) => &self.skipped,
            ItemOutcome::Incomplete => &self.incomplete,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.processed.fetch_add(1, Ordering::Relaxed) + 1
    }

    #[must_use]
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn total(&self) -> Option<u64> {
        self.total_known
            .load(Ordering::Acquire)
            .then(|| self.total.load(Ordering::Relaxed))
    }

    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            processed: self.processed.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            incomplete: self.incomplete.load(Ordering::Relaxed),
            total: self.total(),
            elapsed: self.start_time.elapsed(),
        }
    }
}
