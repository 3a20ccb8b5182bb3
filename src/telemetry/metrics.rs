//! Counters for namespace-scoped chain invocations.

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counter for thread-safe increment operations.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    /// Creates a new counter initialized to zero.
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// Increments the counter by 1.
    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// Gets the current value of the counter.
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Outcome counters shared by namespace-scoped chain elements.
#[derive(Debug, Default)]
pub struct NetnsMetrics {
    /// Calls that entered the wrapper.
    pub invocations: Counter,
    /// Failures to read the current namespace or enter the target.
    pub switch_failures: Counter,
    /// Failures to return to the captured namespace.
    pub restore_failures: Counter,
    /// Downstream chain errors (namespace restored).
    pub downstream_failures: Counter,
}

impl NetnsMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point-in-time copy for logging.
    pub fn snapshot(&self) -> NetnsMetricsSnapshot {
        NetnsMetricsSnapshot {
            invocations: self.invocations.get(),
            switch_failures: self.switch_failures.get(),
            restore_failures: self.restore_failures.get(),
            downstream_failures: self.downstream_failures.get(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NetnsMetricsSnapshot {
    pub invocations: u64,
    pub switch_failures: u64,
    pub restore_failures: u64,
    pub downstream_failures: u64,
}
