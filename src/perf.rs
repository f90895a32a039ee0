//! Performance instrumentation.
//!
//! Recompute, sort and export serialization are all O(n) over the dataset.
//! This module times them so slow tables show up in the log.
//!
//! ## Features
//!
//! - **Scoped timers**: RAII-style timing for code blocks
//! - **Operation statistics**: per-operation rolling samples with p95
//! - **Conditional compilation**: `profile_scope!` costs nothing without the
//!   `profiling` feature
//!
//! ```ignore
//! fn recompute(&mut self) {
//!     profile_scope!("recompute");
//!     // ... work ...
//! }
//! ```

use std::collections::{HashMap, VecDeque};
use std::time::Instant;
use tracing::{debug, warn};

// ============================================================================
// Constants
// ============================================================================

/// Operations slower than this are logged at warn level
pub const SLOW_OPERATION_MS: f64 = 50.0;

/// Number of samples kept per operation
const STATS_SAMPLE_COUNT: usize = 100;

// ============================================================================
// Profiling Macros (zero-cost when disabled)
// ============================================================================

/// Profile a scope with the given name. Zero-cost when profiling is disabled.
#[macro_export]
macro_rules! profile_scope {
    ($name:expr) => {
        #[cfg(feature = "profiling")]
        let _timer = $crate::perf::ScopedTimer::for_profiling($name);
        #[cfg(not(feature = "profiling"))]
        let _ = $name;
    };
    ($name:expr, $threshold_ms:expr) => {
        #[cfg(feature = "profiling")]
        let _timer = $crate::perf::ScopedTimer::new($name, $threshold_ms);
        #[cfg(not(feature = "profiling"))]
        let _ = ($name, $threshold_ms);
    };
}

// ============================================================================
// Operation Statistics
// ============================================================================

/// Rolling timing samples for one named operation.
#[derive(Clone, Debug, Default)]
pub struct OperationStats {
    samples: VecDeque<f64>,
    pub count: u64,
    pub max_ms: f64,
}

impl OperationStats {
    pub fn record(&mut self, ms: f64) {
        if self.samples.len() >= STATS_SAMPLE_COUNT {
            self.samples.pop_front();
        }
        self.samples.push_back(ms);
        self.count += 1;
        self.max_ms = self.max_ms.max(ms);
    }

    /// Mean of the retained samples, 0 when empty
    pub fn average(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    pub fn p95(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let mut sorted: Vec<f64> = self.samples.iter().copied().collect();
        sorted.sort_by(f64::total_cmp);
        let idx = ((sorted.len() as f64 * 0.95).ceil() as usize).saturating_sub(1);
        sorted[idx.min(sorted.len() - 1)]
    }
}

/// Per-grid timing table, keyed by operation name.
#[derive(Clone, Debug, Default)]
pub struct GridMetrics {
    operations: HashMap<&'static str, OperationStats>,
}

impl GridMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, name: &'static str, elapsed_ms: f64) {
        self.operations.entry(name).or_default().record(elapsed_ms);
        if elapsed_ms > SLOW_OPERATION_MS {
            warn!(
                operation = name,
                elapsed_ms = format!("{:.2}", elapsed_ms),
                "Slow grid operation"
            );
        }
    }

    /// Run `f`, recording how long it took under `name`.
    pub fn time<T>(&mut self, name: &'static str, f: impl FnOnce() -> T) -> T {
        let (result, elapsed_ms) = measure(f);
        self.record(name, elapsed_ms);
        result
    }

    pub fn stats(&self, name: &str) -> Option<&OperationStats> {
        self.operations.get(name)
    }

    pub fn operations(&self) -> impl Iterator<Item = (&'static str, &OperationStats)> {
        self.operations.iter().map(|(name, stats)| (*name, stats))
    }

    /// Log one debug line per operation, slowest p95 first.
    pub fn log_summary(&self) {
        let mut ops: Vec<_> = self.operations().collect();
        ops.sort_by(|a, b| b.1.p95().total_cmp(&a.1.p95()));
        for (name, stats) in ops {
            debug!(
                operation = name,
                count = stats.count,
                avg_ms = format!("{:.2}", stats.average()),
                p95_ms = format!("{:.2}", stats.p95()),
                max_ms = format!("{:.2}", stats.max_ms),
                "Grid operation timings"
            );
        }
    }

    pub fn reset(&mut self) {
        self.operations.clear();
    }
}

// ============================================================================
// Scoped Timer
// ============================================================================

/// A scoped timer that logs its duration on drop when over the threshold.
pub struct ScopedTimer {
    name: &'static str,
    start: Instant,
    threshold_ms: f64,
}

impl ScopedTimer {
    pub fn new(name: &'static str, threshold_ms: f64) -> Self {
        Self {
            name,
            start: Instant::now(),
            threshold_ms,
        }
    }

    /// Timer with a 1ms threshold, used by `profile_scope!`.
    pub fn for_profiling(name: &'static str) -> Self {
        Self::new(name, 1.0)
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        let elapsed_ms = self.elapsed_ms();
        if elapsed_ms <= self.threshold_ms {
            return;
        }

        if cfg!(feature = "profiling") {
            tracing::trace!("[PERF] {}: {:.2}ms", self.name, elapsed_ms);
            return;
        }

        warn!(
            operation = self.name,
            elapsed_ms = format!("{:.2}", elapsed_ms),
            threshold_ms = format!("{:.2}", self.threshold_ms),
            "Slow operation"
        );
    }
}

// ============================================================================
// Timing Utilities
// ============================================================================

/// Measure execution time of a closure and return both the result and elapsed time.
#[inline]
pub fn measure<T, F: FnOnce() -> T>(f: F) -> (T, f64) {
    let start = Instant::now();
    let result = f();
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    (result, elapsed_ms)
}
