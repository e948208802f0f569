//! Run-wide configuration and shared state.
//!
//! The test environment label, verbosity, debug flag, and the metric
//! accumulation buffer live in an explicit [`RunContext`] owned by the
//! caller and passed to the evaluator, with a clear lifetime: built once
//! at process start, drained once at end-of-run.

use crate::model::AccumulatedMetric;

/// Verbosity level at which bound diagnostics are printed even for
/// passing comparisons.
pub const STATS_VERBOSITY: u8 = 4;

/// Note namespace under which performance records are stored.
pub const PERF_NAMESPACE: &str = "perf";

/// Explicit run context for registration and evaluation.
///
/// Shared mutable state is limited to the accumulation buffer, appended to
/// from otherwise single-threaded test evaluation. If evaluation is ever
/// parallelized, use one context per worker and merge the buffers at
/// end-of-run; nothing here locks internally.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Test environment label recorded with every measurement.
    pub test_env: String,
    /// Verbosity level; `>= STATS_VERBOSITY` prints diagnostics on pass.
    pub verbosity: u8,
    /// True when the compiler under test carries debug instrumentation;
    /// compiler-stats tests are skipped in that case.
    pub compiler_debugged: bool,
    /// Accept malformed test names with a warning instead of erroring.
    /// Restores the historical behavior where the invalid-name failure was
    /// constructed but never attached to the test outcome.
    pub lenient_test_names: bool,
    accumulated: Vec<AccumulatedMetric>,
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new("local")
    }
}

impl RunContext {
    /// Create a context for the given test environment.
    #[must_use]
    pub fn new(test_env: impl Into<String>) -> Self {
        Self {
            test_env: test_env.into(),
            verbosity: 0,
            compiler_debugged: false,
            lenient_test_names: false,
            accumulated: Vec::new(),
        }
    }

    /// Queue one measurement for the end-of-run note append.
    pub fn accumulate(&mut self, metric: AccumulatedMetric) {
        self.accumulated.push(metric);
    }

    /// Measurements queued so far, in append order.
    #[must_use]
    pub fn accumulated(&self) -> &[AccumulatedMetric] {
        &self.accumulated
    }

    /// Take the buffer for flushing. Called exactly once, by the driver,
    /// after all tests complete.
    pub fn drain_accumulated(&mut self) -> Vec<AccumulatedMetric> {
        std::mem::take(&mut self.accumulated)
    }

    /// The queued measurements as note lines ready to append.
    #[must_use]
    pub fn accumulated_lines(&self) -> Vec<String> {
        self.accumulated
            .iter()
            .map(AccumulatedMetric::to_tab_line)
            .collect()
    }
}
