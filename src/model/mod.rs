//! Core data types for `perf_notes`.
//!
//! Everything here is a flat value type: records parsed out of the note
//! store, per-test expectation state, and the tagged comparison outcome.
//! No type in this module owns a persistence format; records travel as
//! tab-separated 5-tuples and that framing lives in [`crate::notes`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metric names covered by the `all` selector.
///
/// `bytes allocated` really does contain a space; it is the literal field
/// name in the runtime statistics output that measurements are extracted
/// from.
pub const TESTING_METRICS: [&str; 3] = [
    "bytes allocated",
    "peak_megabytes_allocated",
    "max_bytes_used",
];

/// Default allowed deviation, in percent.
///
/// Deliberately loose: the suite should notify about regressions without
/// breaking on measurement noise.
pub const DEFAULT_DEVIATION: f64 = 20.0;

/// One historical measurement, parsed from the note store.
///
/// The `commit` field is not present in the raw note text; the reader
/// injects the commit it queried. Duplicate records for the same
/// (test, metric) may exist when a test ran multiple times; the last one
/// in encounter order is authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Test environment label, e.g. `local`.
    pub test_env: String,
    /// Test name.
    pub test: String,
    /// Way the test was compiled/run, e.g. `normal` or `optasm`.
    pub way: String,
    /// Metric field name, e.g. `bytes allocated`.
    pub metric: String,
    /// Measured value.
    pub value: i64,
    /// Commit the record was stored against (injected by the reader).
    pub commit: String,
}

/// One freshly measured value, queued for the end-of-run note append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccumulatedMetric {
    pub test_env: String,
    pub test: String,
    pub way: String,
    pub metric: String,
    pub value: i64,
}

impl AccumulatedMetric {
    /// Serialize as the tab-joined 5-tuple the note store consumes.
    #[must_use]
    pub fn to_tab_line(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}",
            self.test_env, self.test, self.way, self.metric, self.value
        )
    }
}

/// Which metrics a test wants tracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricSelector {
    /// Every metric in [`TESTING_METRICS`].
    All,
    /// A single named metric.
    One(String),
    /// An explicit set of metric names.
    Set(Vec<String>),
}

impl MetricSelector {
    /// Parse the selector notation used in test definitions: the literal
    /// `all`, otherwise a single metric name.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s == "all" {
            Self::All
        } else {
            Self::One(s.to_string())
        }
    }
}

/// Declarative per-test stats configuration, written by the test author
/// and applied by the driver before the test runs.
///
/// This is deliberately a plain struct rather than a deferred closure:
/// the driver applies it at a fixed point in its pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsCollection {
    pub metrics: MetricSelector,
    /// Allowed deviation in percent.
    pub deviation: f64,
    /// True for tests that measure the compiler itself rather than the
    /// compiled program. Rare, hence the default.
    pub compiler: bool,
}

impl Default for StatsCollection {
    fn default() -> Self {
        Self {
            metrics: MetricSelector::All,
            deviation: DEFAULT_DEVIATION,
            compiler: false,
        }
    }
}

/// Expected baseline for one metric.
///
/// `expected == 0` is a sentinel: no prior baseline exists, and evaluation
/// must pass unconditionally without bound-checking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Expectation {
    pub expected: i64,
    /// Allowed deviation in percent, as registered.
    pub deviation: f64,
}

impl Expectation {
    /// The permissive "no baseline" expectation.
    #[must_use]
    pub const fn absent() -> Self {
        Self {
            expected: 0,
            deviation: 0.0,
        }
    }
}

/// Mutable per-test state populated during registration and read during
/// evaluation.
#[derive(Debug, Clone, Default)]
pub struct TestOptions {
    /// Metric name to registered expectation.
    pub stats_range_fields: HashMap<String, Expectation>,
    /// True when this test measures compiler performance numbers.
    pub is_compiler_stats_test: bool,
    /// True when the test should not run at all (compiler stats under a
    /// debug-instrumented build produce non-comparable numbers).
    pub skip: bool,
}

/// Tagged outcome of a metric comparison.
///
/// Out-of-band values are reported through this type, never through `Err`:
/// a failed comparison is an ordinary result of a test run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "passFail", rename_all = "lowercase")]
pub enum Outcome {
    Pass,
    Fail {
        reason: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        tag: Option<String>,
    },
}

impl Outcome {
    /// Construct a failure outcome.
    #[must_use]
    pub fn fail_because(reason: impl Into<String>, tag: Option<&str>) -> Self {
        Self::Fail {
            reason: reason.into(),
            tag: tag.map(ToString::to_string),
        }
    }

    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_parse() {
        assert_eq!(MetricSelector::parse("all"), MetricSelector::All);
        assert_eq!(
            MetricSelector::parse("max_bytes_used"),
            MetricSelector::One("max_bytes_used".to_string())
        );
    }

    #[test]
    fn test_stats_collection_defaults() {
        let stats = StatsCollection::default();
        assert_eq!(stats.metrics, MetricSelector::All);
        assert!((stats.deviation - 20.0).abs() < f64::EPSILON);
        assert!(!stats.compiler);
    }

    #[test]
    fn test_accumulated_tab_line() {
        let m = AccumulatedMetric {
            test_env: "local".to_string(),
            test: "T100".to_string(),
            way: "normal".to_string(),
            metric: "bytes allocated".to_string(),
            value: 8_675_309,
        };
        assert_eq!(
            m.to_tab_line(),
            "local\tT100\tnormal\tbytes allocated\t8675309"
        );
    }

    #[test]
    fn test_outcome_helpers() {
        assert!(Outcome::Pass.is_pass());
        let fail = Outcome::fail_because("value is too high", Some("stat"));
        assert!(!fail.is_pass());
        match fail {
            Outcome::Fail { reason, tag } => {
                assert_eq!(reason, "value is too high");
                assert_eq!(tag.as_deref(), Some("stat"));
            }
            Outcome::Pass => unreachable!(),
        }
    }

    #[test]
    fn test_absent_expectation_is_sentinel() {
        let e = Expectation::absent();
        assert_eq!(e.expected, 0);
        assert!(e.deviation.abs() < f64::EPSILON);
    }
}
