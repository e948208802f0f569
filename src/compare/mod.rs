//! Metric registration and tolerance evaluation.
//!
//! The flow across a test run:
//!
//! 1. Before the test executes, the driver applies the test's declarative
//!    [`StatsCollection`] via [`register_expectations`], which reads the
//!    baseline from the note store and fills in
//!    [`TestOptions::stats_range_fields`].
//! 2. The test runs and produces raw output containing serialized metric
//!    readings of the shape `("<metric>", "<integer>")`.
//! 3. [`evaluate_metric`] extracts the reading, queues it for the
//!    end-of-run note append, and classifies it against the registered
//!    expectation.
//!
//! A failed comparison is data, not an error: it comes back as
//! [`Outcome::Fail`] with a reason and the `stat` tag.

use crate::config::{PERF_NAMESPACE, RunContext, STATS_VERBOSITY};
use crate::error::{PerfError, Result};
use crate::model::{
    AccumulatedMetric, Expectation, MetricRecord, MetricSelector, Outcome, StatsCollection,
    TESTING_METRICS, TestOptions,
};
use crate::notes::{RecordLog, fetch_records};
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

/// Baselines are read from the parent of the commit under test.
pub const BASELINE_REF: &str = "HEAD^";

/// Optional run of digits, then at least one letter, then letters, digits,
/// `.`, `_`, `-`.
static TEST_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[0-9]*[a-zA-Z][a-zA-Z0-9._-]*$").expect("test name pattern"));

/// True if `name` is an acceptable test name.
#[must_use]
pub fn is_valid_test_name(name: &str) -> bool {
    TEST_NAME_RE.is_match(name)
}

/// Populate `opts` with baseline expectations for `name`.
///
/// Reads the `perf` note at [`BASELINE_REF`]. A test with no history gets
/// the permissive `(0, 0)` expectation for every selected metric, so a new
/// test can never fail on its first run. When the test has history, each
/// selected metric is registered with the value of the last matching
/// record; a metric the history does not mention also falls back to
/// `(0, 0)`.
///
/// Compiler-stats tests are marked as such, and skipped outright when the
/// compiler carries debug instrumentation.
///
/// # Errors
///
/// Returns [`PerfError::InvalidTestName`] for a malformed name, unless
/// `ctx.lenient_test_names` is set, in which case the name is accepted
/// with a warning.
pub fn register_expectations(
    ctx: &RunContext,
    log: &impl RecordLog,
    name: &str,
    opts: &mut TestOptions,
    stats: &StatsCollection,
) -> Result<()> {
    if !is_valid_test_name(name) {
        if ctx.lenient_test_names {
            warn!(name, "accepting invalid test name (lenient mode)");
        } else {
            return Err(PerfError::InvalidTestName {
                name: name.to_string(),
            });
        }
    }

    let records = fetch_records(log, PERF_NAMESPACE, BASELINE_REF);
    let for_test: Vec<&MetricRecord> = records.iter().filter(|r| r.test == name).collect();

    if for_test.is_empty() {
        // No prior metrics for this test: disable bound-checking.
        for field in selected_metrics(&stats.metrics) {
            opts.stats_range_fields.insert(field, Expectation::absent());
        }
        return Ok(());
    }

    if stats.compiler {
        opts.is_compiler_stats_test = true;
        // Compiler performance numbers change when debugging is on, making
        // the results useless and confusing. Skip instead.
        if ctx.compiler_debugged {
            opts.skip = true;
        }
    }

    match &stats.metrics {
        MetricSelector::All => {
            for field in TESTING_METRICS {
                register_one(opts, &for_test, field, stats.deviation);
            }
        }
        // A single named metric registers exactly that metric and stops.
        MetricSelector::One(field) => register_one(opts, &for_test, field, stats.deviation),
        MetricSelector::Set(fields) => {
            for field in fields {
                register_one(opts, &for_test, field, stats.deviation);
            }
        }
    }

    Ok(())
}

/// Metric names a selector expands to.
#[must_use]
pub fn selected_metrics(selector: &MetricSelector) -> Vec<String> {
    match selector {
        MetricSelector::All => TESTING_METRICS.iter().map(ToString::to_string).collect(),
        MetricSelector::One(field) => vec![field.clone()],
        MetricSelector::Set(fields) => fields.clone(),
    }
}

fn register_one(opts: &mut TestOptions, for_test: &[&MetricRecord], field: &str, deviation: f64) {
    // Duplicate records happen when a test ran multiple times; the last
    // one in encounter order is authoritative.
    let expectation = for_test
        .iter()
        .filter(|r| r.metric == field)
        .next_back()
        .map_or_else(Expectation::absent, |r| Expectation {
            expected: r.value,
            deviation,
        });
    opts.stats_range_fields.insert(field.to_string(), expectation);
}

/// Extract `field` from the test's raw output and compare it against the
/// registered expectation.
///
/// The extracted value is queued on `ctx` for the end-of-run note append
/// regardless of the outcome. `deviation` overrides whatever deviation was
/// registered. An expectation of `0` means "no baseline" and passes
/// unconditionally.
pub fn evaluate_metric(
    ctx: &mut RunContext,
    opts: &TestOptions,
    test: &str,
    field: &str,
    deviation: f64,
    contents: &str,
    way: &str,
) -> Outcome {
    let full_name = format!("{test} ({way})");
    let expectation = opts
        .stats_range_fields
        .get(field)
        .copied()
        .unwrap_or_else(Expectation::absent);

    let pattern = format!("\\(\"{}\", \"([0-9]+)\"\\)", regex::escape(field));
    let re = Regex::new(&pattern).expect("escaped stats field pattern");

    let Some(caps) = re.captures(contents) else {
        println!("Failed to find field: {field}");
        return Outcome::fail_because("no such stats field", None);
    };

    let Ok(value) = caps[1].parse::<i64>() else {
        warn!(field, raw = &caps[1], "stats field value out of range");
        return Outcome::fail_because("no such stats field", None);
    };

    ctx.accumulate(AccumulatedMetric {
        test_env: ctx.test_env.clone(),
        test: test.to_string(),
        way: way.to_string(),
        metric: field.to_string(),
        value,
    });

    if expectation.expected == 0 {
        return Outcome::Pass;
    }

    compare_against_baseline(
        &full_name,
        field,
        value,
        expectation.expected,
        deviation,
        ctx.verbosity,
    )
}

/// Classify `value` against `expected` within the allowed deviation band.
///
/// Both bound checks run; with degenerate bounds the "too high" check is
/// evaluated last and wins. The diagnostic block is printed on failure, or
/// whenever verbosity reaches [`STATS_VERBOSITY`].
#[must_use]
pub fn compare_against_baseline(
    full_name: &str,
    field: &str,
    value: i64,
    expected: i64,
    deviation: f64,
    verbosity: u8,
) -> Outcome {
    let (lower, upper) = acceptance_bounds(expected, deviation);

    let mut result = Outcome::Pass;
    if value < lower {
        result = Outcome::fail_because(
            "value is too low (if this is because of an improvement, feel free to ignore)",
            Some("stat"),
        );
    }
    if value > upper {
        result = Outcome::fail_because("value is too high", Some("stat"));
    }

    if !result.is_pass() || verbosity >= STATS_VERBOSITY {
        print!(
            "{}",
            bounds_report(full_name, field, value, expected, deviation, lower, upper)
        );
    }

    result
}

/// Acceptance bounds around `expected` for the given deviation percent.
///
/// The rounding is asymmetric on purpose, biasing toward leniency on the
/// boundary: the lower bound truncates, the upper bound rounds the ceiling
/// with a 0.5 pre-add to absorb float representation error.
#[must_use]
pub fn acceptance_bounds(expected: i64, deviation: f64) -> (i64, i64) {
    let expected = expected as f64;
    let lower = (expected * ((100.0 - deviation) / 100.0)).trunc() as i64;
    let upper = (0.5 + (expected * ((100.0 + deviation) / 100.0)).ceil()).trunc() as i64;
    (lower, upper)
}

/// Percent deviation of `value` from `expected`, rounded to one decimal.
#[must_use]
pub fn percent_deviation(value: i64, expected: i64) -> f64 {
    let raw = (value as f64 * 100.0) / (expected as f64) - 100.0;
    (raw * 10.0).round() / 10.0
}

/// Render the diagnostic block for one comparison.
///
/// Values are right-justified to the widest of expected/bounds/actual; the
/// deviation row is omitted when the value matched exactly.
#[must_use]
pub fn bounds_report(
    full_name: &str,
    field: &str,
    value: i64,
    expected: i64,
    deviation: f64,
    lower: i64,
    upper: i64,
) -> String {
    let width = [expected, lower, upper, value]
        .iter()
        .map(|v| v.to_string().len())
        .max()
        .unwrap_or(1);

    let mut out = String::new();
    out.push_str(&format!(
        "    Expected    {full_name} {field}: {expected:>width$} +/-{}%\n",
        format_deviation(deviation)
    ));
    out.push_str(&format!(
        "    Lower bound {full_name} {field}: {lower:>width$}\n"
    ));
    out.push_str(&format!(
        "    Upper bound {full_name} {field}: {upper:>width$}\n"
    ));
    out.push_str(&format!(
        "    Actual      {full_name} {field}: {value:>width$}\n"
    ));
    if value != expected {
        out.push_str(&format!(
            "    Deviation   {full_name} {field}: {:>width$.1} %\n",
            percent_deviation(value, expected)
        ));
    }
    out
}

/// Render a deviation percentage without a trailing `.0`.
fn format_deviation(deviation: f64) -> String {
    if deviation.fract() == 0.0 {
        format!("{deviation:.0}")
    } else {
        format!("{deviation}")
    }
}
