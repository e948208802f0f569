//! Cross-commit comparison tables.
//!
//! Takes the concatenated records fetched for a list of commits, applies
//! the environment / test-name / minimum-delta filters, and renders two
//! aligned tables: raw metric values per commit, then percent deltas of
//! every commit against the first (reference) commit.
//!
//! The delta formula `100 * (reference - other) / other` is directional:
//! its sign depends on which value is larger. That asymmetry is part of
//! the table's established semantics and is kept as-is.

use crate::model::MetricRecord;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use unicode_width::UnicodeWidthStr;

/// Column widths of the report layout.
const TEST_COL: usize = 27;
const METRIC_COL: usize = 30;
const COMMIT_COL: usize = 18;

/// Commit refs are shortened to this many characters in headers.
const COMMIT_DISPLAY: usize = 10;

/// Record filters for the report.
#[derive(Debug, Default)]
pub struct ReportFilters {
    /// Keep only records from this test environment.
    pub test_env: Option<String>,
    /// Keep only tests whose name matches (search semantics).
    pub test_name: Option<Regex>,
    /// Keep only tests with a cross-commit spread above this percentage.
    /// Ignored when fewer than two commits are selected.
    pub min_delta: Option<f64>,
}

/// One row of the report: a (test, metric) pair with one value per commit.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRow {
    pub test: String,
    pub metric: String,
    /// Value per selected commit, in commit order; `None` when the commit
    /// has no measurement for this test+metric.
    pub values: Vec<Option<i64>>,
    /// Percent delta of the reference value against each commit's value.
    /// `None` when either side is missing or the divisor is zero.
    pub deltas: Vec<Option<f64>>,
}

/// Percent delta of `reference` against `other`, rounded to two decimals.
#[must_use]
pub fn delta(reference: f64, other: f64) -> f64 {
    let raw = 100.0 * (reference - other) / other;
    (raw * 100.0).round() / 100.0
}

/// Directional spread test used by the minimum-delta filter: the divisor
/// is always the smaller value.
#[must_use]
pub fn exceeds_min_delta(v1: f64, v2: f64, threshold: f64) -> bool {
    if v1 > v2 {
        100.0 * (v1 - v2) / v2 > threshold
    } else {
        100.0 * (v2 - v1) / v1 > threshold
    }
}

/// Apply the environment, test-name, and minimum-delta filters.
///
/// The minimum-delta filter retains every record of a test once any
/// cross-commit pair for the same test and metric exceeds the threshold
/// against the reference (first) commit. It has no meaning for a single
/// commit and is skipped in that case.
#[must_use]
pub fn apply_filters(
    records: Vec<MetricRecord>,
    filters: &ReportFilters,
    commits: &[String],
) -> Vec<MetricRecord> {
    let mut records = records;

    if let Some(env) = &filters.test_env {
        records.retain(|r| &r.test_env == env);
    }

    if let Some(re) = &filters.test_name {
        records.retain(|r| re.is_match(&r.test));
    }

    if let Some(threshold) = filters.min_delta {
        if commits.len() > 1 {
            let reference = &commits[0];
            let mut keep: HashSet<String> = HashSet::new();
            for r in records.iter().filter(|r| &r.commit == reference) {
                let spread_exceeded = records.iter().any(|other| {
                    other.commit != *reference
                        && other.test == r.test
                        && other.metric == r.metric
                        && exceeds_min_delta(r.value as f64, other.value as f64, threshold)
                });
                if spread_exceeded {
                    keep.insert(r.test.clone());
                }
            }
            records.retain(|r| keep.contains(&r.test));
        }
    }

    records
}

/// Build report rows from filtered records.
///
/// Rows are keyed by (test, metric), ordered by first appearance in the
/// reference commit's records. Cell values take the last matching record
/// per commit, consistent with "last duplicate wins" everywhere else.
#[must_use]
pub fn build_rows(records: &[MetricRecord], commits: &[String]) -> Vec<ReportRow> {
    let Some(reference) = commits.first() else {
        return Vec::new();
    };

    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut rows = Vec::new();

    for r in records.iter().filter(|r| &r.commit == reference) {
        let key = (r.test.clone(), r.metric.clone());
        if !seen.insert(key) {
            continue;
        }

        let values: Vec<Option<i64>> = commits
            .iter()
            .map(|commit| {
                records
                    .iter()
                    .filter(|c| &c.commit == commit && c.test == r.test && c.metric == r.metric)
                    .next_back()
                    .map(|c| c.value)
            })
            .collect();

        let reference_value = values[0];
        let deltas: Vec<Option<f64>> = values
            .iter()
            .map(|v| match (reference_value, v) {
                (Some(v1), Some(v2)) if *v2 != 0 => Some(delta(v1 as f64, *v2 as f64)),
                _ => None,
            })
            .collect();

        rows.push(ReportRow {
            test: r.test.clone(),
            metric: r.metric.clone(),
            values,
            deltas,
        });
    }

    rows
}

/// Render the full report: the value table, and the percent table when
/// more than one commit is selected.
#[must_use]
pub fn render_tables(rows: &[ReportRow], commits: &[String]) -> String {
    let mut out = String::new();

    render_table(&mut out, rows, commits, "commit", |row, i| {
        row.values[i].map_or_else(|| "-".to_string(), |v| v.to_string())
    });

    // A percent table has no meaningful output without a commit to
    // compare to.
    if commits.len() > 1 {
        render_table(&mut out, rows, commits, "percent", |row, i| {
            row.deltas[i].map_or_else(|| "-".to_string(), |d| format!("{}%", format_rounded(d)))
        });
    }

    out
}

fn render_table(
    out: &mut String,
    rows: &[ReportRow],
    commits: &[String],
    unit: &str,
    cell: impl Fn(&ReportRow, usize) -> String,
) {
    let commit_headers: String = commits
        .iter()
        .map(|c| pad(&short_ref(c), COMMIT_COL))
        .collect();

    let first_line = format!(
        "{}{}",
        " ".repeat(TEST_COL + METRIC_COL),
        commits
            .iter()
            .map(|_| pad(unit, COMMIT_COL))
            .collect::<String>()
            .trim_end()
    );
    let second_line = format!(
        "{}{}{}",
        pad("Test", TEST_COL),
        pad("Metric", METRIC_COL),
        commit_headers
    )
    .trim_end()
    .to_string();
    let rule = "-".repeat(second_line.len() + 1);

    out.push_str(&rule);
    out.push('\n');
    out.push_str(&first_line);
    out.push('\n');
    out.push_str(&second_line);
    out.push('\n');
    out.push_str(&rule);
    out.push('\n');

    for row in rows {
        let cells: String = (0..commits.len()).map(|i| pad(&cell(row, i), COMMIT_COL)).collect();
        let line = format!(
            "{}{}{}",
            pad(&row.test, TEST_COL),
            pad(&row.metric, METRIC_COL),
            cells
        );
        out.push_str(line.trim_end());
        out.push('\n');
    }
}

/// First characters of a commit ref, for column headers.
fn short_ref(commit: &str) -> String {
    commit.chars().take(COMMIT_DISPLAY).collect()
}

/// Left-pad a string to a display width, using display columns rather
/// than bytes so wide characters keep the table aligned.
fn pad(s: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(s);
    if w >= width {
        s.to_string()
    } else {
        format!("{s}{}", " ".repeat(width - w))
    }
}

/// Render a rounded delta like Python's `str(round(x, 2))`: at most two
/// decimals, but never a bare integer.
fn format_rounded(x: f64) -> String {
    if x.fract() == 0.0 {
        format!("{x:.1}")
    } else {
        format!("{x}")
    }
}
