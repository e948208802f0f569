//! Compare command implementation.
//!
//! Fetches the `perf` notes for every given commit, applies the filters,
//! and prints the value and percent tables (or their JSON equivalent).

use crate::cli::CompareArgs;
use crate::config::PERF_NAMESPACE;
use crate::error::{PerfError, Result};
use crate::notes::{GitNotes, fetch_records};
use crate::report::{ReportFilters, apply_filters, build_rows, render_tables};
use regex::Regex;
use std::path::Path;
use tracing::{debug, info};

/// Execute the compare command.
///
/// # Errors
///
/// Returns an error if no commits were given, or if the test-name filter
/// is not a valid regular expression. Commits without notes simply
/// contribute no rows.
pub fn execute(args: &CompareArgs, json: bool, repo: Option<&Path>) -> Result<()> {
    if args.commits.is_empty() {
        return Err(PerfError::NoCommits);
    }

    let filters = ReportFilters {
        test_env: args.test_env.clone(),
        test_name: args.test_name.as_deref().map(Regex::new).transpose()?,
        min_delta: args.min_delta,
    };

    let log = repo.map_or_else(GitNotes::in_current_dir, GitNotes::in_dir);

    let mut records = Vec::new();
    for commit in &args.commits {
        let fetched = fetch_records(&log, PERF_NAMESPACE, commit);
        debug!(commit, count = fetched.len(), "fetched records");
        records.extend(fetched);
    }
    info!(
        commits = args.commits.len(),
        records = records.len(),
        "comparing metrics"
    );

    let records = apply_filters(records, &filters, &args.commits);
    let rows = build_rows(&records, &args.commits);

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        print!("{}", render_tables(&rows, &args.commits));
    }

    Ok(())
}
