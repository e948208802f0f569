//! Fake command implementation: synthetic note data for manual testing.

use crate::cli::FakeArgs;
use crate::config::PERF_NAMESPACE;
use crate::error::Result;
use crate::model::AccumulatedMetric;
use crate::notes::GitNotes;
use std::path::Path;
use tracing::info;

/// Execute the fake command.
///
/// # Errors
///
/// Returns an error if the note append fails (no repository, unknown
/// commit ref).
pub fn execute(args: &FakeArgs, repo: Option<&Path>) -> Result<()> {
    let lines: Vec<String> = generate_metrics(args.count, args.variant)
        .iter()
        .map(AccumulatedMetric::to_tab_line)
        .collect();

    let log = repo.map_or_else(GitNotes::in_current_dir, GitNotes::in_dir);
    log.append(PERF_NAMESPACE, &args.commit, &lines)?;

    info!(count = lines.len(), commit = %args.commit, "appended fake metrics");
    println!("Appended {} fake metrics to '{}'", lines.len(), args.commit);
    Ok(())
}

/// Generate `count` synthetic measurements.
///
/// The first half lands in the `local` environment under `some_way`, the
/// second half in `non-local` under `other_way`. The `variant` flavor
/// shifts every value so that comparing a plain note against a variant
/// note produces visible deltas. Simple fake data; not meant to cover
/// every edge case.
#[must_use]
pub fn generate_metrics(count: u32, variant: bool) -> Vec<AccumulatedMetric> {
    let half = count / 2;
    let mut metrics = Vec::with_capacity(count as usize);

    for i in 1..=i64::from(half) {
        metrics.push(AccumulatedMetric {
            test_env: "local".to_string(),
            test: format!("T{}", i * 100),
            way: "some_way".to_string(),
            metric: "some_field".to_string(),
            value: if variant { i * 10 } else { i * 1000 },
        });
    }
    for i in i64::from(half) + 1..=i64::from(count) {
        metrics.push(AccumulatedMetric {
            test_env: "non-local".to_string(),
            test: format!("W{}", i * 100),
            way: "other_way".to_string(),
            metric: "other_field".to_string(),
            value: if variant { i } else { i * 100 },
        });
    }

    metrics
}
