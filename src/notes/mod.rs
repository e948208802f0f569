//! The note store: historical metric records kept in git notes.
//!
//! Records are grouped by a namespace (one notes ref per logical channel)
//! and keyed by commit. The raw note text is a newline-separated list of
//! tab-separated 5-tuples: `test_env \t test \t way \t metric \t value`.
//!
//! The read path is deliberately forgiving: a missing note, an unreachable
//! `git`, or a malformed line all degrade to "no history"; absence of a
//! baseline is expected for new tests and must never fail a run. Only the
//! append path (used by the fake-data injector and the end-of-run flush)
//! propagates errors.

use crate::error::{PerfError, Result};
use crate::model::MetricRecord;
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, warn};

/// External record-log collaborator: raw note text by (namespace, commit).
///
/// Implemented by [`GitNotes`]; tests substitute in-memory fakes.
pub trait RecordLog {
    /// Fetch the raw note text, `None` when no note exists.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure. Callers going through
    /// [`fetch_records`] never see it; the reader normalizes any error to
    /// "no records".
    fn query(&self, namespace: &str, commit: &str) -> Result<Option<String>>;
}

/// Record log backed by `git notes` in a repository on disk.
#[derive(Debug, Clone, Default)]
pub struct GitNotes {
    /// Repository to operate in; current directory when unset.
    pub repo_dir: Option<PathBuf>,
}

impl GitNotes {
    /// Operate on the repository containing the current directory.
    #[must_use]
    pub fn in_current_dir() -> Self {
        Self { repo_dir: None }
    }

    /// Operate on the repository at `dir`.
    #[must_use]
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: Some(dir.into()),
        }
    }

    fn git(&self) -> Command {
        let mut cmd = Command::new("git");
        if let Some(dir) = &self.repo_dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// Append `lines` to the note for `commit` under `namespace`.
    ///
    /// This is the write half of the collaborator: the end-of-run flush and
    /// the fake-data injector go through here. Unlike the read path, errors
    /// are real.
    ///
    /// # Errors
    ///
    /// Returns [`PerfError::NotesCommand`] if `git notes append` cannot be
    /// spawned or exits non-zero.
    pub fn append(&self, namespace: &str, commit: &str, lines: &[String]) -> Result<()> {
        let message = lines.join("\n");
        let output = self
            .git()
            .args([
                "notes",
                &format!("--ref={namespace}"),
                "append",
                commit,
                "-m",
                &message,
            ])
            .output()
            .map_err(|e| PerfError::NotesCommand {
                action: "append",
                commit: commit.to_string(),
                detail: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(PerfError::NotesCommand {
                action: "append",
                commit: commit.to_string(),
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        debug!(namespace, commit, lines = lines.len(), "appended note");
        Ok(())
    }
}

impl RecordLog for GitNotes {
    fn query(&self, namespace: &str, commit: &str) -> Result<Option<String>> {
        let output = self
            .git()
            .args(["notes", &format!("--ref={namespace}"), "show", commit])
            .output()?;

        if !output.status.success() {
            // "no note found" and genuine failures look the same to us.
            return Ok(None);
        }

        Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()))
    }
}

/// Retrieve and parse the historical records for (namespace, commit).
///
/// Never fails: a transport error or missing note yields an empty vec.
pub fn fetch_records(log: &impl RecordLog, namespace: &str, commit: &str) -> Vec<MetricRecord> {
    match log.query(namespace, commit) {
        Ok(Some(text)) => parse_note(&text, commit),
        Ok(None) => {
            debug!(namespace, commit, "no note found");
            Vec::new()
        }
        Err(e) => {
            debug!(namespace, commit, error = %e, "note query failed, treating as empty");
            Vec::new()
        }
    }
}

/// Parse raw note text into records, annotating each with `commit`.
///
/// Blank lines are discarded. Lines with the wrong field count or a
/// non-integer value are skipped with a warning rather than aborting the
/// parse; one corrupt measurement should not hide the rest of the history.
#[must_use]
pub fn parse_note(text: &str, commit: &str) -> Vec<MetricRecord> {
    let mut records = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.trim_matches('\t').split('\t').collect();
        let [test_env, test, way, metric, value] = fields.as_slice() else {
            warn!(commit, line, "skipping note line with wrong field count");
            continue;
        };
        let Ok(value) = value.trim().parse::<i64>() else {
            warn!(commit, line, "skipping note line with non-integer value");
            continue;
        };
        records.push(MetricRecord {
            test_env: (*test_env).to_string(),
            test: (*test).to_string(),
            way: (*way).to_string(),
            metric: (*metric).to_string(),
            value,
            commit: commit.to_string(),
        });
    }
    records
}
