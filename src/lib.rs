//! Performance-regression comparator backed by git notes.
//!
//! The test driver records numeric performance metrics (allocation bytes,
//! peak memory, and so on) per test and per way against the commit under
//! test, and compares fresh measurements against the baseline stored for
//! the parent commit within a tolerance band.
//!
//! The pieces, leaves first:
//!
//! - [`notes`] reads and appends the historical records kept in git notes
//!   under a namespace ref (`refs/notes/perf`).
//! - [`compare`] registers per-test expectations before a test runs and
//!   classifies extracted measurements afterwards.
//! - [`report`] builds the cross-commit comparison tables behind the
//!   `pn compare` command.
//! - [`config`] carries the run-wide context: environment label,
//!   verbosity, and the accumulation buffer flushed to notes at
//!   end-of-run.

pub mod cli;
pub mod compare;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod notes;
pub mod report;
pub mod util;

pub use config::RunContext;
pub use error::{PerfError, Result};
pub use model::Outcome;
