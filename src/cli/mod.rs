//! CLI definitions and entry point.

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

pub mod commands;

/// Performance-regression comparator backed by git notes
#[derive(Parser, Debug)]
#[command(name = "pn", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Repository to operate in (defaults to the current directory)
    #[arg(long, global = true)]
    pub repo: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compare performance metrics across commits
    ///
    /// Reads the `perf` notes of every given commit and prints a table of
    /// raw metric values per commit, followed by a table of percent deltas
    /// relative to the first commit.
    Compare(CompareArgs),

    /// Append synthetic metrics to a commit's perf note
    ///
    /// Development only. Useful for exercising the comparison tables
    /// without a full test run.
    Fake(FakeArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Only include measurements from this test environment
    #[arg(long)]
    pub test_env: Option<String>,

    /// Only include tests matching this regular expression
    #[arg(long)]
    pub test_name: Option<String>,

    /// Only display tests whose relative spread against the first commit
    /// exceeds this percentage (requires at least two commits)
    #[arg(long)]
    pub min_delta: Option<f64>,

    /// Commits to compare; the first is the reference
    pub commits: Vec<String>,
}

#[derive(Args, Debug)]
pub struct FakeArgs {
    /// Number of fake metrics to generate
    pub count: u32,

    /// Commit whose perf note receives the metrics
    pub commit: String,

    /// Generate shifted values, so that two commits show deltas
    #[arg(long)]
    pub variant: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
