//! Subcommand implementations.

pub mod compare;
pub mod completions;
pub mod fake;
