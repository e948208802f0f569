//! Small shared utilities.

pub mod latch;

pub use latch::Watcher;
