//! TDD CLI - scenario mining and test-run parsing for TDD agents
//!
//! The [`mining`] half turns `describe`/`it` blocks into scenario lists per
//! implementation file. The [`runner`] half executes the test suite and turns
//! its transcript into a structured [`runner::RunResult`].

pub mod cli;
pub mod commands;
pub mod common;
pub mod mining;
pub mod runner;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use mining::{ScenarioMap, ScenarioSection, TargetIdentity};
pub use runner::{RunResult, Totals};
