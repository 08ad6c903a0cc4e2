//! CLI command definitions
//!
//! Defines the clap subcommands for the tdd CLI.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Collect describe/it scenarios per implementation file
    Mine {
        /// Test files or directories to mine (default: configured test dirs)
        paths: Vec<PathBuf>,

        /// Only show scenarios for this implementation file
        #[arg(long, short)]
        target: Option<PathBuf>,

        /// Output the scenario map as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the test suite once and summarize the result
    Run {
        /// Test name or file pattern passed to the runner
        pattern: Option<String>,

        /// Collect coverage
        #[arg(long)]
        coverage: bool,

        /// Output the run result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse a saved test-runner transcript
    Parse {
        /// Path to the transcript file
        file: PathBuf,

        /// Exit code the runner finished with
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        exit_code: i32,

        /// Wall-clock duration of the run in milliseconds
        #[arg(long, default_value = "0")]
        duration_ms: u64,

        /// Output the run result as JSON
        #[arg(long)]
        json: bool,
    },
}
