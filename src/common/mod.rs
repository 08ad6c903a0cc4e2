//! Common utilities shared by the mining and runner halves

pub mod config;
pub mod error;
pub mod logging;
pub mod paths;

pub use error::{Error, Result};

/// Format a millisecond duration for terminal output
pub fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        return format!("{}ms", ms);
    }

    let seconds = ms as f64 / 1000.0;
    if seconds < 60.0 {
        return format!("{:.2}s", seconds);
    }

    let minutes = ms / 60_000;
    let remaining = (ms % 60_000) as f64 / 1000.0;
    format!("{}m {:.0}s", minutes, remaining)
}
