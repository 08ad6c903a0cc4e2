//! Structured test run results

use serde::Serialize;

/// Aggregate test counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub total: u64,
    pub passed: u64,
    pub failed: u64,
    pub skipped: u64,
}

/// One failing test found in a transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureEntry {
    pub test_name: String,
    pub origin_file: String,
    pub error_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_excerpt: Option<String>,
}

/// Outcome of one test-runner invocation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    /// RFC 3339 UTC time the transcript was parsed
    pub timestamp: String,
    /// Exit success, no failure entries and no failed count, all at once
    pub all_passed: bool,
    pub exit_code: i32,
    pub totals: Totals,
    pub duration_ms: u64,
    pub failures: Vec<FailureEntry>,
    /// Transcript exactly as captured, escapes included
    pub raw_text: String,
}

impl RunResult {
    /// Whether the run still has failing tests
    pub fn is_red(&self) -> bool {
        !self.all_passed
    }
}
