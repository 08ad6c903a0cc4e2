//! Transcript grammar tables
//!
//! Every pattern the transcript parser relies on lives in one
//! [`TranscriptGrammar`] value. Supporting another runner's output means
//! writing another table, not another parser.

use regex::Regex;
use std::sync::LazyLock;

/// Aggregate counter a stats capture group feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Failed,
    Passed,
    Skipped,
    Total,
}

/// A stats pattern and the capture groups it maps onto metrics
#[derive(Debug, Clone, Copy)]
pub struct StatsRule {
    pub pattern: &'static str,
    pub fields: &'static [(usize, Metric)],
}

/// Declarative description of one test runner's textual output
#[derive(Debug, Clone, Copy)]
pub struct TranscriptGrammar {
    /// Terminal color/style escape sequences
    pub ansi: &'static str,
    /// Line-leading per-file header or aggregate failure header; blocks are cut here
    pub block_marker: &'static str,
    /// A block is only searched for failures when this matches inside it
    pub failure_block: &'static str,
    /// Failing test line; group 1 is the test description
    pub failure_line: &'static str,
    /// Removed from the end of a test description (timing suffix)
    pub trailing_duration: &'static str,
    /// Path of a test file; group 1 is the path
    pub test_file: &'static str,
    /// Error message patterns in order of preference; group 1 is the message
    pub error_labels: &'static [&'static str],
    /// Stack frame; group 1 path, group 2 line, group 3 column
    pub stack_frame: &'static str,
    /// One pattern capturing all totals together
    pub combined_stats: StatsRule,
    /// Independent per-metric patterns used when the combined one fails
    pub metric_stats: &'static [StatsRule],
    /// File name recorded when no test file path precedes a failure
    pub unknown_file: &'static str,
    /// Error message recorded when no error label matches
    pub default_error: &'static str,
}

/// Vitest's default reporter
pub const VITEST: TranscriptGrammar = TranscriptGrammar {
    ansi: r"\x1b\[[0-9;?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)",
    block_marker: r"(?m)^[ \t]*(?:❯|FAIL\b)",
    failure_block: r"[×✕]|FAIL",
    failure_line: r"(?m)[×✕][ \t]+(.+?)[ \t\r]*$",
    trailing_duration: r"\s+\d+(?:\.\d+)?\s*m?s$",
    test_file: r#"([^\s❯>()'"]+\.(?:spec|test)\.(?:tsx|ts|jsx|js|mts|cts|mjs|cjs))"#,
    error_labels: &[
        r"(?m)Error:[ \t]*(.+?)[ \t\r]*$",
        r"(?m)AssertionError:[ \t]*(.+?)[ \t\r]*$",
        r"(?m)^[ \t]*→[ \t]*(.+?)[ \t\r]*$",
    ],
    stack_frame: r"\bat\s+(.+?):(\d+):(\d+)",
    combined_stats: StatsRule {
        pattern: r"(?m)^[ \t]*Tests[ \t]+(?:(\d+)[ \t]+failed[ \t]*\|?[ \t]*)?(?:(\d+)[ \t]+passed[ \t]*\|?[ \t]*)?(?:(\d+)[ \t]+skipped[ \t]*\|?[ \t]*)?(?:\d+[ \t]+todo[ \t]*\|?[ \t]*)?\((\d+)\)",
        fields: &[
            (1, Metric::Failed),
            (2, Metric::Passed),
            (3, Metric::Skipped),
            (4, Metric::Total),
        ],
    },
    metric_stats: &[
        StatsRule {
            pattern: r"(\d+)\s+passed",
            fields: &[(1, Metric::Passed)],
        },
        StatsRule {
            pattern: r"(\d+)\s+failed",
            fields: &[(1, Metric::Failed)],
        },
        StatsRule {
            pattern: r"(\d+)\s+skipped",
            fields: &[(1, Metric::Skipped)],
        },
    ],
    unknown_file: "Unknown File",
    default_error: "Test failed",
};

/// A stats rule with its pattern compiled
#[derive(Debug, Clone)]
pub struct CompiledStatsRule {
    pub regex: Regex,
    pub fields: &'static [(usize, Metric)],
}

impl CompiledStatsRule {
    fn compile(rule: &StatsRule) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(rule.pattern)?,
            fields: rule.fields,
        })
    }
}

/// A grammar with every pattern compiled
#[derive(Debug, Clone)]
pub struct CompiledGrammar {
    pub ansi: Regex,
    pub block_marker: Regex,
    pub failure_block: Regex,
    pub failure_line: Regex,
    pub trailing_duration: Regex,
    pub test_file: Regex,
    pub error_labels: Vec<Regex>,
    pub stack_frame: Regex,
    pub combined_stats: CompiledStatsRule,
    pub metric_stats: Vec<CompiledStatsRule>,
    pub unknown_file: &'static str,
    pub default_error: &'static str,
}

impl CompiledGrammar {
    pub fn compile(grammar: &TranscriptGrammar) -> Result<Self, regex::Error> {
        Ok(Self {
            ansi: Regex::new(grammar.ansi)?,
            block_marker: Regex::new(grammar.block_marker)?,
            failure_block: Regex::new(grammar.failure_block)?,
            failure_line: Regex::new(grammar.failure_line)?,
            trailing_duration: Regex::new(grammar.trailing_duration)?,
            test_file: Regex::new(grammar.test_file)?,
            error_labels: grammar
                .error_labels
                .iter()
                .map(|p| Regex::new(p))
                .collect::<Result<_, _>>()?,
            stack_frame: Regex::new(grammar.stack_frame)?,
            combined_stats: CompiledStatsRule::compile(&grammar.combined_stats)?,
            metric_stats: grammar
                .metric_stats
                .iter()
                .map(CompiledStatsRule::compile)
                .collect::<Result<_, _>>()?,
            unknown_file: grammar.unknown_file,
            default_error: grammar.default_error,
        })
    }
}

/// The compiled Vitest grammar
pub static VITEST_GRAMMAR: LazyLock<CompiledGrammar> =
    LazyLock::new(|| CompiledGrammar::compile(&VITEST).expect("vitest grammar compiles"));
