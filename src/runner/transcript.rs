//! Transcript parsing
//!
//! Turns captured test-runner output into a [`RunResult`]. Every step has a
//! fallback, so malformed or truncated output still produces a result.

use std::borrow::Cow;

use regex::Regex;

use super::grammar::{CompiledGrammar, CompiledStatsRule, Metric, VITEST_GRAMMAR};
use super::result::{FailureEntry, RunResult, Totals};

/// Which stats pattern produced the counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsMatch {
    /// The combined stats line matched
    Combined {
        failed: Option<u64>,
        passed: Option<u64>,
        skipped: Option<u64>,
        total: Option<u64>,
    },
    /// Only single-metric patterns matched
    PerMetric {
        failed: Option<u64>,
        passed: Option<u64>,
        skipped: Option<u64>,
    },
    /// No stats at all
    Absent,
}

/// Parses transcripts with one grammar
#[derive(Debug, Clone, Copy)]
pub struct TranscriptParser<'g> {
    grammar: &'g CompiledGrammar,
}

impl TranscriptParser<'static> {
    /// Parser for Vitest's default reporter
    pub fn vitest() -> Self {
        Self {
            grammar: &VITEST_GRAMMAR,
        }
    }
}

impl<'g> TranscriptParser<'g> {
    pub fn new(grammar: &'g CompiledGrammar) -> Self {
        Self { grammar }
    }

    /// Parse a complete transcript
    pub fn parse(&self, transcript: &str, duration_ms: u64, exit_code: i32) -> RunResult {
        let text = self.strip_ansi(transcript);
        let failures = self.failures(&text);
        let stats = self.stats(&text);
        let totals = reconcile(stats, failures.len() as u64, exit_code);
        let all_passed = exit_code == 0 && failures.is_empty() && totals.failed == 0;

        tracing::debug!(
            ?stats,
            failures = failures.len(),
            total = totals.total,
            failed = totals.failed,
            exit_code,
            "Parsed transcript"
        );

        RunResult {
            timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            all_passed,
            exit_code,
            totals,
            duration_ms,
            failures,
            raw_text: transcript.to_string(),
        }
    }

    /// Remove color and style escape sequences
    pub fn strip_ansi<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.grammar.ansi.replace_all(text, "")
    }

    /// Collect failure entries from already-stripped text
    pub fn failures(&self, text: &str) -> Vec<FailureEntry> {
        let g = self.grammar;
        let mut failures = Vec::new();

        for block in split_blocks(&g.block_marker, text) {
            if !g.failure_block.is_match(block) {
                continue;
            }

            let markers: Vec<_> = g.failure_line.captures_iter(block).collect();
            for (i, caps) in markers.iter().enumerate() {
                let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                let segment_end = markers
                    .get(i + 1)
                    .and_then(|next| next.get(0))
                    .map_or(block.len(), |m| m.start());
                let segment = &block[whole.end()..segment_end];

                let origin_file = g
                    .test_file
                    .captures_iter(&block[..whole.start()])
                    .last()
                    .and_then(|c| c.get(1))
                    .map_or_else(|| g.unknown_file.to_string(), |m| m.as_str().to_string());

                let error_message = first_capture(&g.error_labels, &[segment, block])
                    .unwrap_or_else(|| g.default_error.to_string());

                let stack = g
                    .stack_frame
                    .captures(segment)
                    .or_else(|| g.stack_frame.captures(block));
                let source_line = stack
                    .as_ref()
                    .and_then(|c| c.get(2))
                    .and_then(|m| m.as_str().parse().ok());
                let stack_excerpt = stack
                    .as_ref()
                    .and_then(|c| c.get(0))
                    .map(|m| m.as_str().to_string());

                let test_name = g.trailing_duration.replace(name.as_str(), "").trim().to_string();

                failures.push(FailureEntry {
                    test_name,
                    origin_file,
                    error_message,
                    source_line,
                    stack_excerpt,
                });
            }
        }

        failures
    }

    /// Match aggregate counts from already-stripped text
    pub fn stats(&self, text: &str) -> StatsMatch {
        let g = self.grammar;

        if let Some(values) = apply_rule(&g.combined_stats, text) {
            return StatsMatch::Combined {
                failed: values.get(Metric::Failed),
                passed: values.get(Metric::Passed),
                skipped: values.get(Metric::Skipped),
                total: values.get(Metric::Total),
            };
        }

        let mut values = MetricValues::default();
        for rule in &g.metric_stats {
            if let Some(found) = apply_rule(rule, text) {
                values.merge_missing(found);
            }
        }

        if values.is_empty() {
            StatsMatch::Absent
        } else {
            StatsMatch::PerMetric {
                failed: values.get(Metric::Failed),
                passed: values.get(Metric::Passed),
                skipped: values.get(Metric::Skipped),
            }
        }
    }
}

/// Parse a transcript with the Vitest grammar
pub fn parse_transcript(transcript: &str, duration_ms: u64, exit_code: i32) -> RunResult {
    TranscriptParser::vitest().parse(transcript, duration_ms, exit_code)
}

/// Turn matched stats into totals consistent with the exit code
///
/// A failing exit is never reported as fully passing: with no failed count it
/// counts the discovered failures, or one if there are none.
pub fn reconcile(stats: StatsMatch, discovered_failures: u64, exit_code: i32) -> Totals {
    let (mut failed, passed, skipped, text_total) = match stats {
        StatsMatch::Combined {
            failed,
            passed,
            skipped,
            total,
        } => (
            failed.unwrap_or(0),
            passed.unwrap_or(0),
            skipped.unwrap_or(0),
            total,
        ),
        StatsMatch::PerMetric {
            failed,
            passed,
            skipped,
        } => (
            failed.unwrap_or(discovered_failures),
            passed.unwrap_or(0),
            skipped.unwrap_or(0),
            None,
        ),
        StatsMatch::Absent => (discovered_failures, 0, 0, None),
    };

    if exit_code != 0 && failed == 0 {
        failed = discovered_failures.max(1);
    }

    let total = match text_total {
        Some(total) if total > 0 => total,
        _ => passed + failed + skipped,
    };

    Totals {
        total,
        passed,
        failed,
        skipped,
    }
}

/// Cut `text` in front of every block marker
fn split_blocks<'t>(marker: &Regex, text: &'t str) -> Vec<&'t str> {
    let mut cuts: Vec<usize> = marker.find_iter(text).map(|m| m.start()).collect();
    if cuts.first() != Some(&0) {
        cuts.insert(0, 0);
    }
    cuts.push(text.len());
    cuts.windows(2)
        .map(|w| &text[w[0]..w[1]])
        .filter(|block| !block.is_empty())
        .collect()
}

/// First capture of the first pattern that matches, scope by scope
fn first_capture(patterns: &[Regex], scopes: &[&str]) -> Option<String> {
    scopes.iter().find_map(|scope| {
        patterns
            .iter()
            .find_map(|re| re.captures(scope).and_then(|c| c.get(1)))
            .map(|m| m.as_str().to_string())
    })
}

/// Metric values found by one or more stats rules
#[derive(Debug, Default)]
struct MetricValues {
    failed: Option<u64>,
    passed: Option<u64>,
    skipped: Option<u64>,
    total: Option<u64>,
}

impl MetricValues {
    fn slot(&mut self, metric: Metric) -> &mut Option<u64> {
        match metric {
            Metric::Failed => &mut self.failed,
            Metric::Passed => &mut self.passed,
            Metric::Skipped => &mut self.skipped,
            Metric::Total => &mut self.total,
        }
    }

    fn get(&self, metric: Metric) -> Option<u64> {
        match metric {
            Metric::Failed => self.failed,
            Metric::Passed => self.passed,
            Metric::Skipped => self.skipped,
            Metric::Total => self.total,
        }
    }

    /// Fill slots that are still empty
    fn merge_missing(&mut self, other: MetricValues) {
        for metric in [Metric::Failed, Metric::Passed, Metric::Skipped, Metric::Total] {
            let slot = self.slot(metric);
            if slot.is_none() {
                *slot = other.get(metric);
            }
        }
    }

    fn is_empty(&self) -> bool {
        self.failed.is_none() && self.passed.is_none() && self.skipped.is_none() && self.total.is_none()
    }
}

/// Run one stats rule; `None` when its pattern does not match
fn apply_rule(rule: &CompiledStatsRule, text: &str) -> Option<MetricValues> {
    let caps = rule.regex.captures(text)?;
    let mut values = MetricValues::default();
    for &(group, metric) in rule.fields {
        *values.slot(metric) = caps.get(group).and_then(|m| m.as_str().parse().ok());
    }
    Some(values)
}
