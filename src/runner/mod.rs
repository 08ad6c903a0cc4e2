//! Test execution
//!
//! Builds the configured test command, runs it while capturing its output,
//! and parses the transcript into a [`RunResult`].

pub mod capture;
pub mod grammar;
pub mod invocation;
pub mod result;
pub mod transcript;

use std::path::Path;
use std::time::Instant;

pub use capture::{Captured, TranscriptCapturer};
pub use grammar::{CompiledGrammar, TranscriptGrammar, VITEST, VITEST_GRAMMAR};
pub use invocation::{RunOptions, TestInvocation};
pub use result::{FailureEntry, RunResult, Totals};
pub use transcript::{parse_transcript, reconcile, StatsMatch, TranscriptParser};

use crate::common::config::Config;
use crate::common::Result;

/// Run the project's test suite once
///
/// Fails only when the test process cannot be started. Failing tests are
/// reported through the returned result.
pub async fn run_tests(
    config: &Config,
    project_root: &Path,
    options: &RunOptions,
    capturer: &TranscriptCapturer,
) -> Result<RunResult> {
    let invocation = TestInvocation::build(&config.runner.test_command, options)?;
    tracing::info!(command = %invocation, dir = %project_root.display(), "Running tests");

    let started = Instant::now();
    let captured = capturer
        .execute(&invocation.program, &invocation.args, project_root)
        .await?;
    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let result = TranscriptParser::vitest().parse(&captured.transcript, duration_ms, captured.exit_code);
    tracing::info!(
        all_passed = result.all_passed,
        total = result.totals.total,
        failed = result.totals.failed,
        duration_ms,
        "Test run finished"
    );
    Ok(result)
}

/// Run only the tests in one file
pub async fn run_file(
    config: &Config,
    project_root: &Path,
    file: &Path,
    capturer: &TranscriptCapturer,
) -> Result<RunResult> {
    let pattern = file
        .strip_prefix(project_root)
        .unwrap_or(file)
        .to_string_lossy()
        .replace('\\', "/");
    let options = RunOptions {
        coverage: config.runner.coverage,
        ..RunOptions::for_pattern(pattern)
    };
    run_tests(config, project_root, &options, capturer).await
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn config_with(command: &str) -> Config {
        let mut config = Config::default();
        config.runner.test_command = command.to_string();
        config
    }

    #[tokio::test]
    async fn test_run_tests_parses_output() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("fake-vitest.sh"),
            "echo ' Test Files  1 passed (1)'\necho '      Tests  3 passed (3)'\n",
        )
        .unwrap();

        let config = config_with("sh fake-vitest.sh");
        let result = run_tests(&config, dir.path(), &RunOptions::default(), &TranscriptCapturer::silent())
            .await
            .unwrap();

        assert!(result.all_passed);
        assert_eq!(result.totals.passed, 3);
        assert_eq!(result.totals.total, 3);
        assert_eq!(result.exit_code, 0);
    }

    #[tokio::test]
    async fn test_run_tests_reports_failure_exit() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("boom.sh"), "echo 'crashed before tests'\nexit 1\n").unwrap();

        let config = config_with("sh boom.sh");
        let result = run_tests(&config, dir.path(), &RunOptions::default(), &TranscriptCapturer::silent())
            .await
            .unwrap();

        assert!(result.is_red());
        assert_eq!(result.totals.failed, 1);
        assert_eq!(result.exit_code, 1);
    }

    #[tokio::test]
    async fn test_run_file_passes_relative_pattern() {
        let dir = tempfile::tempdir().unwrap();
        // Echo the arguments back so the pattern shows up in the transcript
        std::fs::write(dir.path().join("args.sh"), "echo \"$@\"\n").unwrap();

        let config = config_with("sh args.sh");
        let file = dir.path().join("src/__tests__/a.spec.ts");
        let result = run_file(&config, dir.path(), &file, &TranscriptCapturer::silent())
            .await
            .unwrap();

        assert_eq!(result.raw_text.trim(), "--run src/__tests__/a.spec.ts");
    }

    #[tokio::test]
    async fn test_run_tests_empty_command() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with("");
        let result =
            run_tests(&config, dir.path(), &RunOptions::default(), &TranscriptCapturer::silent()).await;
        assert!(matches!(result, Err(crate::common::Error::EmptyCommand)));
    }
}
