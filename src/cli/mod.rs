//! CLI command handling
//!
//! Dispatches CLI commands to the mining and runner halves and formats output.

use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::paths::PROJECT_CONFIG_FILE;
use crate::common::{format_duration, Error, Result};
use crate::mining::{
    discover_test_files, session::collect_test_files, MiningSession, ScenarioMap, SectionCache,
    TargetResolver,
};
use crate::runner::{self, RunOptions, RunResult, TranscriptCapturer, TranscriptParser};

/// How a command finished, for the process exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// The command ran, but the tests it ran are red
    TestsFailed,
}

/// Dispatch a CLI command
pub async fn dispatch(command: Commands) -> Result<Outcome> {
    let cwd = std::env::current_dir()?;
    let project_root = find_project_root(&cwd);
    tracing::debug!(root = %project_root.display(), "Using project root");

    match command {
        Commands::Mine {
            paths,
            target,
            json,
        } => {
            let config = Config::load(&project_root)?;
            let resolver = TargetResolver::new(&project_root, &config.mining);

            let files = if paths.is_empty() {
                discover_test_files(&project_root, &config.mining)
            } else {
                let mut files = Vec::new();
                for path in &paths {
                    collect_test_files(&cwd.join(path), &config.mining, &mut files);
                }
                files.sort();
                files.dedup();
                files
            };

            if files.is_empty() {
                tracing::warn!("No test files found");
            }

            let target = match target {
                Some(path) => Some(resolver.identify(&cwd.join(&path)).ok_or_else(|| {
                    Error::Config(format!("target '{}' is not an existing file", path.display()))
                })?),
                None => None,
            };

            let mut session = MiningSession::new(resolver, SectionCache::new());
            let mut map = session.mine(&files);
            if let Some(target) = target {
                map.retain(|identity, _| *identity == target);
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&map)?);
            } else {
                print_scenario_map(&project_root, &map, files.len());
            }

            Ok(Outcome::Success)
        }

        Commands::Run {
            pattern,
            coverage,
            json,
        } => {
            let config = Config::load(&project_root)?;
            let options = RunOptions {
                coverage: coverage || config.runner.coverage,
                watch: false,
                pattern,
            };
            // JSON output owns stdout, so the live echo is turned off
            let capturer = if json {
                TranscriptCapturer::silent()
            } else {
                TranscriptCapturer::new()
            };

            let result = runner::run_tests(&config, &project_root, &options, &capturer).await?;
            print_result(&result, json)?;

            Ok(if result.is_red() {
                Outcome::TestsFailed
            } else {
                Outcome::Success
            })
        }

        Commands::Parse {
            file,
            exit_code,
            duration_ms,
            json,
        } => {
            let path = cwd.join(&file);
            let transcript =
                std::fs::read_to_string(&path).map_err(|e| Error::file_read(&path, e))?;
            let result = TranscriptParser::vitest().parse(&transcript, duration_ms, exit_code);
            print_result(&result, json)?;
            Ok(Outcome::Success)
        }
    }
}

/// Nearest ancestor of `start` holding `tdd.toml` or `package.json`
///
/// Falls back to `start` itself.
pub fn find_project_root(start: &Path) -> PathBuf {
    start
        .ancestors()
        .find(|dir| dir.join(PROJECT_CONFIG_FILE).is_file() || dir.join("package.json").is_file())
        .unwrap_or(start)
        .to_path_buf()
}

fn print_result(result: &RunResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        print_run_result(result);
    }
    Ok(())
}

fn print_scenario_map(project_root: &Path, map: &ScenarioMap, file_count: usize) {
    if map.is_empty() {
        println!("No scenarios found in {} test file(s)", file_count);
        return;
    }

    for (target, sections) in map {
        let shown = Path::new(target.as_str())
            .strip_prefix(project_root)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| target.to_string());
        println!("{}", shown.bold());

        for section in sections {
            println!("  {}", section.name.cyan());
            for scenario in &section.scenarios {
                println!("    {} {}", "•".dimmed(), scenario);
            }
        }
        println!();
    }

    let scenarios: usize = map
        .values()
        .flat_map(|sections| sections.iter().map(|s| s.scenarios.len()))
        .sum();
    println!(
        "{} {} scenario(s) for {} file(s) from {} test file(s)",
        "✓".green(),
        scenarios,
        map.len(),
        file_count
    );
}

fn print_run_result(result: &RunResult) {
    let totals = &result.totals;

    println!();
    if result.all_passed {
        println!(
            "{} {}",
            "✓".green().bold(),
            "All tests passed".green().bold()
        );
    } else {
        println!("{} {}", "✗".red().bold(), "Tests failed".red().bold());

        for failure in &result.failures {
            println!("\n  {} {}", "✗".red(), failure.test_name);
            let location = match failure.source_line {
                Some(line) => format!("{}:{}", failure.origin_file, line),
                None => failure.origin_file.clone(),
            };
            println!("    {}", location.dimmed());
            println!("    {}", failure.error_message.yellow());
        }
        println!();
    }

    println!(
        "  Tests: {} passed, {} failed, {} skipped ({} total)",
        totals.passed.to_string().green(),
        totals.failed.to_string().red(),
        totals.skipped.to_string().dimmed(),
        totals.total
    );
    println!("  Exit code: {}", result.exit_code);
    println!("  Duration: {}", format_duration(result.duration_ms));
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_find_project_root_walks_up() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("package.json"), "{}").unwrap();
        let nested = dir.path().join("src/__tests__/unit");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_project_root(&nested), dir.path());
    }

    #[test]
    fn test_find_project_root_prefers_nearest() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("package.json"), "{}").unwrap();
        let inner = dir.path().join("packages/app");
        std::fs::create_dir_all(&inner).unwrap();
        std::fs::write(inner.join("tdd.toml"), "").unwrap();

        assert_eq!(find_project_root(&inner.join("src")), inner);
    }
}
