//! Test command construction

use std::fmt;

use crate::common::{Error, Result};

/// Options for one test run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Ask the runner to collect coverage
    pub coverage: bool,
    /// Keep the runner alive and re-run on change instead of running once
    pub watch: bool,
    /// Test name or file pattern handed to the runner
    pub pattern: Option<String>,
}

impl RunOptions {
    /// Options that run only tests matching `pattern`
    pub fn for_pattern(pattern: impl Into<String>) -> Self {
        Self {
            pattern: Some(pattern.into()),
            ..Self::default()
        }
    }
}

/// A program and the argument list it is started with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestInvocation {
    pub program: String,
    pub args: Vec<String>,
}

impl TestInvocation {
    /// Build the invocation for `test_command` with `options` appended
    ///
    /// The command is split with shell quoting rules. Package-manager script
    /// commands (`pnpm test`, `npm run test`, ...) get the runner flags after
    /// a `--` separator so they reach the script rather than the manager.
    pub fn build(test_command: &str, options: &RunOptions) -> Result<Self> {
        let mut words = shell_words::split(test_command)
            .map_err(|e| Error::CommandParse(format!("{test_command}: {e}")))?;
        if words.is_empty() {
            return Err(Error::EmptyCommand);
        }
        let program = words.remove(0);
        let mut args = words;

        let mut extra = Vec::new();
        if options.coverage {
            extra.push("--coverage".to_string());
        }
        if !options.watch {
            extra.push("--run".to_string());
        }
        if let Some(pattern) = options.pattern.as_deref().filter(|p| !p.is_empty()) {
            extra.push(pattern.to_string());
        }

        if !extra.is_empty() && needs_separator(&program, &args) {
            args.push("--".to_string());
        }
        args.extend(extra);

        Ok(Self { program, args })
    }
}

impl fmt::Display for TestInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words: Vec<&str> = std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect();
        f.write_str(&shell_words::join(words))
    }
}

/// Whether `program args` runs a package.json script through a package manager
fn needs_separator(program: &str, args: &[String]) -> bool {
    let manager = std::path::Path::new(program)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    if !matches!(manager.as_str(), "pnpm" | "npm" | "yarn") {
        return false;
    }
    if args.iter().any(|a| a == "--") {
        return false;
    }
    matches!(
        args.first().map(String::as_str),
        Some("test" | "t" | "run" | "run-script")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pnpm_command() {
        let invocation = TestInvocation::build("pnpm test", &RunOptions::default()).unwrap();
        assert_eq!(invocation.program, "pnpm");
        assert_eq!(invocation.args, vec!["test", "--", "--run"]);
    }

    #[test]
    fn test_coverage_and_pattern() {
        let options = RunOptions {
            coverage: true,
            pattern: Some("dateUtils".to_string()),
            ..RunOptions::default()
        };
        let invocation = TestInvocation::build("pnpm test", &options).unwrap();
        assert_eq!(
            invocation.args,
            vec!["test", "--", "--coverage", "--run", "dateUtils"]
        );
    }

    #[test]
    fn test_watch_mode_has_no_run_flag() {
        let options = RunOptions {
            watch: true,
            ..RunOptions::default()
        };
        let invocation = TestInvocation::build("pnpm test", &options).unwrap();
        assert_eq!(invocation.args, vec!["test"]);
    }

    #[test]
    fn test_direct_runner_gets_no_separator() {
        let invocation =
            TestInvocation::build("npx vitest", &RunOptions::for_pattern("add")).unwrap();
        assert_eq!(invocation.program, "npx");
        assert_eq!(invocation.args, vec!["vitest", "--run", "add"]);
    }

    #[test]
    fn test_existing_separator_is_reused() {
        let invocation =
            TestInvocation::build("npm run test -- --silent", &RunOptions::default()).unwrap();
        assert_eq!(invocation.args, vec!["run", "test", "--", "--silent", "--run"]);
    }

    #[test]
    fn test_quoted_arguments() {
        let invocation =
            TestInvocation::build("vitest --reporter 'basic reporter'", &RunOptions::default())
                .unwrap();
        assert_eq!(invocation.args, vec!["--reporter", "basic reporter", "--run"]);
        assert_eq!(
            invocation.to_string(),
            "vitest --reporter 'basic reporter' --run"
        );
    }

    #[test]
    fn test_empty_command() {
        let result = TestInvocation::build("   ", &RunOptions::default());
        assert!(matches!(result, Err(Error::EmptyCommand)));
    }

    #[test]
    fn test_unbalanced_quote() {
        let result = TestInvocation::build("pnpm 'test", &RunOptions::default());
        assert!(matches!(result, Err(Error::CommandParse(_))));
    }

    #[test]
    fn test_empty_pattern_is_ignored() {
        let invocation =
            TestInvocation::build("vitest", &RunOptions::for_pattern("")).unwrap();
        assert_eq!(invocation.args, vec!["--run"]);
    }
}
