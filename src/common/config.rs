//! Configuration file handling
//!
//! Settings are layered: built-in defaults, then the per-user config file,
//! then the project's `tdd.toml`, then `TDD_*` environment variables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::paths::{config_path, project_config_path};
use super::{Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Display name of the project under test
    #[serde(default = "default_project_name")]
    pub project_name: String,

    /// Test runner settings
    #[serde(default)]
    pub runner: RunnerConfig,

    /// Scenario mining settings
    #[serde(default)]
    pub mining: MiningConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_name: default_project_name(),
            runner: RunnerConfig::default(),
            mining: MiningConfig::default(),
        }
    }
}

fn default_project_name() -> String {
    "My Project".to_string()
}

/// Test runner settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunnerConfig {
    /// Command line used to run the test suite
    #[serde(default = "default_test_command")]
    pub test_command: String,

    /// Collect coverage on every run
    #[serde(default)]
    pub coverage: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            test_command: default_test_command(),
            coverage: false,
        }
    }
}

fn default_test_command() -> String {
    "pnpm test".to_string()
}

/// Scenario mining settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MiningConfig {
    /// Directories (relative to the project root) scanned for test files
    #[serde(default = "default_test_dirs")]
    pub test_dirs: Vec<String>,

    /// File name endings that mark a test file
    #[serde(default = "default_test_suffixes")]
    pub test_suffixes: Vec<String>,

    /// Candidates appended to a dependency path when probing for its file.
    /// The empty string probes the path as written.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Import prefixes mapped to a project-root-relative base directory
    #[serde(default = "default_aliases")]
    pub aliases: BTreeMap<String, String>,

    /// Directory names never descended into during discovery
    #[serde(default = "default_ignore_dirs")]
    pub ignore_dirs: Vec<String>,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            test_dirs: default_test_dirs(),
            test_suffixes: default_test_suffixes(),
            extensions: default_extensions(),
            aliases: default_aliases(),
            ignore_dirs: default_ignore_dirs(),
        }
    }
}

fn default_test_dirs() -> Vec<String> {
    vec!["src/__tests__".to_string()]
}

fn default_test_suffixes() -> Vec<String> {
    [".spec.ts", ".spec.tsx", ".test.ts", ".test.tsx"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_extensions() -> Vec<String> {
    ["", ".ts", ".tsx", ".js", ".jsx", "/index.ts", "/index.tsx", "/index.js"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_aliases() -> BTreeMap<String, String> {
    BTreeMap::from([("@/".to_string(), "src".to_string())])
}

fn default_ignore_dirs() -> Vec<String> {
    ["node_modules", "dist", "build", ".git"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Config {
    /// Load configuration for a project
    ///
    /// Missing files are skipped; the result is validated before returning.
    pub fn load(project_root: &Path) -> Result<Self> {
        let mut layered = toml::Value::Table(toml::Table::new());

        let files = config_path()
            .into_iter()
            .chain(std::iter::once(project_config_path(project_root)));
        for path in files {
            if !path.is_file() {
                continue;
            }
            let content = std::fs::read_to_string(&path).map_err(|e| Error::file_read(&path, e))?;
            let layer: toml::Value = toml::from_str(&content)
                .map_err(|e| Error::ConfigParse(format!("{}: {}", path.display(), e)))?;
            tracing::debug!(path = %path.display(), "Loaded config layer");
            merge_toml(&mut layered, layer);
        }

        let mut config: Config = layered
            .try_into()
            .map_err(|e: toml::de::Error| Error::ConfigParse(e.to_string()))?;
        config.apply_env_overrides(|key| std::env::var(key).ok());

        let problems = config.validate();
        if !problems.is_empty() {
            return Err(Error::ConfigInvalid(problems));
        }

        config.warn_if_command_missing();
        Ok(config)
    }

    /// Parse a single TOML document, without layering or env overrides
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))
    }

    /// Apply `TDD_PROJECT_NAME` and `TDD_TEST_COMMAND` overrides
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("TDD_PROJECT_NAME") {
            self.project_name = name;
        }
        if let Some(command) = lookup("TDD_TEST_COMMAND") {
            self.runner.test_command = command;
        }
    }

    /// Collect every configuration problem
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.project_name.trim().is_empty() {
            problems.push("project_name is required".to_string());
        }
        if self.runner.test_command.trim().is_empty() {
            problems.push("runner.test_command is required".to_string());
        }
        if self.mining.extensions.is_empty() {
            problems.push("mining.extensions must not be empty".to_string());
        }
        if self.mining.test_suffixes.is_empty() {
            problems.push("mining.test_suffixes must not be empty".to_string());
        }

        problems
    }

    /// The runner executes in the project directory, so a program missing
    /// from PATH may still resolve there. Only warn.
    fn warn_if_command_missing(&self) {
        let program = self.runner.test_command.split_whitespace().next();
        if let Some(program) = program {
            if which::which(program).is_err() {
                tracing::warn!(program, "Test command not found on PATH");
            }
        }
    }
}

/// Deep-merge `overlay` into `base`; overlay values win
fn merge_toml(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.runner.test_command, "pnpm test");
        assert_eq!(config.mining.test_dirs, vec!["src/__tests__"]);
        assert_eq!(config.mining.extensions[0], "");
        assert_eq!(config.mining.aliases.get("@/").map(String::as_str), Some("src"));
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            project_name = "calendar"
            [runner]
            test_command = "npx vitest"
            "#,
        )
        .unwrap();
        assert_eq!(config.project_name, "calendar");
        assert_eq!(config.runner.test_command, "npx vitest");
        assert!(!config.runner.coverage);
        assert_eq!(config.mining.test_suffixes.len(), 4);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env_overrides(|key| match key {
            "TDD_TEST_COMMAND" => Some("yarn test".to_string()),
            _ => None,
        });
        assert_eq!(config.runner.test_command, "yarn test");
        assert_eq!(config.project_name, "My Project");
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let mut config = Config::default();
        config.project_name = " ".to_string();
        config.runner.test_command = String::new();
        let problems = config.validate();
        assert_eq!(problems.len(), 2);
    }

    #[test]
    fn test_merge_toml_nested() {
        let mut base: toml::Value = toml::from_str(
            r#"
            [runner]
            test_command = "pnpm test"
            coverage = true
            "#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
            [runner]
            test_command = "npm test"
            "#,
        )
        .unwrap();
        merge_toml(&mut base, overlay);
        let config: Config = base.try_into().unwrap();
        assert_eq!(config.runner.test_command, "npm test");
        assert!(config.runner.coverage);
    }

    #[test]
    fn test_load_project_file() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("tdd.toml"),
            "[mining]\ntest_dirs = [\"tests\"]\n",
        )
        .unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.mining.test_dirs, vec!["tests"]);
    }

    #[test]
    fn test_load_rejects_invalid_toml() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("tdd.toml"), "project_name = [").unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(Error::ConfigParse(_))
        ));
    }
}
