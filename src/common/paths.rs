//! Configuration file locations
//!
//! Two files are consulted: a per-user config under the platform config
//! directory and a per-project `tdd.toml` next to the code under test.

use std::path::{Path, PathBuf};

/// Name used for the per-user config directory
const APP_NAME: &str = "tdd-cli";

/// File name of the per-project configuration
pub const PROJECT_CONFIG_FILE: &str = "tdd.toml";

/// Get the configuration directory path
///
/// Uses the directories crate for platform-appropriate locations:
/// - Linux: `~/.config/tdd-cli/`
/// - macOS: `~/Library/Application Support/tdd-cli/`
/// - Windows: `%APPDATA%\tdd-cli\`
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the per-user configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the path to the per-project configuration file
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_config_path() {
        let path = project_config_path(Path::new("/project"));
        assert_eq!(path, PathBuf::from("/project/tdd.toml"));
    }

    #[test]
    fn test_config_path_file_name() {
        if let Some(path) = config_path() {
            assert!(path.ends_with("config.toml"));
        }
    }
}
