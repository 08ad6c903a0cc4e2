//! Error types for the TDD CLI
//!
//! Only process launch and configuration problems surface as errors.
//! Scenario mining and transcript parsing always fall back to defaults.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the TDD CLI
#[derive(Error, Debug)]
pub enum Error {
    // === Process Errors ===
    #[error("Failed to launch '{command}': {error}")]
    CommandLaunch { command: String, error: String },

    #[error("Command '{command}' not found. Check the test command in tdd.toml or TDD_TEST_COMMAND")]
    CommandNotFound { command: String },

    #[error("Test command is empty")]
    EmptyCommand,

    #[error("Could not split test command: {0}")]
    CommandParse(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Invalid configuration: {}", .0.join(", "))]
    ConfigInvalid(Vec<String>),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Map a spawn failure to the most specific launch error
    pub fn launch_failed(command: &str, error: io::Error) -> Self {
        if error.kind() == io::ErrorKind::NotFound {
            Self::CommandNotFound {
                command: command.to_string(),
            }
        } else {
            Self::CommandLaunch {
                command: command.to_string(),
                error: error.to_string(),
            }
        }
    }

    /// Create a file read error
    pub fn file_read(path: &std::path::Path, error: io::Error) -> Self {
        Self::FileRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }
}
