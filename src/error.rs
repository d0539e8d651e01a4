/// Error types for aicmd
///
/// This module defines all possible errors that can occur in the application.
/// Uses thiserror for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for aicmd operations
#[derive(Error, Debug)]
pub enum AicmdError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O errors (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Git-related errors
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    /// HTTP transport errors talking to an AI provider
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Setup could not create or write one of its files
    #[error("Setup failed for {path}: {source}")]
    SetupIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The integration script was written but the startup file could not be updated
    #[error("Could not update {path}: {source}")]
    StartupFileWrite {
        path: PathBuf,
        line: String,
        #[source]
        source: std::io::Error,
    },

    /// Requested shell dialect is not one we emit hooks for
    #[error("Unknown shell: {0}")]
    UnsupportedShell(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No API key or endpoint configured
    #[error("No AI provider configured")]
    NoProvider,

    /// Provider answered with an error status or an unexpected body
    #[error("AI provider error: {0}")]
    Provider(String),

    /// Interactive prompt failed (no TTY, interrupted, ...)
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Result type alias for aicmd operations
pub type Result<T> = std::result::Result<T, AicmdError>;

impl From<dialoguer::Error> for AicmdError {
    fn from(e: dialoguer::Error) -> Self {
        AicmdError::Prompt(e.to_string())
    }
}

/// Convert AicmdError to a user-friendly error message with a remedy
impl AicmdError {
    pub fn user_message(&self) -> String {
        match self {
            AicmdError::Database(e) => {
                format!("History database error. Details: {}", e)
            }
            AicmdError::Io(e) => {
                format!("File system error. Check permissions. Details: {}", e)
            }
            AicmdError::Git(e) => {
                format!("Git operation failed. Details: {}", e)
            }
            AicmdError::Http(e) => {
                format!(
                    "Could not reach the AI provider. Check your network connection. Details: {}",
                    e
                )
            }
            AicmdError::SetupIo { path, source } => {
                format!(
                    "Setup failed while writing {}: {}\nCheck that the directory is writable, then run: aicmd setup",
                    path.display(),
                    source
                )
            }
            AicmdError::StartupFileWrite { path, line, source } => {
                format!(
                    "Could not update {}: {}\nThe integration script was installed. Add this line manually:\n  {}",
                    path.display(),
                    source,
                    line
                )
            }
            AicmdError::UnsupportedShell(name) => {
                format!(
                    "Unknown shell '{}'. Supported shells: bash, zsh, fish\nTry: aicmd setup --shell bash",
                    name
                )
            }
            AicmdError::Config(msg) => {
                format!("Configuration issue: {}\nCheck ~/.aicmd/config.json", msg)
            }
            AicmdError::Serialization(e) => {
                format!("Data format error: {}", e)
            }
            AicmdError::NoProvider => {
                "No AI provider configured.\n\
                 Set OPENAI_API_KEY or ANTHROPIC_API_KEY, or add \"custom_endpoint\" to ~/.aicmd/config.json"
                    .to_string()
            }
            AicmdError::Provider(msg) => {
                format!("AI request failed: {}", msg)
            }
            AicmdError::Prompt(msg) => {
                format!(
                    "Could not read input: {}\nPass the error text directly: aicmd fix \"<error message>\"",
                    msg
                )
            }
            AicmdError::Generic(msg) => msg.clone(),
        }
    }
}
