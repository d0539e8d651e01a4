/// aicmd library
///
/// Shell hooks that capture failing commands, the file mailbox they write,
/// and the AI assistant that reads it.

pub mod ai;
pub mod config;
pub mod core;
pub mod db;
pub mod error;
pub mod shell;

// Re-exports for convenience
pub use config::{Config, Settings};
pub use db::Database;
pub use error::{AicmdError, Result};
