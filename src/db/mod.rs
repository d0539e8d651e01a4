/// Database module for aicmd
///
/// Keeps the local interaction history in SQLite via sqlx.

pub mod connection;
pub mod models;
pub mod queries;

pub use connection::Database;
pub use models::*;
