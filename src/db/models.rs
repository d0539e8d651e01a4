/// Data models for the interaction history
///
/// Rows map to the `interactions` table through sqlx's `FromRow`.

use crate::ai::Action;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A recorded AI interaction
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Interaction {
    pub id: i64,
    pub action: String,
    pub input: String,
    pub response: String,
    pub suggested_command: Option<String>,
    pub exit_code: Option<i32>,
    pub created_at: String, // ISO 8601 from SQLite
}

impl Interaction {
    /// First line of the input, cut to `width` characters for list views
    pub fn summary(&self, width: usize) -> String {
        let first = self.input.lines().next().unwrap_or("").trim();
        if first.chars().count() <= width {
            first.to_string()
        } else {
            let cut: String = first.chars().take(width.saturating_sub(3)).collect();
            format!("{}...", cut)
        }
    }
}

/// Input for recording a new interaction
#[derive(Debug, Clone)]
pub struct InteractionInput {
    pub action: Action,
    pub input: String,
    pub response: String,
    pub suggested_command: Option<String>,
    pub exit_code: Option<i32>,
}

/// Fuzzy search hit
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub interaction: Interaction,
    pub score: i64,
}

/// Counts per action
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryStats {
    pub total: i64,
    pub fix: i64,
    pub suggest: i64,
    pub explain: i64,
    pub ask: i64,
}
