/// SQL query functions for the interaction history

use crate::db::models::*;
use crate::db::Database;
use crate::error::Result;
use sqlx::Row;

impl Database {
    /// Record an AI interaction
    ///
    /// # Arguments
    /// * `input` - What was asked and what came back
    ///
    /// # Returns
    /// * `Ok(i64)` - The new row ID
    /// * `Err(AicmdError)` - If database operation fails
    pub async fn record_interaction(&self, input: InteractionInput) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO interactions (action, input, response, suggested_command, exit_code)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(input.action.as_str())
        .bind(&input.input)
        .bind(&input.response)
        .bind(&input.suggested_command)
        .bind(input.exit_code)
        .fetch_one(self.pool())
        .await?;

        Ok(result.get(0))
    }

    /// Get the most recent interactions, newest first
    ///
    /// # Arguments
    /// * `limit` - Maximum number of rows to return
    pub async fn get_recent_interactions(&self, limit: i64) -> Result<Vec<Interaction>> {
        let interactions = sqlx::query_as::<_, Interaction>(
            "SELECT * FROM interactions ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        Ok(interactions)
    }

    /// Counts of recorded interactions per action
    pub async fn history_stats(&self) -> Result<HistoryStats> {
        let rows = sqlx::query("SELECT action, COUNT(*) FROM interactions GROUP BY action")
            .fetch_all(self.pool())
            .await?;

        let mut stats = HistoryStats::default();
        for row in rows {
            let action: String = row.get(0);
            let count: i64 = row.get(1);

            match action.as_str() {
                "fix" => stats.fix = count,
                "suggest" => stats.suggest = count,
                "explain" => stats.explain = count,
                "ask" => stats.ask = count,
                _ => {}
            }
            stats.total += count;
        }

        Ok(stats)
    }

    /// Delete all recorded interactions
    ///
    /// # Returns
    /// * `Ok(u64)` - Number of rows removed
    pub async fn clear_history(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM interactions")
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected())
    }
}
