/// History searcher with fuzzy matching
///
/// Ranks past interactions against a loose query, the way a shell's
/// reverse-search would.

use crate::db::{Database, SearchResult};
use crate::error::Result;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use std::sync::Arc;

/// How many recent rows are considered for fuzzy matching
const SEARCH_WINDOW: i64 = 1000;

/// Handles history searching with fuzzy matching
pub struct Searcher {
    db: Arc<Database>,
    matcher: SkimMatcherV2,
}

impl Searcher {
    /// Create a new searcher instance
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
            matcher: SkimMatcherV2::default(),
        }
    }

    /// Search interactions with fuzzy matching
    ///
    /// Scores the input and the suggested command; the better one counts.
    ///
    /// # Arguments
    /// * `query` - Search query
    /// * `limit` - Maximum results to return
    ///
    /// # Returns
    /// * `Ok(Vec<SearchResult>)` - Search results sorted by score
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let interactions = self.db.get_recent_interactions(SEARCH_WINDOW).await?;

        let mut results: Vec<SearchResult> = interactions
            .into_iter()
            .filter_map(|interaction| {
                let on_input = self.matcher.fuzzy_match(&interaction.input, query);
                let on_command = interaction
                    .suggested_command
                    .as_deref()
                    .and_then(|cmd| self.matcher.fuzzy_match(cmd, query));

                on_input.max(on_command).map(|score| SearchResult {
                    interaction,
                    score,
                })
            })
            .collect();

        // Highest score first; ties keep recency order
        results.sort_by(|a, b| b.score.cmp(&a.score));
        results.truncate(limit);

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::Action;
    use crate::db::InteractionInput;

    async fn seeded() -> Searcher {
        let db = Database::new_test().await.unwrap();

        for (action, text, command) in [
            (Action::Fix, "bash: dokcer: command not found", Some("docker ps")),
            (Action::Suggest, "list open ports", Some("ss -tulpn")),
            (Action::Explain, "git rebase -i HEAD~3", None),
        ] {
            db.record_interaction(InteractionInput {
                action,
                input: text.to_string(),
                response: String::new(),
                suggested_command: command.map(str::to_string),
                exit_code: None,
            })
            .await
            .unwrap();
        }

        Searcher::new(Arc::new(db))
    }

    #[tokio::test]
    async fn test_fuzzy_search_matches_suggested_command() {
        let searcher = seeded().await;

        let results = searcher.search("dkrps", 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].interaction.suggested_command.as_deref(), Some("docker ps"));
    }

    #[tokio::test]
    async fn test_fuzzy_search_matches_input() {
        let searcher = seeded().await;

        let results = searcher.search("rebase", 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].interaction.input, "git rebase -i HEAD~3");
    }

    #[tokio::test]
    async fn test_search_limit() {
        let searcher = seeded().await;

        // Single letter present in every row
        let results = searcher.search("s", 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].score >= results[1].score);
    }
}
