/// Assistant
///
/// Builds the prompt for an action, sends it to the provider, parses the
/// answer and records the exchange in the history database when one is
/// attached.

use crate::ai::prompts::{self, Action};
use crate::ai::provider::{AiProvider, CompletionRequest};
use crate::ai::response::Advice;
use crate::config::Config;
use crate::core::context::SystemContext;
use crate::core::error_parser::ErrorParser;
use crate::core::mailbox::ErrorReport;
use crate::db::{Database, InteractionInput};
use crate::error::Result;
use std::sync::Arc;
use tracing::{debug, warn};

/// Assistant bound to one provider and one system context
pub struct Assistant {
    provider: Box<dyn AiProvider>,
    context: SystemContext,
    parser: ErrorParser,
    config: Config,
    db: Option<Arc<Database>>,
}

impl Assistant {
    /// Create a new assistant
    pub fn new(provider: Box<dyn AiProvider>, context: SystemContext, config: Config) -> Self {
        Self {
            provider,
            context,
            parser: ErrorParser::new(),
            config,
            db: None,
        }
    }

    /// Record every interaction in `db`
    pub fn with_history(mut self, db: Arc<Database>) -> Self {
        self.db = Some(db);
        self
    }

    /// Diagnose a captured mailbox report
    pub async fn fix_report(&self, report: &ErrorReport) -> Result<Advice> {
        let failed_command = report.command.clone();
        self.fix_with(&report.to_prompt_text(), failed_command, report.exit_code)
            .await
    }

    /// Diagnose error text typed or pasted by the user
    pub async fn fix(&self, error_text: &str) -> Result<Advice> {
        let failed_command = self.parser.extract_command(error_text);
        self.fix_with(error_text, failed_command, None).await
    }

    async fn fix_with(
        &self,
        error_text: &str,
        failed_command: Option<String>,
        exit_code: Option<i32>,
    ) -> Result<Advice> {
        let diagnosis = self.parser.categorize(error_text);
        debug!(category = %diagnosis.category, command = ?failed_command, "diagnosing error");

        let prompt = prompts::fix_prompt(
            error_text,
            failed_command.as_deref(),
            &diagnosis,
            &self.context,
        );
        self.run(Action::Fix, error_text, prompt, exit_code).await
    }

    /// Suggest a command for a task description
    pub async fn suggest(&self, description: &str) -> Result<Advice> {
        let prompt = prompts::suggest_prompt(description, &self.context);
        self.run(Action::Suggest, description, prompt, None).await
    }

    /// Explain what a command does
    pub async fn explain(&self, command: &str) -> Result<Advice> {
        let prompt = prompts::explain_prompt(command, &self.context);
        self.run(Action::Explain, command, prompt, None).await
    }

    /// Answer a free-form question
    pub async fn ask(&self, question: &str) -> Result<Advice> {
        let prompt = prompts::ask_prompt(question, &self.context);
        self.run(Action::Ask, question, prompt, None).await
    }

    async fn run(
        &self,
        action: Action,
        input: &str,
        prompt: String,
        exit_code: Option<i32>,
    ) -> Result<Advice> {
        let request = CompletionRequest::new(prompt, &self.config);
        debug!(%action, provider = self.provider.name(), "requesting completion");

        let raw = self.provider.complete(&request).await?;
        let advice = Advice::parse(&raw);

        if let Some(db) = &self.db {
            let record = InteractionInput {
                action,
                input: input.trim().to_string(),
                response: raw,
                suggested_command: advice.command.clone(),
                exit_code,
            };
            // History is best-effort; the answer still goes to the user
            if let Err(e) = db.record_interaction(record).await {
                warn!(error = %e, "failed to record interaction");
            }
        }

        Ok(advice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::mock::MockProvider;
    use crate::error::AicmdError;
    use std::path::PathBuf;

    fn context() -> SystemContext {
        SystemContext {
            os: "linux (x86_64)".to_string(),
            shell: "bash".to_string(),
            cwd: PathBuf::from("/work"),
            user: "dev".to_string(),
            git_branch: Some("main".to_string()),
            project_type: None,
            available_tools: vec!["git".to_string()],
        }
    }

    fn assistant(mock: &MockProvider) -> Assistant {
        Assistant::new(Box::new(mock.clone()), context(), Config::default())
    }

    #[test]
    fn test_fix_report_uses_captured_command() {
        let mock = MockProvider::new().with_response(
            "EXPLANATION:\nTypo.\nCOMMAND:\n```\nls -la\n```\nSAFETY:\nNone",
        );
        let report = ErrorReport {
            command: Some("lls -la".to_string()),
            exit_code: Some(127),
            error_text: "bash: lls: command not found".to_string(),
            simple_text: Some("Command 'lls' not found".to_string()),
            captured_at: None,
        };

        let advice = tokio_test::block_on(assistant(&mock).fix_report(&report)).unwrap();

        assert_eq!(advice.command.as_deref(), Some("ls -la"));
        let prompt = mock.last_prompt().unwrap();
        assert!(prompt.contains("FAILED COMMAND: lls -la\n"));
        assert!(prompt.contains("ERROR CATEGORY: command_not_found"));
        assert!(prompt.contains("- Git Branch: main"));
    }

    #[test]
    fn test_fix_extracts_command_from_pasted_text() {
        let mock = MockProvider::new().with_response("EXPLANATION:\nNo upstream.");

        tokio_test::block_on(
            assistant(&mock).fix("Command 'git push' failed with exit code 128"),
        )
        .unwrap();

        assert!(mock.last_prompt().unwrap().contains("FAILED COMMAND: git push\n"));
    }

    #[test]
    fn test_request_carries_config_limits() {
        let mock = MockProvider::new().with_response("EXPLANATION:\nok");

        tokio_test::block_on(assistant(&mock).explain("ls -la")).unwrap();

        let requests = mock.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].max_tokens, Config::default().max_tokens);
        assert!(requests[0].prompt.contains("COMMAND TO EXPLAIN:\nls -la"));
    }

    #[test]
    fn test_provider_error_propagates() {
        let mock = MockProvider::new().with_error("HTTP 500");

        match tokio_test::block_on(assistant(&mock).suggest("list files")) {
            Err(AicmdError::Provider(msg)) => assert_eq!(msg, "HTTP 500"),
            other => panic!("Expected Provider error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_interactions_recorded_in_history() {
        let db = Arc::new(Database::new_test().await.unwrap());
        let mock = MockProvider::new()
            .with_response("EXPLANATION:\nUse find.\nCOMMAND:\nfind . -size +100M")
            .with_response("umask masks permission bits.");

        let assistant = assistant(&mock).with_history(Arc::clone(&db));
        assistant.suggest("  find big files ").await.unwrap();
        let answer = assistant.ask("what is umask?").await.unwrap();
        assert_eq!(answer.explanation, "umask masks permission bits.");

        let recent = db.get_recent_interactions(10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].action, "ask");
        assert_eq!(recent[0].suggested_command, None);
        assert_eq!(recent[1].input, "find big files");
        assert_eq!(recent[1].suggested_command.as_deref(), Some("find . -size +100M"));
    }
}
