/// Prompt templates
///
/// One fixed template per action. Every template asks for the same labelled
/// sections so `response::Advice::parse` can read any of them.

use crate::core::context::SystemContext;
use crate::core::error_parser::Diagnosis;
use crate::core::error_parser::ErrorCategory;
use std::fmt;

/// What the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Fix,
    Suggest,
    Explain,
    Ask,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Fix => "fix",
            Action::Suggest => "suggest",
            Action::Explain => "explain",
            Action::Ask => "ask",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Prompt for diagnosing an error
pub fn fix_prompt(
    error_text: &str,
    failed_command: Option<&str>,
    diagnosis: &Diagnosis,
    context: &SystemContext,
) -> String {
    let mut details = String::new();
    if let Some(command) = failed_command {
        details.push_str(&format!("FAILED COMMAND: {}\n", command));
    }
    if diagnosis.category != ErrorCategory::Unknown {
        details.push_str(&format!("ERROR CATEGORY: {}\n", diagnosis.category));
    }

    format!(
        "Help fix this command-line error and provide a working solution.

SYSTEM CONTEXT:
{context}
ERROR TO FIX:
{error_text}

{details}
Respond in exactly this format:

EXPLANATION:
[What went wrong and why the fix works]

COMMAND:
[The corrected command to run]

SAFETY:
[Any warnings, or \"None\"]",
        context = context.to_prompt_block(),
        error_text = error_text.trim(),
        details = details,
    )
}

/// Prompt for turning a task description into a command
pub fn suggest_prompt(description: &str, context: &SystemContext) -> String {
    format!(
        "Suggest the best command for the task below.

SYSTEM CONTEXT:
{context}
TASK DESCRIPTION:
{description}

Respond in exactly this format:

EXPLANATION:
[What the command accomplishes]

COMMAND:
[The suggested command to run]

ALTERNATIVES:
[Other ways to do the same thing, if any]

SAFETY:
[Any warnings, or \"None\"]",
        context = context.to_prompt_block(),
        description = description.trim(),
    )
}

/// Prompt for explaining a command
pub fn explain_prompt(command: &str, context: &SystemContext) -> String {
    format!(
        "Explain the command below.

SYSTEM CONTEXT:
- OS: {os}
- Shell: {shell}

COMMAND TO EXPLAIN:
{command}

Respond in exactly this format:

EXPLANATION:
[Summary of what the command does]

BREAKDOWN:
[Part-by-part analysis of the syntax, flags and options]

BEHAVIOR:
[Expected output and side effects]

SAFETY:
[Risks or precautions, or \"None\"]",
        os = context.os,
        shell = context.shell,
        command = command.trim(),
    )
}

/// Prompt for a free-form question
pub fn ask_prompt(question: &str, context: &SystemContext) -> String {
    format!(
        "Answer the command-line question below.

SYSTEM CONTEXT:
{context}
QUESTION:
{question}

Respond in this format, leaving out COMMAND if no command applies:

EXPLANATION:
[The answer]

COMMAND:
[A command that illustrates the answer]",
        context = context.to_prompt_block(),
        question = question.trim(),
    )
}
