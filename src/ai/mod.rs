/// AI assistance
///
/// Provider clients, the fixed prompt templates, response parsing and the
/// assistant that ties them to the system context.

pub mod anthropic;
pub mod assistant;
pub mod custom;
#[cfg(test)]
pub mod mock;
pub mod openai;
pub mod prompts;
pub mod provider;
pub mod response;

pub use assistant::Assistant;
pub use prompts::Action;
pub use provider::{provider_from_config, AiProvider, CompletionRequest};
pub use response::Advice;
