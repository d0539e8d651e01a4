/// Provider trait and selection
///
/// Each backend turns a prompt into completion text. Which backend is used
/// depends only on what the config provides: an OpenAI key, then an
/// Anthropic key, then a custom endpoint.

use crate::ai::anthropic::AnthropicProvider;
use crate::ai::custom::CustomProvider;
use crate::ai::openai::OpenAiProvider;
use crate::config::Config;
use crate::error::{AicmdError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::debug;

/// System prompt sent with every request
pub const SYSTEM_PROMPT: &str = "You are an expert command-line assistant focused on helping users with terminal commands, error fixing, and system administration.";

const USER_AGENT: &str = concat!("aicmd/", env!("CARGO_PKG_VERSION"));

/// A single-turn completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(prompt: String, config: &Config) -> Self {
        Self {
            system: SYSTEM_PROMPT.to_string(),
            prompt,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

/// Trait implemented by each AI backend
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Human-readable name, e.g. "OpenAI"
    fn name(&self) -> &str;

    /// Send the request and return the completion text, trimmed
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

/// Pick the provider for this config
///
/// # Returns
/// * `Ok(Box<dyn AiProvider>)` - The first configured backend
/// * `Err(AicmdError::NoProvider)` - If no key or endpoint is set
pub fn provider_from_config(config: &Config) -> Result<Box<dyn AiProvider>> {
    let client = http_client(config)?;

    let provider: Box<dyn AiProvider> = if let Some(key) = &config.openai_api_key {
        Box::new(OpenAiProvider::new(
            client,
            key.clone(),
            config.openai_base_url.clone(),
            config.openai_model.clone(),
        ))
    } else if let Some(key) = &config.anthropic_api_key {
        Box::new(AnthropicProvider::new(
            client,
            key.clone(),
            config.anthropic_model.clone(),
        ))
    } else if let Some(endpoint) = &config.custom_endpoint {
        Box::new(CustomProvider::new(
            client,
            endpoint.clone(),
            config.custom_headers.clone(),
        ))
    } else {
        return Err(AicmdError::NoProvider);
    };

    debug!(provider = provider.name(), "selected AI provider");
    Ok(provider)
}

fn http_client(config: &Config) -> Result<Client> {
    Ok(Client::builder()
        .timeout(config.request_timeout())
        .user_agent(USER_AGENT)
        .build()?)
}

/// Turn a non-2xx response into a provider error carrying the body
pub(crate) async fn check_status(provider: &str, resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let text = resp.text().await.unwrap_or_default();
    Err(AicmdError::Provider(format!(
        "{} returned HTTP {}: {}",
        provider,
        status,
        text.trim()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_provider_configured() {
        let config = Config::default();
        match provider_from_config(&config) {
            Err(AicmdError::NoProvider) => {}
            Err(other) => panic!("Expected NoProvider, got {:?}", other),
            Ok(p) => panic!("Expected NoProvider, got {}", p.name()),
        }
    }

    #[test]
    fn test_provider_order() {
        let mut config = Config {
            custom_endpoint: Some("http://localhost:9000/generate".to_string()),
            ..Config::default()
        };
        assert_eq!(provider_from_config(&config).unwrap().name(), "custom");

        config.anthropic_api_key = Some("sk-ant".to_string());
        assert_eq!(provider_from_config(&config).unwrap().name(), "Anthropic");

        config.openai_api_key = Some("sk-openai".to_string());
        assert_eq!(provider_from_config(&config).unwrap().name(), "OpenAI");
    }

    #[test]
    fn test_request_uses_config_limits() {
        let config = Config {
            max_tokens: 42,
            temperature: 0.5,
            ..Config::default()
        };
        let request = CompletionRequest::new("hi".to_string(), &config);

        assert_eq!(request.max_tokens, 42);
        assert_eq!(request.temperature, 0.5);
        assert_eq!(request.system, SYSTEM_PROMPT);
    }
}
