/// Anthropic messages API backend

use crate::ai::provider::{check_status, AiProvider, CompletionRequest};
use crate::error::{AicmdError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    model: String,
}

impl AnthropicProvider {
    pub fn new(client: Client, api_key: String, model: String) -> Self {
        Self {
            client,
            api_key,
            model,
        }
    }

    fn build_request_body(&self, request: &CompletionRequest) -> Value {
        json!({
            "model": self.model,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
            "system": request.system,
            "messages": [
                { "role": "user", "content": request.prompt },
            ],
        })
    }
}

/// Concatenated text blocks of the response
pub(crate) fn extract_text(data: &Value) -> Option<String> {
    let text: String = data["content"]
        .as_array()?
        .iter()
        .filter(|block| block["type"] == "text")
        .filter_map(|block| block["text"].as_str())
        .collect();

    if text.trim().is_empty() {
        None
    } else {
        Some(text.trim().to_string())
    }
}

#[async_trait]
impl AiProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "Anthropic"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = self.build_request_body(request);
        debug!(model = %self.model, "sending Anthropic API request");

        let resp = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let data: Value = check_status(self.name(), resp).await?.json().await?;

        extract_text(&data).ok_or_else(|| {
            AicmdError::Provider("Unexpected Anthropic API response format".to_string())
        })
    }
}
