/// OpenAI chat completions backend

use crate::ai::provider::{check_status, AiProvider, CompletionRequest};
use crate::error::{AicmdError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(client: Client, api_key: String, base_url: String, model: String) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    fn build_request_body(&self, request: &CompletionRequest) -> Value {
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.prompt },
            ],
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
            "stream": false,
        })
    }
}

/// Text of the first choice
pub(crate) fn extract_text(data: &Value) -> Option<String> {
    data["choices"][0]["message"]["content"]
        .as_str()
        .map(|s| s.trim().to_string())
}

#[async_trait]
impl AiProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = self.build_request_body(request);
        debug!(model = %self.model, "sending OpenAI API request");

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let data: Value = check_status(self.name(), resp).await?.json().await?;

        extract_text(&data).ok_or_else(|| {
            AicmdError::Provider("Unexpected OpenAI API response format".to_string())
        })
    }
}
