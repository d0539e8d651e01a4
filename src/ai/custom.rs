/// Custom JSON endpoint backend
///
/// For local or self-hosted models. Sends `{"prompt", "max_tokens",
/// "temperature"}` and reads the first of the usual text fields back.

use crate::ai::provider::{check_status, AiProvider, CompletionRequest};
use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::debug;

// Response fields tried in order
const TEXT_FIELDS: &[&str] = &["text", "response", "content", "output"];

pub struct CustomProvider {
    client: Client,
    endpoint: String,
    headers: HashMap<String, String>,
}

impl CustomProvider {
    pub fn new(client: Client, endpoint: String, headers: HashMap<String, String>) -> Self {
        Self {
            client,
            endpoint,
            headers,
        }
    }
}

/// First known text field, or the whole body pretty-printed
pub(crate) fn extract_text(data: &Value) -> String {
    TEXT_FIELDS
        .iter()
        .find_map(|field| data[*field].as_str())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| serde_json::to_string_pretty(data).unwrap_or_default())
}

#[async_trait]
impl AiProvider for CustomProvider {
    fn name(&self) -> &str {
        "custom"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        debug!(endpoint = %self.endpoint, "sending request to custom endpoint");

        let body = json!({
            "prompt": format!("{}\n\n{}", request.system, request.prompt),
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
        });

        let mut builder = self.client.post(&self.endpoint).json(&body);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let resp = builder.send().await?;
        let data: Value = check_status(self.name(), resp).await?.json().await?;

        Ok(extract_text(&data))
    }
}
