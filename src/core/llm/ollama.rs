use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::llm::{LlmError, LlmProvider};

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

pub struct OllamaProvider {
    base_url: String,
    model: String,
    client: Client,
}

impl OllamaProvider {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
        })
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let req = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };
        let res = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&req)
            .send()
            .await
            .map_err(|e| LlmError::Unreachable(e.to_string()))?;
        if !res.status().is_success() {
            return Err(LlmError::Unreachable(format!(
                "Ollama API error: {}",
                res.text().await.unwrap_or_default()
            )));
        }
        let parsed: GenerateResponse = res
            .json()
            .await
            .map_err(|e| LlmError::UnusableOutput(e.to_string()))?;
        let text = parsed.response.trim().to_string();
        if text.is_empty() {
            return Err(LlmError::UnusableOutput("empty completion".to_string()));
        }
        Ok(text)
    }
}
