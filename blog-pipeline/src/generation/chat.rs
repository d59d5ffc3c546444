use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{GenerationMode, TextGenerator};
use crate::config::BackendConfig;
use crate::error::{PipelineError, PipelineResult};

// ── chat-completions request/response ──

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageOwned,
}

#[derive(Deserialize)]
struct ChatMessageOwned {
    content: Option<String>,
}

/// Backend speaking the chat-completions JSON shape.
pub struct ChatCompletionsBackend {
    config: BackendConfig,
    client: Client,
}

impl ChatCompletionsBackend {
    pub fn new(config: BackendConfig, timeout: Duration) -> PipelineResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PipelineError::Config(format!("http client: {}", e)))?;
        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsBackend {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn generate(
        &self,
        prompt: &str,
        max_output_tokens: u32,
        mode: GenerationMode,
    ) -> PipelineResult<String> {
        let req = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: max_output_tokens,
            temperature: mode.temperature(),
        };

        let res = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&req)
            .send()
            .await
            .map_err(|e| PipelineError::transport(&self.config.name, e))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(PipelineError::transport(
                &self.config.name,
                format!("{} API Error: {}", status, body),
            ));
        }

        let parsed: ChatResponse = res
            .json()
            .await
            .map_err(|e| PipelineError::transport(&self.config.name, e))?;
        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}
