use crate::api::ChatCompletion;
use crate::config::Config;
use crate::error::UpstreamError;
use crate::utils::retry::{retry, RetryPolicy};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const SERVICE_NAME: &str = "OpenAI";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl ChatResponse {
    /// Text of the first choice
    fn into_text(self) -> Result<String, UpstreamError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(UpstreamError::EmptyCompletion)
    }
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint
pub struct OpenAiClient {
    api_key: String,
    base_url: String,
    model: String,
    retry: RetryPolicy,
    client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .context("Failed to build OpenAI HTTP client")?;

        Ok(Self {
            api_key: config.openai_api_key.clone(),
            base_url: config.openai_base_url.clone(),
            model: config.openai_model.clone(),
            retry: config.retry,
            client,
        })
    }

    fn request_for<'a>(&'a self, prompt: &str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: Some(prompt.to_string()),
            }],
        }
    }
}

#[async_trait]
impl ChatCompletion for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = self.request_for(prompt);

        retry(&self.retry, SERVICE_NAME, || async {
            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&request)
                .send()
                .await
                .context("Failed to send completion request")?;

            let status = response.status();
            if !status.is_success() {
                return Err(UpstreamError::Status {
                    service: SERVICE_NAME,
                    status,
                }
                .into());
            }

            let body: ChatResponse = response
                .json()
                .await
                .context("Failed to parse completion response")?;

            Ok(body.into_text()?)
        })
        .await
    }
}
