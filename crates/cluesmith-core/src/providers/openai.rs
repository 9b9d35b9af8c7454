use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::json;
use tracing::debug;

use super::ContentGenerator;
use crate::config::PipelineConfig;
use crate::error::{GenerationError, GenerationResult};

const USER_AGENT_VALUE: &str = concat!("cluesmith/", env!("CARGO_PKG_VERSION"));

/// Chat-completions client for OpenAI-compatible endpoints.
#[derive(Clone)]
pub struct OpenAiGenerator {
    pub model: String,
    pub url: String,
    pub temperature: f32,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiGenerator {
    pub fn new(
        url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        temperature: f32,
        timeout: Duration,
    ) -> GenerationResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|e| GenerationError::config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            model: model.into(),
            url: url.into(),
            temperature,
            api_key: api_key.into(),
            client,
        })
    }

    /// Build from pipeline configuration.
    ///
    /// Fails with [`GenerationError::Config`] when no credential is configured.
    pub fn from_config(config: &PipelineConfig) -> GenerationResult<Self> {
        let api_key = config.credential()?;
        Self::new(
            &config.api_url,
            &config.model,
            api_key,
            config.temperature,
            Duration::from_secs(config.timeout_secs),
        )
    }
}

impl fmt::Debug for OpenAiGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiGenerator")
            .field("model", &self.model)
            .field("url", &self.url)
            .field("temperature", &self.temperature)
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ContentGenerator for OpenAiGenerator {
    async fn generate(&self, system: &str, user: &str) -> GenerationResult<String> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "temperature": self.temperature,
            "n": 1,
        });

        debug!(url = %self.url, model = %self.model, "requesting completion");
        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(GenerationError::Transport {
                status: Some(status.as_u16()),
                message: format!("chat API error: {error_text}"),
            });
        }

        let json: serde_json::Value = resp.json().await?;
        let text = json
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .ok_or_else(|| GenerationError::Transport {
                status: None,
                message: "chat API response missing content".into(),
            })?;

        Ok(text.trim().to_string())
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}
