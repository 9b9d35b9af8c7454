//! Pipeline configuration.
//!
//! Layered lowest to highest: built-in defaults, optional YAML file,
//! environment, then explicit overrides from the caller (CLI flags).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, GenerationResult};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_PROMPT_VERSION: &str = "v4-2025-08-31";
pub const DEFAULT_CONCURRENCY: usize = 10;
pub const DEFAULT_CACHE_FILE: &str = "hints_cache.json";
pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_prompt_version() -> String {
    DEFAULT_PROMPT_VERSION.to_string()
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_cache_file() -> PathBuf {
    PathBuf::from(DEFAULT_CACHE_FILE)
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout() -> u64 {
    60
}

fn default_max_attempts() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    500
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Model identity; part of every cache key.
    #[serde(default = "default_model")]
    pub model: String,

    /// Prompt set tag; part of every cache key.
    #[serde(default = "default_prompt_version")]
    pub prompt_version: String,

    /// Worker pool width.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default = "default_cache_file")]
    pub cache_file: PathBuf,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Provider credential. Never read from or written to config files.
    #[serde(skip)]
    pub api_key: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Per-request deadline in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            prompt_version: default_prompt_version(),
            concurrency: default_concurrency(),
            cache_file: default_cache_file(),
            api_url: default_api_url(),
            api_key: None,
            temperature: default_temperature(),
            timeout_secs: default_timeout(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl PipelineConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Self {
        Self::default().with_env_from(|name| std::env::var(name).ok())
    }

    /// Parse a YAML config file. Missing fields take their defaults.
    pub fn from_yaml_file(path: &Path) -> GenerationResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            GenerationError::config(format!("failed to read config {}: {}", path.display(), e))
        })?;
        serde_yaml::from_str(&raw).map_err(|e| {
            GenerationError::config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Overlay variables resolved through `lookup`; empty values are ignored.
    ///
    /// | Variable | Field |
    /// |---|---|
    /// | `HINTS_MODEL`, then `OPENAI_MODEL` | `model` |
    /// | `HINTS_PROMPT_VERSION` | `prompt_version` |
    /// | `HINTS_CONCURRENCY` | `concurrency` |
    /// | `HINTS_CACHE_FILE` | `cache_file` |
    /// | `OPENAI_API_URL` | `api_url` |
    /// | `OPENAI_API_KEY` | `api_key` |
    /// | `HINTS_TEMPERATURE` | `temperature` |
    /// | `HINTS_TIMEOUT` | `timeout_secs` |
    pub fn with_env_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(model) = get("HINTS_MODEL").or_else(|| get("OPENAI_MODEL")) {
            self.model = model;
        }
        if let Some(v) = get("HINTS_PROMPT_VERSION") {
            self.prompt_version = v;
        }
        if let Some(n) = get("HINTS_CONCURRENCY").and_then(|v| v.trim().parse().ok()) {
            self.concurrency = n;
        }
        if let Some(v) = get("HINTS_CACHE_FILE") {
            self.cache_file = PathBuf::from(v);
        }
        if let Some(v) = get("OPENAI_API_URL") {
            self.api_url = v;
        }
        if let Some(v) = get("OPENAI_API_KEY") {
            self.api_key = Some(v);
        }
        if let Some(t) = get("HINTS_TEMPERATURE").and_then(|v| v.trim().parse().ok()) {
            self.temperature = t;
        }
        if let Some(t) = get("HINTS_TIMEOUT").and_then(|v| v.trim().parse().ok()) {
            self.timeout_secs = t;
        }
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_prompt_version(mut self, version: impl Into<String>) -> Self {
        self.prompt_version = version.into();
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_cache_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_file = path.into();
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay_ms = delay.as_millis().min(u128::from(u64::MAX)) as u64;
        self
    }

    /// Worker pool width, never below one.
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.max(1)
    }

    /// The provider credential, or a config error when none is set.
    pub fn credential(&self) -> GenerationResult<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| GenerationError::config("OPENAI_API_KEY is not set"))
    }
}
