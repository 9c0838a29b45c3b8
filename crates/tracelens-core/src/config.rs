//! Inference configuration.
//!
//! Settings are read from the environment. The CLI exposes the same
//! variables as flags.

use std::time::Duration;

use crate::error::{AnalyzeError, AnalyzeResult};

/// Default chat-completions endpoint (Groq, OpenAI-compatible).
pub const DEFAULT_COMPLETIONS_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

/// Default upstream request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Environment variable holding the API credential.
pub const API_KEY_VAR: &str = "GROQ_API_KEY";

/// Settings for the inference client.
#[derive(Clone)]
pub struct InferenceConfig {
    pub api_key: String,
    pub completions_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for InferenceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceConfig")
            .field("api_key", &"***")
            .field("completions_url", &self.completions_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl InferenceConfig {
    /// Config with the given key and default endpoint, model and timeout.
    pub fn new(api_key: impl Into<String>) -> AnalyzeResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AnalyzeError::config(format!("{} is not set", API_KEY_VAR)));
        }

        Ok(Self {
            api_key,
            completions_url: DEFAULT_COMPLETIONS_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Read the config from `GROQ_API_KEY`, `TRACELENS_COMPLETIONS_URL`,
    /// `TRACELENS_MODEL` and `TRACELENS_UPSTREAM_TIMEOUT_SECS`.
    pub fn from_env() -> AnalyzeResult<Self> {
        let api_key = std::env::var(API_KEY_VAR).unwrap_or_default();
        let mut config = Self::new(api_key)?;

        if let Ok(url) = std::env::var("TRACELENS_COMPLETIONS_URL") {
            config = config.with_completions_url(url);
        }
        if let Ok(model) = std::env::var("TRACELENS_MODEL") {
            config = config.with_model(model);
        }
        if let Ok(secs) = std::env::var("TRACELENS_UPSTREAM_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                AnalyzeError::config(format!(
                    "TRACELENS_UPSTREAM_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                    secs
                ))
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    pub fn with_completions_url(mut self, url: impl Into<String>) -> Self {
        self.completions_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
