//! Chat-completions HTTP client.
//!
//! Talks to an OpenAI-compatible `/chat/completions` endpoint (Groq by
//! default) and returns the text of the first choice. One request per call,
//! no retries.

use serde::{Deserialize, Serialize};
use tracelens_core::prompt::SYSTEM_PROMPT;
use tracelens_core::{AnalyzeError, AnalyzeResult, InferenceConfig};
use tracing::{debug, warn};

/// Longest upstream error body echoed back in an error message.
const MAX_ERROR_BODY: usize = 300;

/// Inference client for a fixed model.
#[derive(Clone)]
pub struct InferenceClient {
    config: InferenceConfig,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl InferenceClient {
    /// Create a client from the given settings.
    pub fn new(config: InferenceConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();

        Self { config, client }
    }

    /// Model identifier sent with every request.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Send `prompt` as the user message and return the first completion.
    pub async fn complete(&self, prompt: &str) -> AnalyzeResult<String> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage { role: "system", content: SYSTEM_PROMPT },
                ChatMessage { role: "user", content: prompt },
            ],
        };

        debug!(
            url = %self.config.completions_url,
            model = %self.config.model,
            prompt_len = prompt.len(),
            "Sending completion request"
        );

        let response = self
            .client
            .post(&self.config.completions_url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AnalyzeError::upstream("completion request timed out")
                } else {
                    AnalyzeError::upstream(format!("failed to reach completion API: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "Completion API returned an error");
            return Err(AnalyzeError::upstream(format!(
                "completion API error ({}): {}",
                status,
                error_message(&body)
            )));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| AnalyzeError::upstream(format!("malformed completion response: {}", e)))?;

        let text = result
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| AnalyzeError::upstream("completion response contained no text"))?;

        debug!(len = text.len(), "Received completion");

        Ok(text)
    }
}

/// Pull the message out of an OpenAI-style error body, else a truncated body.
fn error_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorResponse>(body) {
        return parsed.error.message;
    }
    let body = body.trim();
    if body.len() > MAX_ERROR_BODY {
        let mut end = MAX_ERROR_BODY;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
