//! HTTP client for the analyze endpoint.

use tracelens_core::{AnalysisReply, AnalysisRequest, ErrorBody};
use tracing::{debug, warn};

use crate::error::{ShimError, ShimResult};

/// Default analyze endpoint base URL.
pub const DEFAULT_ENDPOINT_URL: &str = "http://127.0.0.1:8000";

/// Sends captured failures to `POST /analyze`.
///
/// No request timeout is set: the call blocks until the endpoint answers
/// or the connection fails, unless one is configured with [`with_timeout`].
///
/// [`with_timeout`]: EndpointClient::with_timeout
#[derive(Clone)]
pub struct EndpointClient {
    client: reqwest::Client,
    base_url: String,
}

impl EndpointClient {
    /// Create a client using `TRACELENS_URL`, or `http://127.0.0.1:8000`.
    pub fn new() -> Self {
        let base_url =
            std::env::var("TRACELENS_URL").unwrap_or_else(|_| DEFAULT_ENDPOINT_URL.to_string());
        Self::with_url(&base_url)
    }

    /// Create a client with a custom base URL.
    pub fn with_url(base_url: &str) -> Self {
        debug!(base_url = %base_url, "EndpointClient initialized");
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Bound every call to `timeout`.
    pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Post a failure and return the endpoint's reply.
    ///
    /// A reply without an `analysis` field is not an error; callers decide
    /// how to show it.
    pub async fn analyze(&self, request: &AnalysisRequest) -> ShimResult<AnalysisReply> {
        let url = format!("{}/analyze", self.base_url);
        debug!(url = %url, error_len = request.error.len(), "Requesting analysis");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| ShimError::Endpoint(format!("could not reach {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.message)
                .unwrap_or(body);
            warn!(status_code = %status, "Analyze endpoint returned an error");
            return Err(ShimError::Endpoint(format!("{} returned {}: {}", url, status, detail)));
        }

        response
            .json::<AnalysisReply>()
            .await
            .map_err(|e| ShimError::Endpoint(format!("unreadable reply from {}: {}", url, e)))
    }
}

impl Default for EndpointClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracelens_core::FALLBACK_ANALYSIS;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> AnalysisRequest {
        AnalysisRequest {
            code: "x=1/0".to_string(),
            error: "ZeroDivisionError: division by zero".to_string(),
        }
    }

    #[tokio::test]
    async fn test_analyze_posts_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .and(body_json(serde_json::json!({
                "code": "x=1/0",
                "error": "ZeroDivisionError: division by zero"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "analysis": "Dividing by zero." })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = EndpointClient::with_url(&format!("{}/", server.uri()));
        let reply = client.analyze(&request()).await.unwrap();
        assert_eq!(reply.text_or_fallback(), "Dividing by zero.");
    }

    #[tokio::test]
    async fn test_missing_analysis_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let reply = EndpointClient::with_url(&server.uri())
            .analyze(&request())
            .await
            .unwrap();
        assert_eq!(reply.text_or_fallback(), FALLBACK_ANALYSIS);
    }

    #[tokio::test]
    async fn test_error_status_uses_structured_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_json(serde_json::json!({
                "error": "upstream",
                "message": "Upstream error: completion request timed out"
            })))
            .mount(&server)
            .await;

        let err = EndpointClient::with_url(&server.uri())
            .analyze(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, ShimError::Endpoint(_)));
        assert!(err.to_string().contains("502"));
        assert!(err.to_string().contains("completion request timed out"));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let err = EndpointClient::with_url("http://127.0.0.1:1")
            .analyze(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, ShimError::Endpoint(_)));
        assert!(err.to_string().contains("could not reach"));
    }
}
