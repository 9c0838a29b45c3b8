//! Wire types exchanged between the capture shim and the analyze endpoint.

use serde::{Deserialize, Serialize};

use crate::error::{AnalyzeError, AnalyzeResult};

/// Literal shown when no explanation came back.
pub const FALLBACK_ANALYSIS: &str = "No AI explanation returned.";

/// A failing snippet and its (already redacted) trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub code: String,
    pub error: String,
}

/// The body accepted by `POST /analyze` before validation.
///
/// Both fields are optional on the wire so that an absent field surfaces as
/// a `BadRequest` instead of a framework-level rejection.
#[derive(Debug, Default, Deserialize)]
pub struct AnalysisRequestBody {
    pub code: Option<String>,
    pub error: Option<String>,
}

impl AnalysisRequestBody {
    /// Check that both fields are present.
    pub fn validate(self) -> AnalyzeResult<AnalysisRequest> {
        let code = self
            .code
            .ok_or_else(|| AnalyzeError::bad_request("missing required field `code`"))?;
        let error = self
            .error
            .ok_or_else(|| AnalyzeError::bad_request("missing required field `error`"))?;
        Ok(AnalysisRequest { code, error })
    }
}

/// The explanation returned by `POST /analyze`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub analysis: String,
}

/// Lenient view of an endpoint reply, tolerating a missing `analysis` field.
#[derive(Debug, Default, Deserialize)]
pub struct AnalysisReply {
    pub analysis: Option<String>,
}

impl AnalysisReply {
    /// The analysis text, or [`FALLBACK_ANALYSIS`] when absent or blank.
    pub fn text_or_fallback(&self) -> &str {
        match self.analysis.as_deref() {
            Some(text) if !text.trim().is_empty() => text,
            _ => FALLBACK_ANALYSIS,
        }
    }
}

/// Structured error body returned by the endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl From<&AnalyzeError> for ErrorBody {
    fn from(err: &AnalyzeError) -> Self {
        Self {
            error: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}
