//! tracelens Core Library
//!
//! Redaction, prompt assembly, configuration and wire types shared by the
//! analyze endpoint and the capture shim.

pub mod config;
pub mod error;
pub mod model;
pub mod prompt;
pub mod redact;

pub use config::InferenceConfig;
pub use error::{AnalyzeError, AnalyzeResult};
pub use model::{AnalysisReply, AnalysisRequest, AnalysisRequestBody, AnalysisResponse, ErrorBody, FALLBACK_ANALYSIS};
pub use redact::Redactor;
