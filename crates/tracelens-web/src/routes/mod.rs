//! Route handlers.

pub mod analyze;
pub mod health;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracelens_core::{AnalyzeError, ErrorBody};

/// Handler error, rendered as a structured JSON body.
#[derive(Debug)]
pub struct ApiError(pub AnalyzeError);

impl From<AnalyzeError> for ApiError {
    fn from(err: AnalyzeError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            AnalyzeError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AnalyzeError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AnalyzeError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorBody::from(&self.0))).into_response()
    }
}
