//! Application state.

use tracelens_llm::InferenceClient;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub client: InferenceClient,
}

impl AppState {
    pub fn new(client: InferenceClient) -> Self {
        Self { client }
    }
}
