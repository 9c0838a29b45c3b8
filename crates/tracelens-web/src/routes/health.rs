//! Liveness route.

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// Report that the server is up and which model it relays to.
///
/// Makes no outbound call.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "model": state.client.model(),
    }))
}
