//! Health check endpoint

use axum::Json;
use serde_json::{json, Value};

/// Liveness probe. Static once startup has completed; the router is not
/// reachable before the checkpoint is loaded.
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
