use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::infra::app_state::AppState;

pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "storage": state.catalog.blob_store().kind().to_string(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
