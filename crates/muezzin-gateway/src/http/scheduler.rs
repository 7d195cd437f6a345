use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{failure, success};
use crate::app::AppState;

/// GET /scheduler/status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    success(json!({"active": state.supervisor.is_running().await}))
}

/// POST /scheduler/start
pub async fn start_handler(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    match state.supervisor.start().await {
        Ok(()) => success(json!({"message": "Scheduler started"})),
        Err(e) => failure(StatusCode::CONFLICT, e.to_string()),
    }
}

/// POST /scheduler/stop — idempotent.
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    state.supervisor.stop().await;
    success(json!({"message": "Scheduler stopped"}))
}

/// POST /scheduler/restart
pub async fn restart_handler(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    match state.supervisor.restart().await {
        Ok(()) => success(json!({"message": "Scheduler restarted"})),
        Err(e) => failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}
