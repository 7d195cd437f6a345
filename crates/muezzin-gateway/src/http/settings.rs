use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::error;

use muezzin_core::{CoreError, SettingsUpdate};

use super::{failure, success};
use crate::app::AppState;

/// GET /settings — the current settings document.
pub async fn get_handler(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    match state.settings.load() {
        Ok(settings) => match serde_json::to_value(&settings) {
            Ok(doc) => success(doc),
            Err(e) => failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        },
        Err(e) => failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// PATCH /settings — validated partial update. A successful update restarts
/// the scheduler so the new values apply from the next resolution onwards.
pub async fn update_handler(
    State(state): State<Arc<AppState>>,
    Json(update): Json<SettingsUpdate>,
) -> (StatusCode, Json<Value>) {
    match state.settings.update(update) {
        Ok(settings) => {
            if let Err(e) = state.supervisor.restart().await {
                error!(error = %e, "settings updated but scheduler restart failed");
            }
            match serde_json::to_value(&settings) {
                Ok(doc) => success(doc),
                Err(e) => failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            }
        }
        Err(CoreError::InvalidSetting { field, reason }) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"status": "error", "field": field, "message": reason})),
        ),
        Err(e) => failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}
