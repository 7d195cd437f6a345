use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{failure, success};
use crate::app::AppState;

/// GET /next — preview the next event the scheduler would announce.
pub async fn next_handler(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    let settings = match state.settings.load() {
        Ok(settings) => settings,
        Err(e) => return failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    let tz = match settings.tz() {
        Ok(tz) => tz,
        Err(e) => return failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    let (name, location) = match settings.active() {
        Ok(active) => active,
        Err(e) => return failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };

    let now = Utc::now().with_timezone(&tz);
    match state
        .resolver
        .resolve_next(now, name, location, &settings.azan)
        .await
    {
        Ok(resolved) => success(json!({
            "event": resolved.event,
            "at": resolved.at.to_rfc3339(),
            "location": name,
        })),
        Err(e) => failure(StatusCode::SERVICE_UNAVAILABLE, e.to_string()),
    }
}
