//! HTTP handlers. Every response uses the `{"status": "success"|"error"}`
//! envelope the operational clients expect.

pub mod health;
pub mod next;
pub mod scheduler;
pub mod settings;

use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

pub(crate) fn success(data: Value) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({"status": "success", "data": data})),
    )
}

pub(crate) fn failure(code: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (
        code,
        Json(json!({"status": "error", "message": message.into()})),
    )
}
