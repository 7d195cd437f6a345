use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use muezzin_core::config::AppConfig;
use muezzin_core::SettingsStore;
use muezzin_scheduler::SchedulerSupervisor;
use muezzin_timetable::NextEventResolver;

/// Central shared state — passed as Arc<AppState> to all Axum handlers.
pub struct AppState {
    pub config: AppConfig,
    pub settings: Arc<SettingsStore>,
    pub resolver: Arc<NextEventResolver>,
    pub supervisor: SchedulerSupervisor,
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route(
            "/scheduler/status",
            get(crate::http::scheduler::status_handler),
        )
        .route(
            "/scheduler/start",
            post(crate::http::scheduler::start_handler),
        )
        .route("/scheduler/stop", post(crate::http::scheduler::stop_handler))
        .route(
            "/scheduler/restart",
            post(crate::http::scheduler::restart_handler),
        )
        .route(
            "/settings",
            get(crate::http::settings::get_handler).patch(crate::http::settings::update_handler),
        )
        .route("/next", get(crate::http::next::next_handler))
        .layer(TraceLayer::new_for_http())
        // The web UI is served from a different origin in development.
        .layer(CorsLayer::permissive())
        .with_state(state)
}
