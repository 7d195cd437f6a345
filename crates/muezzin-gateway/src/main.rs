use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info};

use muezzin_cast::{Announcer, PlayerCommandTransport};
use muezzin_core::config::AppConfig;
use muezzin_core::SettingsStore;
use muezzin_scheduler::SchedulerSupervisor;
use muezzin_timetable::{HttpSource, NextEventResolver, TimetableCache};

mod app;
mod http;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "muezzin_gateway=info,muezzin_scheduler=info,muezzin_timetable=info,muezzin_cast=info,muezzin_core=info".into()
            }),
        )
        .init();

    // load config: explicit MUEZZIN_CONFIG path > ./muezzin.toml > defaults
    let config_path = std::env::var("MUEZZIN_CONFIG").ok();
    let config = AppConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default()
    });

    let settings = Arc::new(SettingsStore::new(&config.paths.settings));
    settings.init()?;
    info!(path = %settings.path().display(), "settings store ready");

    let resolver = Arc::new(NextEventResolver::new(TimetableCache::new(
        &config.paths.cache,
        Box::new(HttpSource::new()),
    )));
    let announcer = Arc::new(Announcer::new(Arc::new(PlayerCommandTransport::new(
        config.cast.player.clone(),
    ))));
    let supervisor = SchedulerSupervisor::new(
        Arc::clone(&settings),
        Arc::clone(&resolver),
        announcer,
        PathBuf::from(&config.paths.media),
    );

    let bind = config.gateway.bind.clone();
    let port = config.gateway.port;

    let state = Arc::new(app::AppState {
        config,
        settings,
        resolver,
        supervisor,
    });

    // The scheduler runs from boot; the HTTP surface can stop/restart it.
    if let Err(e) = state.supervisor.start().await {
        error!(error = %e, "scheduler failed to start");
    }

    let router = app::build_router(Arc::clone(&state));
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    info!("muezzin gateway listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    // signal the scheduler loop to stop and wait for it
    state.supervisor.stop().await;
    Ok(())
}
