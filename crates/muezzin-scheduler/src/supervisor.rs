//! Scheduler lifecycle supervisor.
//!
//! Owns the single running loop instance and exposes the start / stop /
//! status / restart surface. `stop` awaits the task after signalling, so a
//! restart can never have two loops alive against the same cache.

use std::path::PathBuf;
use std::sync::Arc;

use muezzin_cast::Announcer;
use muezzin_core::SettingsStore;
use muezzin_timetable::NextEventResolver;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::engine::SchedulerEngine;
use crate::error::{Result, SchedulerError};

struct LoopHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

pub struct SchedulerSupervisor {
    settings: Arc<SettingsStore>,
    resolver: Arc<NextEventResolver>,
    announcer: Arc<Announcer>,
    media_dir: PathBuf,
    running: Mutex<Option<LoopHandle>>,
}

impl SchedulerSupervisor {
    pub fn new(
        settings: Arc<SettingsStore>,
        resolver: Arc<NextEventResolver>,
        announcer: Arc<Announcer>,
        media_dir: PathBuf,
    ) -> Self {
        Self {
            settings,
            resolver,
            announcer,
            media_dir,
            running: Mutex::new(None),
        }
    }

    /// Spawn a fresh loop. Errors when one is already alive.
    pub async fn start(&self) -> Result<()> {
        let mut running = self.running.lock().await;
        if running.as_ref().is_some_and(|h| !h.task.is_finished()) {
            warn!("scheduler start requested but a loop is already running");
            return Err(SchedulerError::AlreadyRunning);
        }

        let engine = SchedulerEngine::new(
            Arc::clone(&self.settings),
            Arc::clone(&self.resolver),
            Arc::clone(&self.announcer),
            self.media_dir.clone(),
        );
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(engine.run(shutdown_rx));
        *running = Some(LoopHandle {
            shutdown: shutdown_tx,
            task,
        });
        info!("scheduler started");
        Ok(())
    }

    /// Signal the loop and wait for it to finish. Idempotent: stopping a
    /// stopped scheduler is a no-op, mirroring the operational surface.
    pub async fn stop(&self) {
        let mut running = self.running.lock().await;
        let Some(handle) = running.take() else {
            info!("scheduler stop requested but no loop is running");
            return;
        };

        let _ = handle.shutdown.send(true);
        if let Err(e) = handle.task.await {
            error!(error = %e, "scheduler task ended abnormally during stop");
        }
        info!("scheduler stopped");
    }

    /// Whether a loop instance is currently alive.
    pub async fn is_running(&self) -> bool {
        let running = self.running.lock().await;
        running.as_ref().is_some_and(|h| !h.task.is_finished())
    }

    /// Stop (awaiting full cancellation), then start a fresh instance.
    /// Settings handlers call this so updates apply on the next resolution.
    pub async fn restart(&self) -> Result<()> {
        info!("restarting scheduler");
        self.stop().await;
        self.start().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use muezzin_cast::{CastError, CastTransport};
    use muezzin_core::Location;
    use muezzin_timetable::{FetchError, Timetable, TimetableCache, TimetableFetcher};
    use std::path::Path;
    use std::time::Duration;

    struct SilentTransport;

    #[async_trait]
    impl CastTransport for SilentTransport {
        async fn play(
            &self,
            _device: &str,
            _asset: &Path,
            _volume: f32,
        ) -> std::result::Result<(), CastError> {
            Ok(())
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl TimetableFetcher for FailingFetcher {
        async fn fetch(
            &self,
            _location: &Location,
        ) -> std::result::Result<Timetable, FetchError> {
            Err(FetchError::Parse("no remote in tests".to_string()))
        }
    }

    fn supervisor_in(dir: &tempfile::TempDir) -> SchedulerSupervisor {
        let settings = Arc::new(SettingsStore::new(dir.path().join("settings.json")));
        settings.init().unwrap();
        let resolver = Arc::new(NextEventResolver::new(TimetableCache::new(
            dir.path().join("cache"),
            Box::new(FailingFetcher),
        )));
        let announcer = Arc::new(Announcer::new(Arc::new(SilentTransport)));
        SchedulerSupervisor::new(settings, resolver, announcer, dir.path().join("media"))
    }

    #[tokio::test]
    async fn lifecycle_start_status_stop() {
        let dir = tempfile::tempdir().unwrap();
        let supervisor = supervisor_in(&dir);

        assert!(!supervisor.is_running().await);
        supervisor.start().await.unwrap();
        assert!(supervisor.is_running().await);

        // stop must complete promptly even though the loop sits in its
        // 60 s resolution backoff.
        tokio::time::timeout(Duration::from_secs(5), supervisor.stop())
            .await
            .expect("stop did not complete");
        assert!(!supervisor.is_running().await);
    }

    #[tokio::test]
    async fn double_start_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let supervisor = supervisor_in(&dir);

        supervisor.start().await.unwrap();
        assert!(matches!(
            supervisor.start().await,
            Err(SchedulerError::AlreadyRunning)
        ));
        supervisor.stop().await;
    }

    #[tokio::test]
    async fn stop_when_not_running_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let supervisor = supervisor_in(&dir);
        supervisor.stop().await;
        assert!(!supervisor.is_running().await);
    }

    #[tokio::test]
    async fn restart_yields_a_fresh_running_loop() {
        let dir = tempfile::tempdir().unwrap();
        let supervisor = supervisor_in(&dir);

        supervisor.start().await.unwrap();
        tokio::time::timeout(Duration::from_secs(5), supervisor.restart())
            .await
            .expect("restart did not complete")
            .unwrap();
        assert!(supervisor.is_running().await);
        supervisor.stop().await;
    }
}
