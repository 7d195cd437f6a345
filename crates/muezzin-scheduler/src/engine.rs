//! The scheduler loop: resolve the next event, sleep until it is due,
//! announce, repeat. Runs as a single cooperative task until the shutdown
//! watch flips; both sleeps (the wait-until-due sleep and the error backoff)
//! are cancellable so a restart never waits out a multi-hour timer.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use muezzin_cast::Announcer;
use muezzin_core::{Event, Settings, SettingsStore};
use muezzin_timetable::{NextEventResolver, ResolvedEvent};
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::error::Result;
use crate::policy;

/// Backoff before re-resolving after a failed resolution.
const RESOLVE_RETRY_DELAY: Duration = Duration::from_secs(60);

pub struct SchedulerEngine {
    settings: Arc<SettingsStore>,
    resolver: Arc<NextEventResolver>,
    announcer: Arc<Announcer>,
    media_dir: PathBuf,
}

impl SchedulerEngine {
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
        }
    }

    /// Main loop. Returns only after `shutdown` broadcasts `true`; data and
    /// playback errors are logged and retried, never fatal.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!("azan scheduler loop started");
        loop {
            if *shutdown.borrow() {
                break;
            }

            let resolved = match self.resolve().await {
                Ok(resolved) => resolved,
                Err(e) => {
                    warn!(error = %e, delay_secs = RESOLVE_RETRY_DELAY.as_secs(), "resolution failed — backing off");
                    if !sleep_or_shutdown(&mut shutdown, RESOLVE_RETRY_DELAY).await {
                        break;
                    }
                    continue;
                }
            };

            // Waiting: never sleep a non-positive duration.
            let now = Utc::now().with_timezone(&resolved.at.timezone());
            let wait = resolved.at.signed_duration_since(now);
            if wait <= chrono::Duration::zero() {
                warn!(event = %resolved.event, at = %resolved.at, "resolved event is not in the future — re-resolving");
                continue;
            }
            let Ok(wait) = wait.to_std() else {
                continue;
            };

            info!(
                event = %resolved.event,
                at = %resolved.at,
                wait_secs = wait.as_secs(),
                "next event resolved — waiting"
            );
            if !sleep_or_shutdown(&mut shutdown, wait).await {
                break;
            }

            self.announce(resolved.event).await;
        }
        info!("azan scheduler loop stopped");
    }

    /// One resolution pass against a fresh settings snapshot.
    async fn resolve(&self) -> Result<ResolvedEvent> {
        let settings = self.settings.load()?;
        let tz = settings.tz()?;
        let (name, location) = settings.active()?;
        let now = Utc::now().with_timezone(&tz);
        Ok(self
            .resolver
            .resolve_next(now, name, location, &settings.azan)
            .await?)
    }

    /// Announce `event` per the current policy. Every failure in here is
    /// logged and swallowed; the loop always proceeds to the next event.
    async fn announce(&self, event: Event) {
        // Settings are re-read at fire time: a switch flipped during the
        // long wait takes effect on this very announcement.
        let settings = match self.settings.load() {
            Ok(settings) => settings,
            Err(e) => {
                error!(%event, error = %e, "cannot load settings — announcement skipped");
                return;
            }
        };

        let Some(plan) = policy::decide(event, &settings) else {
            info!(%event, "announcement disabled in settings — staying silent");
            return;
        };

        self.play(&settings, plan.asset_file(&settings.assets), event)
            .await;
        if let Some(companion) = plan.companion_file(&settings.assets) {
            self.play(&settings, companion, event).await;
        }
    }

    async fn play(&self, settings: &Settings, asset_file: &str, event: Event) {
        let asset = self.media_dir.join(asset_file);
        info!(%event, asset = %asset.display(), "announcing");
        let outcomes = self
            .announcer
            .announce(&asset, &settings.devices, settings.volume)
            .await;
        let failed = outcomes.iter().filter(|o| !o.succeeded()).count();
        if failed > 0 {
            warn!(%event, failed, total = outcomes.len(), "some devices did not play the announcement");
        }
    }
}

/// Cancellable sleep: false when shutdown fired before the timer.
async fn sleep_or_shutdown(shutdown: &mut watch::Receiver<bool>, duration: Duration) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(duration) => true,
        changed = shutdown.changed() => match changed {
            Ok(()) => !*shutdown.borrow(),
            // Supervisor dropped the sender: treat as shutdown.
            Err(_) => false,
        },
    }
}
