use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command as AsyncCommand;
use tracing::debug;

use crate::error::{CastError, Result};

/// Per-device playback seam.
///
/// The wire protocol to reach a device lives entirely behind this trait;
/// implementations must be `Send + Sync` so one transport instance can fan
/// out to many devices concurrently.
#[async_trait]
pub trait CastTransport: Send + Sync {
    /// Play `asset` on `device` at `volume` (0–100), returning once playback
    /// has finished or failed.
    async fn play(&self, device: &str, asset: &Path, volume: f32) -> Result<()>;
}

/// Shells out to an operator-configured player helper, invoked as
/// `<player> <device> <asset> <volume>`.
pub struct PlayerCommandTransport {
    player: String,
}

impl PlayerCommandTransport {
    pub fn new(player: impl Into<String>) -> Self {
        Self {
            player: player.into(),
        }
    }
}

#[async_trait]
impl CastTransport for PlayerCommandTransport {
    async fn play(&self, device: &str, asset: &Path, volume: f32) -> Result<()> {
        debug!(player = %self.player, device, asset = %asset.display(), "spawning player");
        let output = AsyncCommand::new(&self.player)
            .arg(device)
            .arg(asset)
            .arg(format!("{volume}"))
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CastError::Playback {
                device: device.to_string(),
                detail: format!("exit {}: {}", output.status, stderr.trim()),
            });
        }
        Ok(())
    }
}
