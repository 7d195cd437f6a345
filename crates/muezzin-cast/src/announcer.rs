use std::path::Path;
use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{error, info};

use crate::error::CastError;
use crate::transport::CastTransport;

/// Result of one device's playback attempt.
#[derive(Debug)]
pub struct DeviceOutcome {
    pub device: String,
    pub result: Result<(), CastError>,
}

impl DeviceOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Fans a single announcement out to every configured device concurrently.
///
/// Fire-and-forget from the scheduler's perspective: per-device failures are
/// logged here and reported back as outcomes, never as an error.
pub struct Announcer {
    transport: Arc<dyn CastTransport>,
}

impl Announcer {
    pub fn new(transport: Arc<dyn CastTransport>) -> Self {
        Self { transport }
    }

    /// Play `asset` on all `devices` at `volume`, one playback per device,
    /// all in parallel. Returns one outcome per device, in input order.
    pub async fn announce(
        &self,
        asset: &Path,
        devices: &[String],
        volume: f32,
    ) -> Vec<DeviceOutcome> {
        if devices.is_empty() {
            error!(asset = %asset.display(), "no devices configured — nothing to announce on");
            return Vec::new();
        }

        let plays = devices.iter().map(|device| {
            let transport = Arc::clone(&self.transport);
            async move {
                let result = transport.play(device, asset, volume).await;
                match &result {
                    Ok(()) => info!(device, asset = %asset.display(), "announcement played"),
                    Err(e) => error!(device, error = %e, "announcement failed"),
                }
                DeviceOutcome {
                    device: device.clone(),
                    result,
                }
            }
        });

        join_all(plays).await
    }
}
