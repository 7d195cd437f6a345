use thiserror::Error;

/// Errors from the casting capability. Always logged, never propagated into
/// the scheduler loop.
#[derive(Debug, Error)]
pub enum CastError {
    /// The player process could not be started at all.
    #[error("Failed to spawn player: {0}")]
    Spawn(#[from] std::io::Error),

    /// The player ran but reported a playback failure.
    #[error("Playback failed on '{device}': {detail}")]
    Playback { device: String, detail: String },
}

pub type Result<T> = std::result::Result<T, CastError>;
