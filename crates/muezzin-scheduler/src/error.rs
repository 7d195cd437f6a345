use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    /// `start` was called while a loop instance is still alive.
    #[error("Scheduler is already running")]
    AlreadyRunning,

    #[error("Settings error: {0}")]
    Settings(#[from] muezzin_core::CoreError),

    #[error("Resolution error: {0}")]
    Resolve(#[from] muezzin_timetable::ResolverError),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
