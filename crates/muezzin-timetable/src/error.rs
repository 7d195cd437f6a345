use chrono::NaiveDate;
use thiserror::Error;

/// Errors from remote timetable acquisition and cache persistence.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network/timeout failure with all retry attempts exhausted.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response did not contain the expected calendar structure.
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from next-event resolution.
///
/// Running out of events today is *not* an error; the resolver silently
/// advances to tomorrow. `DataMissing` means the calendar genuinely lacks
/// the needed day even after a refresh opportunity; callers back off and
/// retry rather than crash.
#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("No calendar data for {date}")]
    DataMissing { date: NaiveDate },

    #[error("Timetable unavailable: {0}")]
    Fetch(#[from] FetchError),
}
