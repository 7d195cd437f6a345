//! Durable timetable cache.
//!
//! One JSON file per location under the cache directory, written only via
//! temp-file-then-rename so readers never observe a torn document. The cache
//! is the single writer of timetables; callers get owned snapshots.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Tz;
use muezzin_core::settings::Location;
use tracing::{info, warn};

use crate::error::FetchError;
use crate::source::TimetableFetcher;
use crate::types::{CachedTimetable, Timetable};

pub struct TimetableCache {
    dir: PathBuf,
    fetcher: Box<dyn TimetableFetcher>,
}

impl TimetableCache {
    pub fn new(dir: impl Into<PathBuf>, fetcher: Box<dyn TimetableFetcher>) -> Self {
        Self {
            dir: dir.into(),
            fetcher,
        }
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    fn load(&self, name: &str) -> Result<CachedTimetable, FetchError> {
        let raw = fs::read_to_string(self.file_path(name))?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Whether the persisted copy for `name` can still be trusted.
    ///
    /// Stale when: no (readable) cached copy exists, the freshness marker
    /// predates the current calendar month in `tz`, or the cached calendar
    /// has no entry for the current month (mid-month onboarding).
    pub fn is_stale(&self, name: &str, tz: Tz, now: DateTime<Tz>) -> bool {
        match self.load(name) {
            Ok(cached) => cached_is_stale(&cached, tz, now),
            Err(_) => true,
        }
    }

    /// The current timetable for `name`, refreshing first when stale.
    ///
    /// On refresh failure the previous copy keeps being served if one
    /// exists; with no cached copy at all the fetch error propagates.
    pub async fn current(
        &self,
        name: &str,
        location: &Location,
        tz: Tz,
        now: DateTime<Tz>,
    ) -> Result<Timetable, FetchError> {
        let cached = self.load(name).ok();

        if let Some(ref c) = cached {
            if !cached_is_stale(c, tz, now) {
                return Ok(c.timetable.clone());
            }
        }

        info!(location = name, "cached timetable stale or missing — refreshing");
        match self.fetcher.fetch(location).await {
            Ok(timetable) => {
                self.persist(name, &timetable, now.with_timezone(&Utc))?;
                Ok(timetable)
            }
            Err(e) => match cached {
                Some(previous) => {
                    warn!(location = name, error = %e, "refresh failed — serving stale cached timetable");
                    Ok(previous.timetable)
                }
                None => Err(e),
            },
        }
    }

    /// Atomic replace: the whole document lands or the old one survives.
    fn persist(
        &self,
        name: &str,
        timetable: &Timetable,
        fetched_at: DateTime<Utc>,
    ) -> Result<(), FetchError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.file_path(name);
        let tmp_path = path.with_extension("json.tmp");

        let document = CachedTimetable {
            fetched_at,
            timetable: timetable.clone(),
        };
        fs::write(&tmp_path, serde_json::to_vec_pretty(&document)?)?;
        if let Err(e) = fs::rename(&tmp_path, &path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        info!(location = name, path = %path.display(), "timetable persisted");
        Ok(())
    }
}

/// The month boundary rule: the marker's (year, month) in the active
/// timezone must match "now", and the calendar must actually contain the
/// current month.
fn cached_is_stale(cached: &CachedTimetable, tz: Tz, now: DateTime<Tz>) -> bool {
    let fetched = cached.fetched_at.with_timezone(&tz);
    if (fetched.year(), fetched.month()) < (now.year(), now.month()) {
        return true;
    }
    !cached.timetable.has_month(now.month())
}
