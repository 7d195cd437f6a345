//! Dynamic settings store — the validated get/set surface the scheduler and
//! gateway share.
//!
//! Settings live in a single JSON document on disk. Readers always load a
//! fresh snapshot (the scheduler re-reads every iteration, so an external
//! update takes effect on the next resolution). Writers go through
//! [`SettingsStore::update`], which validates the whole patched document
//! before anything touches the file, then replaces it atomically.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{CoreError, Result};
use crate::event::{EventSwitches, Switch};

/// How a remote timetable endpoint encodes its calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// JSON document keyed by month and day.
    Structured,
    /// HTML page with a `"calendar": [...]` block embedded in a script tag.
    EmbeddedHtml,
}

/// A configured remote timetable provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub url: String,
    pub kind: SourceKind,
}

/// Audio asset filenames, resolved against the configured media directory.
///
/// Not updatable through the settings store; the media updater in
/// [`crate::assets`] swaps file contents under these fixed names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assets {
    pub regular: String,
    pub fajr: String,
    pub short: String,
    pub duaa: String,
}

impl Default for Assets {
    fn default() -> Self {
        Self {
            regular: "Regular_Azan.mp3".to_string(),
            fajr: "Fajr_Azan.mp3".to_string(),
            short: "Short_Azan.mp3".to_string(),
            duaa: "Duaa.mp3".to_string(),
        }
    }
}

/// The full dynamic settings document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Key into `locations` naming the provider the scheduler follows.
    pub active_location: String,
    pub locations: BTreeMap<String, Location>,
    /// IANA timezone name; every timestamp the scheduler touches is in it.
    pub timezone: String,
    /// Base announcement switch per event.
    #[serde(default)]
    pub azan: EventSwitches,
    /// Use the short-form azan asset instead of the regular one.
    #[serde(default)]
    pub short_azan: EventSwitches,
    /// Play the duaa companion asset after the azan.
    #[serde(default)]
    pub duaa: EventSwitches,
    /// Global override: when On, the Isha announcement is suppressed
    /// entirely, regardless of its base switch.
    #[serde(default)]
    pub isha_gama: Switch,
    /// Playback volume, 0–100.
    pub volume: f32,
    /// Playback device identifiers the announcer fans out to.
    #[serde(default)]
    pub devices: Vec<String>,
    #[serde(default)]
    pub assets: Assets,
}

impl Default for Settings {
    fn default() -> Self {
        let mut locations = BTreeMap::new();
        locations.insert(
            "icci".to_string(),
            Location {
                url: "https://islamireland.ie/api/timetable/".to_string(),
                kind: SourceKind::Structured,
            },
        );
        locations.insert(
            "naas".to_string(),
            Location {
                url: "https://mawaqit.net/en/m/naas".to_string(),
                kind: SourceKind::EmbeddedHtml,
            },
        );

        let mut azan = EventSwitches::uniform(Switch::On);
        azan.sunrise = Switch::Off;

        Self {
            active_location: "icci".to_string(),
            locations,
            timezone: "Europe/Dublin".to_string(),
            azan,
            short_azan: EventSwitches::default(),
            duaa: EventSwitches::default(),
            isha_gama: Switch::Off,
            volume: 50.0,
            devices: Vec::new(),
            assets: Assets::default(),
        }
    }
}

impl Settings {
    /// Parse the configured timezone.
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| CoreError::InvalidSetting {
                field: "timezone",
                reason: format!("'{}' is not a valid IANA timezone", self.timezone),
            })
    }

    /// The active location entry.
    pub fn active(&self) -> Result<(&str, &Location)> {
        self.locations
            .get_key_value(self.active_location.as_str())
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| CoreError::InvalidSetting {
                field: "active_location",
                reason: format!("'{}' is not a configured location", self.active_location),
            })
    }

    /// Validate the whole document. Called on every update before anything
    /// is persisted, so the stored file is always in a valid state.
    pub fn validate(&self) -> Result<()> {
        if self.locations.is_empty() {
            return Err(CoreError::InvalidSetting {
                field: "locations",
                reason: "at least one location must be configured".to_string(),
            });
        }
        for (name, location) in &self.locations {
            if !is_http_url(&location.url) {
                return Err(CoreError::InvalidSetting {
                    field: "locations",
                    reason: format!("location '{name}' has an invalid url: '{}'", location.url),
                });
            }
        }
        self.active()?;
        self.tz()?;

        if !self.volume.is_finite() || !(0.0..=100.0).contains(&self.volume) {
            return Err(CoreError::InvalidSetting {
                field: "volume",
                reason: format!("{} is outside 0.0..=100.0", self.volume),
            });
        }
        if self.devices.iter().any(|d| d.trim().is_empty()) {
            return Err(CoreError::InvalidSetting {
                field: "devices",
                reason: "device identifiers must be non-empty".to_string(),
            });
        }
        for (field, value) in [
            ("assets.regular", &self.assets.regular),
            ("assets.fajr", &self.assets.fajr),
            ("assets.short", &self.assets.short),
            ("assets.duaa", &self.assets.duaa),
        ] {
            if value.trim().is_empty() {
                return Err(CoreError::InvalidSetting {
                    field: "assets",
                    reason: format!("{field} must be a non-empty filename"),
                });
            }
        }
        Ok(())
    }
}

fn is_http_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    matches!(rest, Some(host) if !host.is_empty())
}

/// A partial update. Absent fields keep their current value; asset filenames
/// are deliberately not patchable here (unknown fields are rejected).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsUpdate {
    pub active_location: Option<String>,
    pub locations: Option<BTreeMap<String, Location>>,
    pub timezone: Option<String>,
    pub azan: Option<EventSwitches>,
    pub short_azan: Option<EventSwitches>,
    pub duaa: Option<EventSwitches>,
    pub isha_gama: Option<Switch>,
    pub volume: Option<f32>,
    pub devices: Option<Vec<String>>,
}

/// File-backed settings store.
///
/// Single writer by convention (the gateway's settings handler); readers get
/// owned snapshots and never observe a half-written document thanks to the
/// temp-file-then-rename replacement.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the default document if none exists yet.
    pub fn init(&self) -> Result<Settings> {
        if self.path.exists() {
            return self.load();
        }
        let settings = Settings::default();
        self.save(&settings)?;
        info!(path = %self.path.display(), "settings file created with defaults");
        Ok(settings)
    }

    /// Load a fresh snapshot from disk.
    pub fn load(&self) -> Result<Settings> {
        let raw = fs::read_to_string(&self.path)?;
        let settings: Settings = serde_json::from_str(&raw)?;
        Ok(settings)
    }

    /// Apply a partial update: validate the patched document as a whole, then
    /// replace the file atomically. A rejected update writes nothing.
    pub fn update(&self, update: SettingsUpdate) -> Result<Settings> {
        let mut settings = self.load()?;

        if let Some(v) = update.active_location {
            settings.active_location = v;
        }
        if let Some(v) = update.locations {
            settings.locations = v;
        }
        if let Some(v) = update.timezone {
            settings.timezone = v;
        }
        if let Some(v) = update.azan {
            settings.azan = v;
        }
        if let Some(v) = update.short_azan {
            settings.short_azan = v;
        }
        if let Some(v) = update.duaa {
            settings.duaa = v;
        }
        if let Some(v) = update.isha_gama {
            settings.isha_gama = v;
        }
        if let Some(v) = update.volume {
            settings.volume = v;
        }
        if let Some(v) = update.devices {
            settings.devices = v;
        }

        settings.validate()?;
        self.save(&settings)?;
        info!(path = %self.path.display(), "settings updated");
        Ok(settings)
    }

    /// Atomic replace: temp file + rename so a crash mid-write never leaves a
    /// torn document behind.
    fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, serde_json::to_vec_pretty(settings)?)?;
        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;

    fn store_in(dir: &tempfile::TempDir) -> SettingsStore {
        SettingsStore::new(dir.path().join("settings.json"))
    }

    #[test]
    fn init_writes_defaults_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let written = store.init().unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded.active_location, written.active_location);
        assert_eq!(loaded.timezone, "Europe/Dublin");
        assert!(loaded.azan.get(Event::Fajr).is_on());
        assert!(!loaded.azan.get(Event::Sunrise).is_on());
        // No temp remnant after the atomic write.
        assert!(!dir.path().join("settings.json.tmp").exists());
    }

    #[test]
    fn update_applies_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.init().unwrap();

        let updated = store
            .update(SettingsUpdate {
                volume: Some(80.0),
                devices: Some(vec!["livingroom".to_string()]),
                ..SettingsUpdate::default()
            })
            .unwrap();
        assert_eq!(updated.volume, 80.0);

        let loaded = store.load().unwrap();
        assert_eq!(loaded.volume, 80.0);
        assert_eq!(loaded.devices, vec!["livingroom".to_string()]);
    }

    #[test]
    fn invalid_update_is_rejected_without_touching_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.init().unwrap();
        let before = store.load().unwrap();

        for bad in [
            SettingsUpdate {
                volume: Some(150.0),
                ..SettingsUpdate::default()
            },
            SettingsUpdate {
                timezone: Some("Mars/Olympus_Mons".to_string()),
                ..SettingsUpdate::default()
            },
            SettingsUpdate {
                active_location: Some("nowhere".to_string()),
                ..SettingsUpdate::default()
            },
            SettingsUpdate {
                devices: Some(vec!["".to_string()]),
                ..SettingsUpdate::default()
            },
        ] {
            let err = store.update(bad).unwrap_err();
            assert!(matches!(err, CoreError::InvalidSetting { .. }), "{err}");
        }

        let after = store.load().unwrap();
        assert_eq!(after.volume, before.volume);
        assert_eq!(after.timezone, before.timezone);
    }

    #[test]
    fn asset_filenames_are_not_patchable() {
        let err = serde_json::from_str::<SettingsUpdate>(
            r#"{"assets":{"regular":"evil.mp3","fajr":"a","short":"b","duaa":"c"}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown field"));
    }

    #[test]
    fn location_urls_are_validated() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.init().unwrap();

        let mut locations = BTreeMap::new();
        locations.insert(
            "icci".to_string(),
            Location {
                url: "ftp://not-a-web-endpoint".to_string(),
                kind: SourceKind::Structured,
            },
        );
        let err = store
            .update(SettingsUpdate {
                locations: Some(locations),
                ..SettingsUpdate::default()
            })
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidSetting {
                field: "locations",
                ..
            }
        ));
    }
}
