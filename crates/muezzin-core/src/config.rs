use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_BIND: &str = "127.0.0.1";

/// Static process configuration (muezzin.toml + MUEZZIN_* env overrides).
///
/// Everything that changes at runtime (locations, switches, volume, devices)
/// lives in the dynamic settings store instead; see [`crate::settings`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub cast: CastConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            paths: PathsConfig::default(),
            cast: CastConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Dynamic settings document.
    #[serde(default = "default_settings_path")]
    pub settings: String,
    /// Directory holding one cached timetable file per location.
    #[serde(default = "default_cache_dir")]
    pub cache: String,
    /// Directory holding the azan / duaa audio assets.
    #[serde(default = "default_media_dir")]
    pub media: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            settings: default_settings_path(),
            cache: default_cache_dir(),
            media: default_media_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastConfig {
    /// Playback helper binary, invoked as `<player> <device> <asset> <volume>`.
    #[serde(default = "default_player")]
    pub player: String,
}

impl Default for CastConfig {
    fn default() -> Self {
        Self {
            player: default_player(),
        }
    }
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_settings_path() -> String {
    "config/settings.json".to_string()
}
fn default_cache_dir() -> String {
    "cache".to_string()
}
fn default_media_dir() -> String {
    "media".to_string()
}
fn default_player() -> String {
    "atvremote".to_string()
}

impl AppConfig {
    /// Load config from a TOML file with MUEZZIN_* env var overrides.
    ///
    /// When `config_path` is `None`, `muezzin.toml` in the working directory
    /// is used; a missing file just means every default applies.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path.unwrap_or("muezzin.toml");

        let config: AppConfig = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("MUEZZIN_").split("_"))
            .extract()
            .map_err(|e| crate::error::CoreError::Config(e.to_string()))?;

        Ok(config)
    }
}
