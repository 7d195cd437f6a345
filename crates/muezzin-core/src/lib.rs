//! `muezzin-core` — shared domain types, static configuration, and the
//! validated dynamic settings store.
//!
//! # Overview
//!
//! | Module     | Contents                                              |
//! |------------|-------------------------------------------------------|
//! | `event`    | The six daily events, switches, switch sets           |
//! | `config`   | Static `AppConfig` (muezzin.toml + MUEZZIN_* env)     |
//! | `settings` | Dynamic validated settings document + file store      |
//! | `assets`   | Media asset replacement with backup                   |

pub mod assets;
pub mod config;
pub mod error;
pub mod event;
pub mod settings;

pub use error::{CoreError, Result};
pub use event::{Event, EventSwitches, Switch};
pub use settings::{Location, Settings, SettingsStore, SettingsUpdate, SourceKind};
