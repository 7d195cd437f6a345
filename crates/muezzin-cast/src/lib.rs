//! `muezzin-cast` — the device-casting capability.
//!
//! [`Announcer`] fans one audio announcement out to every configured device
//! concurrently; each device's playback goes through the [`CastTransport`]
//! trait, keeping the actual wire protocol out of this crate. The shipped
//! [`PlayerCommandTransport`] delegates to an operator-configured helper
//! binary.

pub mod announcer;
pub mod error;
pub mod transport;

pub use announcer::{Announcer, DeviceOutcome};
pub use error::{CastError, Result};
pub use transport::{CastTransport, PlayerCommandTransport};
