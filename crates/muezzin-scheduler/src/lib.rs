//! `muezzin-scheduler` — announcement policy and the long-lived scheduling
//! loop.
//!
//! # Overview
//!
//! [`engine::SchedulerEngine`] drives the cycle: resolve the next event,
//! sleep until it is due (cancellably), announce per [`policy::decide`],
//! repeat. [`supervisor::SchedulerSupervisor`] owns the one running loop
//! and exposes start / stop / status / restart to the gateway.

pub mod engine;
pub mod error;
pub mod policy;
pub mod supervisor;

pub use engine::SchedulerEngine;
pub use error::{Result, SchedulerError};
pub use policy::{decide, Announcement, AzanVariant};
pub use supervisor::SchedulerSupervisor;
