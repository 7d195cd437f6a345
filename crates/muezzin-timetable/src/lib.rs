//! `muezzin-timetable` — prayer timetable acquisition, caching, and
//! next-event resolution.
//!
//! # Overview
//!
//! [`source::HttpSource`] fetches a location's remote calendar (structured
//! JSON or an HTML page with an embedded calendar block) and normalises it
//! into a [`Timetable`]. [`cache::TimetableCache`] persists the result as
//! durable JSON, one file per location, refreshing when the copy goes stale
//! (new month, or the month is simply absent). [`resolver::NextEventResolver`]
//! turns "now" plus the cached calendar into the single next announceable
//! event, advancing to tomorrow when today is exhausted.

pub mod cache;
pub mod error;
pub mod resolver;
pub mod source;
pub mod types;

pub use cache::TimetableCache;
pub use error::{FetchError, ResolverError};
pub use resolver::{NextEventResolver, ResolvedEvent};
pub use source::{HttpSource, TimetableFetcher};
pub use types::{CachedTimetable, DayTimes, Timetable};
