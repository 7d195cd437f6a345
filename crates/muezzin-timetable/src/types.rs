use std::collections::BTreeMap;

use chrono::{DateTime, NaiveTime, Utc};
use muezzin_core::Event;
use serde::{Deserialize, Serialize};

/// The six times of one calendar day as zero-padded `"HH:MM"` strings, in
/// canonical event order. Exactly six entries by construction: a raw day
/// with fewer is rejected at parse time and never becomes a `DayTimes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayTimes(pub [String; 6]);

impl DayTimes {
    /// The stored string for `event`.
    pub fn raw(&self, event: Event) -> &str {
        &self.0[event as usize]
    }

    /// Parse the stored time for `event`. `None` on a malformed entry;
    /// callers skip the event rather than fail the day.
    pub fn time_of(&self, event: Event) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(self.raw(event), "%H:%M").ok()
    }
}

/// The full calendar for one location: month number → day-of-month →
/// [`DayTimes`]. Replaced wholesale on refresh, never mutated in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timetable {
    pub months: BTreeMap<u32, BTreeMap<u32, DayTimes>>,
}

impl Timetable {
    pub fn day(&self, month: u32, day: u32) -> Option<&DayTimes> {
        self.months.get(&month)?.get(&day)
    }

    pub fn has_month(&self, month: u32) -> bool {
        self.months.contains_key(&month)
    }

    pub fn is_empty(&self) -> bool {
        self.months.values().all(|days| days.is_empty())
    }

    pub fn insert_day(&mut self, month: u32, day: u32, times: DayTimes) {
        self.months.entry(month).or_default().insert(day, times);
    }
}

/// Persisted form of a timetable: the calendar plus its freshness marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedTimetable {
    /// When this copy was fetched. The staleness check compares its
    /// calendar month (in the active timezone) against "now".
    pub fetched_at: DateTime<Utc>,
    pub timetable: Timetable,
}
