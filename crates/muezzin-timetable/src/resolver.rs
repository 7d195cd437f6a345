//! Next-event resolution.
//!
//! Given "now" in the active timezone, pick the next announceable event:
//! today's earliest enabled time strictly after now, otherwise tomorrow's
//! first enabled time. Every comparison carries an explicit UTC offset;
//! the resolver never works in naive local time.

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone};
use chrono_tz::Tz;
use muezzin_core::settings::Location;
use muezzin_core::{Event, EventSwitches};
use serde::Serialize;
use tracing::{error, warn};

use crate::cache::TimetableCache;
use crate::error::ResolverError;
use crate::types::DayTimes;

/// One upcoming event. Consumed once by the scheduler loop and discarded;
/// the next iteration resolves afresh against the then-current calendar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedEvent {
    pub event: Event,
    pub at: DateTime<Tz>,
}

pub struct NextEventResolver {
    cache: TimetableCache,
}

impl NextEventResolver {
    pub fn new(cache: TimetableCache) -> Self {
        Self { cache }
    }

    /// Resolve the next event for `location` strictly after `now`.
    ///
    /// The cache refreshes itself first when stale. A day absent from the
    /// calendar even after that refresh opportunity is `DataMissing`; the
    /// caller backs off and retries rather than treating it as fatal.
    pub async fn resolve_next(
        &self,
        now: DateTime<Tz>,
        name: &str,
        location: &Location,
        switches: &EventSwitches,
    ) -> Result<ResolvedEvent, ResolverError> {
        let tz = now.timezone();
        let timetable = self.cache.current(name, location, tz, now).await?;

        let today = now.date_naive();
        let today_times = timetable
            .day(today.month(), today.day())
            .ok_or(ResolverError::DataMissing { date: today })?;

        if let Some(found) = next_after(today_times, today, now, switches, tz) {
            return Ok(found);
        }

        // Nothing enabled remains today — take tomorrow's first event.
        let tomorrow = today + Days::new(1);
        let tomorrow_times = timetable
            .day(tomorrow.month(), tomorrow.day())
            .ok_or(ResolverError::DataMissing { date: tomorrow })?;

        first_of_day(tomorrow_times, tomorrow, switches, tz)
            .ok_or(ResolverError::DataMissing { date: tomorrow })
    }
}

/// All announceable, switched-on events of `date`, in canonical order.
fn candidates(
    times: &DayTimes,
    date: NaiveDate,
    switches: &EventSwitches,
    tz: Tz,
) -> Vec<ResolvedEvent> {
    let mut out = Vec::new();
    for event in Event::ALL {
        if !event.is_announceable() || !switches.get(event).is_on() {
            continue;
        }
        let Some(time) = times.time_of(event) else {
            error!(%event, %date, raw = times.raw(event), "invalid time entry — event skipped");
            continue;
        };
        // earliest() resolves DST-ambiguous wall times; a wall time inside a
        // DST gap does not exist on this date and is skipped.
        match tz.from_local_datetime(&date.and_time(time)).earliest() {
            Some(at) => out.push(ResolvedEvent { event, at }),
            None => warn!(%event, %date, "wall time does not exist in this timezone — event skipped"),
        }
    }
    out
}

/// Earliest candidate strictly after `now`. Canonical declaration order
/// breaks the (by construction impossible) tie of two equal times.
fn next_after(
    times: &DayTimes,
    date: NaiveDate,
    now: DateTime<Tz>,
    switches: &EventSwitches,
    tz: Tz,
) -> Option<ResolvedEvent> {
    earliest(
        candidates(times, date, switches, tz)
            .into_iter()
            .filter(|c| c.at > now),
    )
}

/// Earliest candidate of the day, regardless of `now`.
fn first_of_day(
    times: &DayTimes,
    date: NaiveDate,
    switches: &EventSwitches,
    tz: Tz,
) -> Option<ResolvedEvent> {
    earliest(candidates(times, date, switches, tz))
}

/// Strictly-earlier comparison, so on equal timestamps the first candidate
/// in canonical order is kept.
fn earliest(candidates: impl IntoIterator<Item = ResolvedEvent>) -> Option<ResolvedEvent> {
    let mut best: Option<ResolvedEvent> = None;
    for candidate in candidates {
        match best {
            Some(ref b) if candidate.at >= b.at => {}
            _ => best = Some(candidate),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use muezzin_core::Switch;

    fn dublin() -> Tz {
        "Europe/Dublin".parse().unwrap()
    }

    fn sample_times() -> DayTimes {
        DayTimes([
            "05:10".into(),
            "06:45".into(),
            "12:30".into(),
            "15:40".into(),
            "18:20".into(),
            "19:50".into(),
        ])
    }

    fn all_on() -> EventSwitches {
        EventSwitches::uniform(Switch::On)
    }

    #[test]
    fn sunrise_never_becomes_a_candidate() {
        let tz = dublin();
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let found = candidates(&sample_times(), date, &all_on(), tz);
        assert!(found.iter().all(|c| c.event != Event::Sunrise));
        assert_eq!(found.len(), 5);
    }

    #[test]
    fn next_after_picks_the_earliest_strictly_later_event() {
        let tz = dublin();
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let now = tz.with_ymd_and_hms(2026, 3, 14, 14, 0, 0).unwrap();

        let next = next_after(&sample_times(), date, now, &all_on(), tz).unwrap();
        assert_eq!(next.event, Event::Asr);
        assert_eq!(next.at, tz.with_ymd_and_hms(2026, 3, 14, 15, 40, 0).unwrap());
    }

    #[test]
    fn an_event_exactly_at_now_is_not_next() {
        let tz = dublin();
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let now = tz.with_ymd_and_hms(2026, 3, 14, 15, 40, 0).unwrap();

        let next = next_after(&sample_times(), date, now, &all_on(), tz).unwrap();
        assert_eq!(next.event, Event::Maghrib);
    }

    #[test]
    fn disabled_events_are_skipped() {
        let tz = dublin();
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let now = tz.with_ymd_and_hms(2026, 3, 14, 14, 0, 0).unwrap();

        let mut switches = all_on();
        switches.asr = Switch::Off;
        let next = next_after(&sample_times(), date, now, &switches, tz).unwrap();
        assert_eq!(next.event, Event::Maghrib);
    }

    #[test]
    fn malformed_entry_is_skipped_not_fatal() {
        let tz = dublin();
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let now = tz.with_ymd_and_hms(2026, 3, 14, 14, 0, 0).unwrap();

        let mut times = sample_times();
        times.0[3] = "15:xx".into();
        let next = next_after(&times, date, now, &all_on(), tz).unwrap();
        assert_eq!(next.event, Event::Maghrib);
    }

    #[test]
    fn first_of_day_ignores_now() {
        let tz = dublin();
        let date = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        let first = first_of_day(&sample_times(), date, &all_on(), tz).unwrap();
        assert_eq!(first.event, Event::Fajr);
        assert_eq!(first.at, tz.with_ymd_and_hms(2026, 3, 15, 5, 10, 0).unwrap());
    }
}
