//! Remote timetable acquisition.
//!
//! Two provider shapes are supported, mirroring the two kinds of endpoint a
//! location can point at:
//!
//! | Kind           | Body                                                       |
//! |----------------|------------------------------------------------------------|
//! | `Structured`   | JSON `{"timetable": {"<month>": {"<day>": [[h,m], …]}}}`   |
//! | `EmbeddedHtml` | HTML page embedding `"calendar": [{…} × 12]` in a script   |
//!
//! Both normalise into the same [`Timetable`]: zero-padded `HH:MM` strings,
//! days with fewer than six entries dropped with a logged per-day error.

use std::collections::BTreeMap;
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use muezzin_core::settings::{Location, SourceKind};
use regex::Regex;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::error::FetchError;
use crate::types::{DayTimes, Timetable};

/// Transient network failures are retried this many times in total.
const FETCH_ATTEMPTS: u32 = 3;
/// Fixed delay between attempts.
const RETRY_DELAY: Duration = Duration::from_secs(2);
/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches and parses the raw remote timetable for one location.
///
/// Object-safe so the cache can be handed a stub in tests.
#[async_trait]
pub trait TimetableFetcher: Send + Sync {
    async fn fetch(&self, location: &Location) -> Result<Timetable, FetchError>;
}

/// Production fetcher over a shared HTTP client.
pub struct HttpSource {
    http: reqwest::Client,
}

impl HttpSource {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    async fn download(&self, url: &str) -> Result<String, reqwest::Error> {
        let response = self
            .http
            .get(url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;
        response.text().await
    }
}

impl Default for HttpSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TimetableFetcher for HttpSource {
    async fn fetch(&self, location: &Location) -> Result<Timetable, FetchError> {
        for attempt in 1..FETCH_ATTEMPTS {
            match self.download(&location.url).await {
                Ok(body) => {
                    let timetable = parse_body(&body, location.kind)?;
                    info!(url = %location.url, "timetable downloaded");
                    return Ok(timetable);
                }
                Err(e) => {
                    warn!(attempt, url = %location.url, error = %e, "timetable download failed — retrying");
                    tokio::time::sleep(RETRY_DELAY).await;
                }
            }
        }

        let body = self.download(&location.url).await.map_err(|e| {
            error!(url = %location.url, error = %e, "timetable download failed after {FETCH_ATTEMPTS} attempts");
            FetchError::Network(e)
        })?;
        let timetable = parse_body(&body, location.kind)?;
        info!(url = %location.url, "timetable downloaded");
        Ok(timetable)
    }
}

/// Parse a raw response body according to the location's source kind.
pub fn parse_body(body: &str, kind: SourceKind) -> Result<Timetable, FetchError> {
    match kind {
        SourceKind::Structured => parse_structured(body),
        SourceKind::EmbeddedHtml => parse_embedded(body),
    }
}

#[derive(Deserialize)]
struct StructuredDocument {
    timetable: BTreeMap<String, BTreeMap<String, Vec<Vec<u32>>>>,
}

fn parse_structured(body: &str) -> Result<Timetable, FetchError> {
    let doc: StructuredDocument = serde_json::from_str(body)
        .map_err(|e| FetchError::Parse(format!("structured document: {e}")))?;

    let mut timetable = Timetable::default();
    for (month_key, days) in doc.timetable {
        let month = match month_key.parse::<u32>() {
            Ok(m) if (1..=12).contains(&m) => m,
            _ => {
                warn!(month = %month_key, "unrecognised month key — skipped");
                continue;
            }
        };
        for (day_key, entries) in days {
            let Ok(day) = day_key.parse::<u32>() else {
                warn!(month, day = %day_key, "unrecognised day key — skipped");
                continue;
            };
            match normalize_pairs(&entries) {
                Some(times) => timetable.insert_day(month, day, times),
                None => error!(month, day, "invalid prayer data — day skipped"),
            }
        }
    }

    if timetable.is_empty() {
        return Err(FetchError::Parse(
            "structured document contained no usable days".to_string(),
        ));
    }
    Ok(timetable)
}

/// Normalise `[[h, m], …]` into six zero-padded `HH:MM` strings. `None` when
/// the day has fewer than six entries or any entry is out of range.
fn normalize_pairs(entries: &[Vec<u32>]) -> Option<DayTimes> {
    if entries.len() < 6 {
        return None;
    }
    let mut out: [String; 6] = Default::default();
    for (slot, entry) in out.iter_mut().zip(entries) {
        let hour = *entry.first()?;
        let minute = *entry.get(1)?;
        if hour > 23 || minute > 59 {
            return None;
        }
        *slot = format!("{hour:02}:{minute:02}");
    }
    Some(DayTimes(out))
}

static CALENDAR_RE: OnceLock<Regex> = OnceLock::new();

fn calendar_re() -> &'static Regex {
    CALENDAR_RE.get_or_init(|| {
        Regex::new(r#"(?s)"calendar"\s*:\s*(\[\{.*?\}\])"#).expect("calendar regex is valid")
    })
}

fn parse_embedded(body: &str) -> Result<Timetable, FetchError> {
    let captures = calendar_re().captures(body).ok_or_else(|| {
        FetchError::Parse("calendar block not found in page".to_string())
    })?;

    let months: Vec<BTreeMap<String, Vec<String>>> = serde_json::from_str(&captures[1])
        .map_err(|e| FetchError::Parse(format!("embedded calendar: {e}")))?;

    let mut timetable = Timetable::default();
    for (index, days) in months.iter().enumerate() {
        // Calendar entries are positional: index 0 is January.
        let month = index as u32 + 1;
        if month > 12 {
            warn!(month, "embedded calendar has more than 12 months — extra entries ignored");
            break;
        }
        for (day_key, times) in days {
            let Ok(day) = day_key.parse::<u32>() else {
                warn!(month, day = %day_key, "unrecognised day key — skipped");
                continue;
            };
            match normalize_strings(times) {
                Some(parsed) => timetable.insert_day(month, day, parsed),
                None => error!(month, day, "invalid prayer data — day skipped"),
            }
        }
    }

    if timetable.is_empty() {
        return Err(FetchError::Parse(
            "embedded calendar contained no usable days".to_string(),
        ));
    }
    Ok(timetable)
}

/// Normalise `"H:MM"` / `"HH:MM"` strings into six zero-padded `HH:MM`
/// entries. `None` when the day is short or any entry fails to parse.
fn normalize_strings(times: &[String]) -> Option<DayTimes> {
    if times.len() < 6 {
        return None;
    }
    let mut out: [String; 6] = Default::default();
    for (slot, raw) in out.iter_mut().zip(times) {
        let (h, m) = raw.split_once(':')?;
        let hour: u32 = h.trim().parse().ok()?;
        let minute: u32 = m.trim().parse().ok()?;
        if hour > 23 || minute > 59 {
            return None;
        }
        *slot = format!("{hour:02}:{minute:02}");
    }
    Some(DayTimes(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use muezzin_core::Event;

    #[test]
    fn structured_document_parses_and_normalizes() {
        let body = r#"{
            "timetable": {
                "3": {
                    "1": [[5, 7], [6, 45], [12, 30], [15, 40], [18, 20], [19, 50]],
                    "2": [[5, 5], [6, 43], [12, 30], [15, 41], [18, 22], [19, 52], [21, 0]]
                }
            }
        }"#;
        let timetable = parse_structured(body).unwrap();

        let day = timetable.day(3, 1).unwrap();
        assert_eq!(day.raw(Event::Fajr), "05:07");
        assert_eq!(day.raw(Event::Isha), "19:50");
        // Extra entries beyond six are ignored.
        assert_eq!(timetable.day(3, 2).unwrap().raw(Event::Isha), "19:52");
    }

    #[test]
    fn short_day_is_dropped_but_siblings_survive() {
        let body = r#"{
            "timetable": {
                "3": {
                    "1": [[5, 7], [6, 45], [12, 30], [15, 40], [18, 20], [19, 50]],
                    "2": [[5, 5], [6, 43], [12, 30]]
                }
            }
        }"#;
        let timetable = parse_structured(body).unwrap();
        assert!(timetable.day(3, 1).is_some());
        assert!(timetable.day(3, 2).is_none());
    }

    #[test]
    fn structured_document_with_no_usable_days_is_a_parse_error() {
        let body = r#"{"timetable": {"3": {"1": [[5, 7]]}}}"#;
        assert!(matches!(
            parse_structured(body),
            Err(FetchError::Parse(_))
        ));
    }

    #[test]
    fn embedded_calendar_is_extracted_from_page() {
        let body = concat!(
            "<html><head><script>var conf = {\"name\":\"mosque\",",
            "\"calendar\": [{\"1\": [\"5:29\", \"7:43\", \"13:25\", \"15:30\", \"17:05\", \"19:01\"]},",
            "{\"1\": [\"5:10\", \"7:20\", \"13:25\", \"15:45\", \"17:30\", \"19:20\"]}]",
            "};</script></head><body></body></html>",
        );
        let timetable = parse_embedded(body).unwrap();
        assert_eq!(timetable.day(1, 1).unwrap().raw(Event::Fajr), "05:29");
        assert_eq!(timetable.day(2, 1).unwrap().raw(Event::Maghrib), "17:30");
    }

    #[test]
    fn page_without_calendar_block_is_a_parse_error() {
        let err = parse_embedded("<html><body>maintenance</body></html>").unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[test]
    fn out_of_range_times_reject_the_day() {
        assert!(normalize_strings(&[
            "25:00".into(),
            "06:45".into(),
            "12:30".into(),
            "15:40".into(),
            "18:20".into(),
            "19:50".into(),
        ])
        .is_none());
        assert!(normalize_pairs(&[
            vec![5, 61],
            vec![6, 45],
            vec![12, 30],
            vec![15, 40],
            vec![18, 20],
            vec![19, 50],
        ])
        .is_none());
    }
}
