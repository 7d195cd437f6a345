use serde::{Deserialize, Serialize};

/// The six fixed daily markers, in canonical order.
///
/// `Sunrise` is the solar-reference marker: it bounds the ordering of the
/// day and appears in every calendar, but it is never announced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Event {
    Fajr,
    Sunrise,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl Event {
    /// All events in canonical order. The index into this array is also the
    /// index into a day's six stored times.
    pub const ALL: [Event; 6] = [
        Event::Fajr,
        Event::Sunrise,
        Event::Dhuhr,
        Event::Asr,
        Event::Maghrib,
        Event::Isha,
    ];

    /// Whether this event may ever trigger an announcement.
    ///
    /// Sunrise is ordering-only and always returns false here.
    pub fn is_announceable(self) -> bool {
        !matches!(self, Event::Sunrise)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Event::Fajr => "Fajr",
            Event::Sunrise => "Sunrise",
            Event::Dhuhr => "Dhuhr",
            Event::Asr => "Asr",
            Event::Maghrib => "Maghrib",
            Event::Isha => "Isha",
        }
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Event {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Fajr" => Ok(Event::Fajr),
            "Sunrise" => Ok(Event::Sunrise),
            "Dhuhr" => Ok(Event::Dhuhr),
            "Asr" => Ok(Event::Asr),
            "Maghrib" => Ok(Event::Maghrib),
            "Isha" => Ok(Event::Isha),
            other => Err(format!("unknown event: {other}")),
        }
    }
}

/// A single configuration toggle, stored as `"On"` / `"Off"` so the settings
/// document stays hand-editable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Switch {
    On,
    #[default]
    Off,
}

impl Switch {
    pub fn is_on(self) -> bool {
        matches!(self, Switch::On)
    }
}

/// One switch per event. Missing keys deserialize as `Off`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSwitches {
    #[serde(rename = "Fajr", default)]
    pub fajr: Switch,
    #[serde(rename = "Sunrise", default)]
    pub sunrise: Switch,
    #[serde(rename = "Dhuhr", default)]
    pub dhuhr: Switch,
    #[serde(rename = "Asr", default)]
    pub asr: Switch,
    #[serde(rename = "Maghrib", default)]
    pub maghrib: Switch,
    #[serde(rename = "Isha", default)]
    pub isha: Switch,
}

impl EventSwitches {
    /// Every event set to the same position.
    pub fn uniform(switch: Switch) -> Self {
        Self {
            fajr: switch,
            sunrise: switch,
            dhuhr: switch,
            asr: switch,
            maghrib: switch,
            isha: switch,
        }
    }

    pub fn get(&self, event: Event) -> Switch {
        match event {
            Event::Fajr => self.fajr,
            Event::Sunrise => self.sunrise,
            Event::Dhuhr => self.dhuhr,
            Event::Asr => self.asr,
            Event::Maghrib => self.maghrib,
            Event::Isha => self.isha,
        }
    }
}

impl Default for EventSwitches {
    fn default() -> Self {
        Self::uniform(Switch::Off)
    }
}
