//! Announcement policy — which asset(s) a resolved event plays, if any.
//!
//! Pure: everything is decided from the event name and the current settings
//! snapshot. Precedence, highest first:
//!
//! 1. Sunrise never announces (ordering-only event).
//! 2. The Isha suppression override (`isha_gama` On) disables Isha
//!    regardless of its base switch.
//! 3. The per-event base switch gates everything else.
//! 4. Variant: short-form switch beats the dawn asset beats the regular one.

use muezzin_core::settings::Assets;
use muezzin_core::{Event, Settings};

/// Which azan recording to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AzanVariant {
    Short,
    Dawn,
    Regular,
}

/// A positive announcement decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Announcement {
    pub variant: AzanVariant,
    /// Play the duaa companion asset after the azan.
    pub with_duaa: bool,
}

impl Announcement {
    pub fn asset_file<'a>(&self, assets: &'a Assets) -> &'a str {
        match self.variant {
            AzanVariant::Short => &assets.short,
            AzanVariant::Dawn => &assets.fajr,
            AzanVariant::Regular => &assets.regular,
        }
    }

    pub fn companion_file<'a>(&self, assets: &'a Assets) -> Option<&'a str> {
        self.with_duaa.then_some(assets.duaa.as_str())
    }
}

/// Decide what (if anything) to play for `event`. `None` means stay silent.
pub fn decide(event: Event, settings: &Settings) -> Option<Announcement> {
    if !event.is_announceable() {
        return None;
    }
    if event == Event::Isha && settings.isha_gama.is_on() {
        return None;
    }
    if !settings.azan.get(event).is_on() {
        return None;
    }

    let variant = if settings.short_azan.get(event).is_on() {
        AzanVariant::Short
    } else if event == Event::Fajr {
        AzanVariant::Dawn
    } else {
        AzanVariant::Regular
    };

    Some(Announcement {
        variant,
        with_duaa: settings.duaa.get(event).is_on(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use muezzin_core::{EventSwitches, Switch};

    fn settings_all_on() -> Settings {
        Settings {
            azan: EventSwitches::uniform(Switch::On),
            ..Settings::default()
        }
    }

    #[test]
    fn base_switch_gates_the_announcement() {
        let mut settings = settings_all_on();
        assert!(decide(Event::Dhuhr, &settings).is_some());

        settings.azan.dhuhr = Switch::Off;
        assert!(decide(Event::Dhuhr, &settings).is_none());
    }

    #[test]
    fn isha_override_beats_the_base_switch() {
        let mut settings = settings_all_on();
        assert!(settings.azan.isha.is_on());

        settings.isha_gama = Switch::On;
        assert!(decide(Event::Isha, &settings).is_none());
        // Only Isha is affected.
        assert!(decide(Event::Maghrib, &settings).is_some());
    }

    #[test]
    fn sunrise_is_silent_even_when_switched_on() {
        let settings = settings_all_on();
        assert!(settings.azan.get(Event::Sunrise).is_on());
        assert!(decide(Event::Sunrise, &settings).is_none());
    }

    #[test]
    fn fajr_uses_the_dawn_asset() {
        let settings = settings_all_on();
        let plan = decide(Event::Fajr, &settings).unwrap();
        assert_eq!(plan.variant, AzanVariant::Dawn);
        assert_eq!(plan.asset_file(&settings.assets), settings.assets.fajr);
    }

    #[test]
    fn short_form_beats_the_dawn_asset() {
        let mut settings = settings_all_on();
        settings.short_azan.fajr = Switch::On;
        let plan = decide(Event::Fajr, &settings).unwrap();
        assert_eq!(plan.variant, AzanVariant::Short);
    }

    #[test]
    fn other_events_use_the_regular_asset() {
        let settings = settings_all_on();
        let plan = decide(Event::Asr, &settings).unwrap();
        assert_eq!(plan.variant, AzanVariant::Regular);
        assert!(plan.companion_file(&settings.assets).is_none());
    }

    #[test]
    fn duaa_switch_attaches_the_companion() {
        let mut settings = settings_all_on();
        settings.duaa.maghrib = Switch::On;
        let plan = decide(Event::Maghrib, &settings).unwrap();
        assert_eq!(
            plan.companion_file(&settings.assets),
            Some(settings.assets.duaa.as_str())
        );
    }

    #[test]
    fn decision_is_deterministic() {
        let settings = settings_all_on();
        assert_eq!(decide(Event::Asr, &settings), decide(Event::Asr, &settings));
    }
}
