//! Nightmare / boss-variant profile helpers keyed off the selected farming mode.

use std::fmt;

use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FarmingMode {
    Quest,
    Special,
    Coop,
    Raid,
    Event,
    EventTokenDrawboxes,
    RiseOfTheBeasts,
    GuildWars,
    DreadBarrage,
    ProvingGrounds,
    XenoClash,
    Arcarum,
    Generic,
}

impl FarmingMode {
    pub const ALL: &'static [FarmingMode] = &[
        Self::Quest,
        Self::Special,
        Self::Coop,
        Self::Raid,
        Self::Event,
        Self::EventTokenDrawboxes,
        Self::RiseOfTheBeasts,
        Self::GuildWars,
        Self::DreadBarrage,
        Self::ProvingGrounds,
        Self::XenoClash,
        Self::Arcarum,
        Self::Generic,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Quest => "Quest",
            Self::Special => "Special",
            Self::Coop => "Coop",
            Self::Raid => "Raid",
            Self::Event => "Event",
            Self::EventTokenDrawboxes => "Event (Token Drawboxes)",
            Self::RiseOfTheBeasts => "Rise of the Beasts",
            Self::GuildWars => "Guild Wars",
            Self::DreadBarrage => "Dread Barrage",
            Self::ProvingGrounds => "Proving Grounds",
            Self::XenoClash => "Xeno Clash",
            Self::Arcarum => "Arcarum",
            Self::Generic => "Generic",
        }
    }

    /// Exact label match, as stored in the settings file.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|mode| mode.label() == label)
    }
}

impl fmt::Display for FarmingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Heading for the nightmare section, named after the mode's boss variant.
#[must_use]
pub fn section_title(mode: Option<FarmingMode>) -> &'static str {
    match mode {
        Some(FarmingMode::Special) => "Dimensional Halo",
        Some(FarmingMode::Event | FarmingMode::EventTokenDrawboxes | FarmingMode::XenoClash) => {
            "Nightmare"
        }
        Some(FarmingMode::RiseOfTheBeasts) => "Extreme+",
        _ => "Unknown",
    }
}

/// Coop and Arcarum pick no support summon, so the picker is disabled there.
#[must_use]
pub fn summon_selection_enabled(mode: Option<FarmingMode>) -> bool {
    !matches!(mode, Some(FarmingMode::Coop | FarmingMode::Arcarum))
}

/// Run parameters the backend will actually use for the nightmare fight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunProfile<'a> {
    pub combat_script_name: &'a str,
    pub combat_script: &'a [String],
    pub summons: &'a [String],
    pub summon_elements: &'a [String],
    pub group_number: i32,
    pub party_number: i32,
    pub is_custom: bool,
}

/// Nightmare overrides when customised, otherwise the parent farming-mode values.
#[must_use]
pub fn effective_profile(settings: &Settings) -> RunProfile<'_> {
    let nightmare = &settings.nightmare;
    if nightmare.enabled && nightmare.custom_settings {
        RunProfile {
            combat_script_name: &nightmare.combat_script_name,
            combat_script: &nightmare.combat_script,
            summons: &nightmare.summons,
            summon_elements: &nightmare.summon_elements,
            group_number: nightmare.group_number,
            party_number: nightmare.party_number,
            is_custom: true,
        }
    } else {
        RunProfile {
            combat_script_name: &settings.combat_script_name,
            combat_script: &settings.combat_script,
            summons: &settings.summons,
            summon_elements: &settings.summon_elements,
            group_number: settings.group_number,
            party_number: settings.party_number,
            is_custom: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Special", "Dimensional Halo")]
    #[case("Event", "Nightmare")]
    #[case("Event (Token Drawboxes)", "Nightmare")]
    #[case("Xeno Clash", "Nightmare")]
    #[case("Rise of the Beasts", "Extreme+")]
    #[case("Raid", "Unknown")]
    #[case("", "Unknown")]
    fn titles_follow_farming_mode(#[case] label: &str, #[case] title: &str) {
        assert_eq!(section_title(FarmingMode::from_label(label)), title);
    }

    #[test]
    fn summon_picker_disabled_for_coop_and_arcarum() {
        assert!(!summon_selection_enabled(Some(FarmingMode::Coop)));
        assert!(!summon_selection_enabled(Some(FarmingMode::Arcarum)));
        assert!(summon_selection_enabled(Some(FarmingMode::Special)));
        assert!(summon_selection_enabled(None));
    }

    #[test]
    fn labels_round_trip() {
        for mode in FarmingMode::ALL {
            assert_eq!(FarmingMode::from_label(mode.label()), Some(*mode));
        }
    }

    fn settings_with_nightmare(enabled: bool, custom: bool) -> Settings {
        let mut settings = Settings::default();
        settings.summons = vec!["Bahamut".to_string()];
        settings.group_number = 2;
        settings.nightmare.enabled = enabled;
        settings.nightmare.custom_settings = custom;
        settings.nightmare.summons = vec!["Lucifer".to_string()];
        settings.nightmare.group_number = 6;
        settings
    }

    #[test]
    fn custom_nightmare_settings_override_parent() {
        let settings = settings_with_nightmare(true, true);
        let profile = effective_profile(&settings);
        assert!(profile.is_custom);
        assert_eq!(profile.summons, ["Lucifer".to_string()]);
        assert_eq!(profile.group_number, 6);
    }

    #[rstest]
    #[case(false, false)]
    #[case(true, false)]
    #[case(false, true)]
    fn parent_profile_reused_without_custom_settings(#[case] enabled: bool, #[case] custom: bool) {
        let settings = settings_with_nightmare(enabled, custom);
        let profile = effective_profile(&settings);
        assert!(!profile.is_custom);
        assert_eq!(profile.summons, ["Bahamut".to_string()]);
        assert_eq!(profile.group_number, 2);
    }
}
