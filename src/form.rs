//! Extra-settings form layout: which sections and fields are visible for the
//! current settings, plus a plain-text rendering used by `gbf-settings show`.

use std::fmt::Write as _;

use crate::nightmare::{self, FarmingMode};
use crate::settings::rules::field_warnings;
use crate::settings::{Settings, SettingsField};

const NONE_SELECTED: &str = "None Selected";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormSection {
    Nightmare,
    Twitter,
    Discord,
    Refill,
    Configuration,
}

impl FormSection {
    pub const ALL: &'static [FormSection] = &[
        Self::Nightmare,
        Self::Twitter,
        Self::Discord,
        Self::Refill,
        Self::Configuration,
    ];

    #[must_use]
    pub fn title(self, settings: &Settings) -> String {
        match self {
            Self::Nightmare => format!("{} Settings", nightmare_title(settings)),
            Self::Twitter => "Twitter Settings".to_string(),
            Self::Discord => "Discord Settings".to_string(),
            Self::Refill => "AP/EP Refill Settings".to_string(),
            Self::Configuration => "Configuration Settings".to_string(),
        }
    }
}

fn nightmare_title(settings: &Settings) -> &'static str {
    nightmare::section_title(FarmingMode::from_label(&settings.farming_mode))
}

#[must_use]
pub fn visible_sections(settings: &Settings) -> Vec<FormSection> {
    FormSection::ALL
        .iter()
        .copied()
        .filter(|section| *section != FormSection::Nightmare || settings.nightmare.enabled)
        .collect()
}

#[must_use]
pub fn section_fields(section: FormSection, settings: &Settings) -> Vec<SettingsField> {
    use SettingsField as F;

    match section {
        FormSection::Nightmare => {
            let mut fields = vec![F::EnableCustomNightmareSettings];
            if settings.nightmare.custom_settings {
                fields.push(F::NightmareCombatScriptName);
                if nightmare::summon_selection_enabled(FarmingMode::from_label(
                    &settings.farming_mode,
                )) {
                    fields.extend([F::NightmareSummons, F::NightmareSummonElements]);
                }
                fields.extend([F::NightmareGroupNumber, F::NightmarePartyNumber]);
            }
            fields
        }
        FormSection::Twitter => vec![
            F::TwitterApiKey,
            F::TwitterApiKeySecret,
            F::TwitterAccessToken,
            F::TwitterAccessTokenSecret,
        ],
        FormSection::Discord => vec![F::EnableDiscordNotifications, F::DiscordToken, F::DiscordUserId],
        FormSection::Refill => vec![F::EnableAutoRestore, F::EnableFullElixir, F::EnableSoulBalm],
        FormSection::Configuration => {
            let fixed = settings.enable_delay_between_runs;
            let randomized = settings.enable_randomized_delay_between_runs;
            let mut fields = vec![
                F::DebugMode,
                F::EnableBezierCurveMouseMovement,
                F::MouseSpeed,
                F::EnableDelayBetweenRuns,
            ];
            if fixed && !randomized {
                fields.push(F::DelayBetweenRuns);
            }
            fields.push(F::EnableRandomizedDelayBetweenRuns);
            if randomized && !fixed {
                fields.extend([F::DelayBetweenRunsLowerBound, F::DelayBetweenRunsUpperBound]);
            }
            fields.push(F::EnableAutoExitRaid);
            if settings.enable_auto_exit_raid {
                fields.push(F::TimeAllowedUntilAutoExitRaid);
            }
            fields.extend([F::EnableNoTimeout, F::EnableStopOnArcarumBoss]);
            fields
        }
    }
}

fn field_label(field: SettingsField, settings: &Settings) -> String {
    match field {
        SettingsField::EnableCustomNightmareSettings => {
            format!("Enable Custom Settings for {}", nightmare_title(settings))
        }
        other => other.label().to_string(),
    }
}

fn field_display(field: SettingsField, settings: &Settings) -> String {
    match field {
        SettingsField::NightmareCombatScriptName if settings.nightmare.combat_script_name.is_empty() => {
            NONE_SELECTED.to_string()
        }
        other => other.render(settings),
    }
}

/// Plain-text form: a heading per visible section, then `label: value` rows.
/// Fields with a range warning get a leading `!` and the allowed range.
#[must_use]
pub fn render_form(settings: &Settings) -> String {
    let warnings = field_warnings(settings);
    let mut out = String::new();

    let script_name = if settings.combat_script_name.is_empty() {
        NONE_SELECTED
    } else {
        settings.combat_script_name.as_str()
    };
    let _ = writeln!(out, "Combat Script: {script_name}");
    let _ = writeln!(out, "Farming Mode: {}", settings.farming_mode);

    for section in visible_sections(settings) {
        let _ = writeln!(out, "\n== {} ==", section.title(settings));
        for field in section_fields(section, settings) {
            let warning = warnings.iter().find(|warning| warning.field == field);
            let marker = if warning.is_some() { "!" } else { " " };
            let _ = write!(
                out,
                "{marker} {}: {}",
                field_label(field, settings),
                field_display(field, settings)
            );
            if let Some(warning) = warning {
                let _ = write!(
                    out,
                    " (from {} to {})",
                    warning.allowed.start(),
                    warning.allowed.end()
                );
            }
            out.push('\n');
        }
        if section == FormSection::Nightmare {
            let profile = nightmare::effective_profile(settings);
            let script = if profile.combat_script_name.is_empty() {
                NONE_SELECTED
            } else {
                profile.combat_script_name
            };
            let _ = writeln!(
                out,
                "  Runs with {} settings: {script}, Group #{}, Party #{}",
                if profile.is_custom { "custom" } else { "main" },
                profile.group_number,
                profile.party_number
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn nightmare_section_only_when_enabled() {
        let mut settings = Settings::default();
        assert!(!visible_sections(&settings).contains(&FormSection::Nightmare));
        settings.nightmare.enabled = true;
        assert_eq!(visible_sections(&settings).first(), Some(&FormSection::Nightmare));
        assert_eq!(visible_sections(&settings).len(), FormSection::ALL.len());
    }

    #[rstest]
    #[case(false, false, false, false)]
    #[case(true, false, true, false)]
    #[case(false, true, false, true)]
    #[case(true, true, false, false)]
    fn delay_fields_follow_toggles(
        #[case] fixed: bool,
        #[case] randomized: bool,
        #[case] shows_fixed: bool,
        #[case] shows_bounds: bool,
    ) {
        let settings = Settings {
            enable_delay_between_runs: fixed,
            enable_randomized_delay_between_runs: randomized,
            ..Settings::default()
        };
        let fields = section_fields(FormSection::Configuration, &settings);
        assert_eq!(fields.contains(&SettingsField::DelayBetweenRuns), shows_fixed);
        assert_eq!(
            fields.contains(&SettingsField::DelayBetweenRunsLowerBound),
            shows_bounds
        );
        assert_eq!(
            fields.contains(&SettingsField::DelayBetweenRunsUpperBound),
            shows_bounds
        );
    }

    #[test]
    fn nightmare_custom_fields_need_custom_toggle() {
        let mut settings = Settings::default();
        settings.nightmare.enabled = true;
        settings.farming_mode = "Special".to_string();
        assert_eq!(
            section_fields(FormSection::Nightmare, &settings),
            vec![SettingsField::EnableCustomNightmareSettings]
        );

        settings.nightmare.custom_settings = true;
        let fields = section_fields(FormSection::Nightmare, &settings);
        assert!(fields.contains(&SettingsField::NightmareSummons));
        assert!(fields.contains(&SettingsField::NightmareGroupNumber));
    }

    #[test]
    fn arcarum_hides_nightmare_summon_picker() {
        let mut settings = Settings::default();
        settings.nightmare.enabled = true;
        settings.nightmare.custom_settings = true;
        settings.farming_mode = "Arcarum".to_string();
        let fields = section_fields(FormSection::Nightmare, &settings);
        assert!(!fields.contains(&SettingsField::NightmareSummons));
        assert!(fields.contains(&SettingsField::NightmarePartyNumber));
    }

    #[test]
    fn render_marks_empty_script_and_warnings() {
        let mut settings = Settings::default();
        settings.nightmare.enabled = true;
        settings.nightmare.custom_settings = true;
        settings.nightmare.group_number = 9;
        settings.farming_mode = "Rise of the Beasts".to_string();

        let text = render_form(&settings);
        assert!(text.contains("Combat Script: None Selected"));
        assert!(text.contains("== Extreme+ Settings =="));
        assert!(text.contains("Enable Custom Settings for Extreme+: true"));
        assert!(text.contains("Nightmare Combat Script: None Selected"));
        assert!(text.contains("! Group #: 9 (from 1 to 7)"));
        assert!(text.contains("== Twitter Settings =="));
        assert!(text.contains("Runs with custom settings: None Selected, Group #9, Party #1"));
    }

    #[test]
    fn nightmare_without_custom_settings_runs_with_main_profile() {
        let mut settings = Settings::default();
        settings.nightmare.enabled = true;
        settings.farming_mode = "Special".to_string();
        settings.combat_script_name = "Full Auto.txt".to_string();
        settings.combat_script = vec!["attack".to_string()];
        settings.group_number = 3;
        settings.party_number = 2;

        let text = render_form(&settings);
        assert!(text.contains("Runs with main settings: Full Auto.txt, Group #3, Party #2"));
    }
}
