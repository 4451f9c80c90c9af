//! Field catalogue so setters, form labels and CLI lookups come from one schema.

use std::fmt;

use super::model::Settings;

/// Text conversion for settings values (CLI input, form rendering).
pub trait FieldValue: Sized {
    fn parse(raw: &str) -> Result<Self, String>;
    fn render(&self) -> String;
}

impl FieldValue for String {
    fn parse(raw: &str) -> Result<Self, String> {
        Ok(raw.to_string())
    }

    fn render(&self) -> String {
        self.clone()
    }
}

impl FieldValue for bool {
    fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "on" | "yes" | "1" => Ok(true),
            "false" | "off" | "no" | "0" => Ok(false),
            other => Err(format!("expected true/false, got {other:?}")),
        }
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

impl FieldValue for u32 {
    fn parse(raw: &str) -> Result<Self, String> {
        raw.trim()
            .parse()
            .map_err(|err| format!("expected a whole number of seconds/items: {err}"))
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

impl FieldValue for i32 {
    fn parse(raw: &str) -> Result<Self, String> {
        raw.trim()
            .parse()
            .map_err(|err| format!("expected an integer: {err}"))
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

impl FieldValue for f64 {
    fn parse(raw: &str) -> Result<Self, String> {
        let value: f64 = raw
            .trim()
            .parse()
            .map_err(|err| format!("expected a number: {err}"))?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(format!("expected a finite number, got {value}"))
        }
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

impl FieldValue for Vec<String> {
    fn parse(raw: &str) -> Result<Self, String> {
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(raw.split(',').map(|item| item.trim().to_string()).collect())
    }

    fn render(&self) -> String {
        self.join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    UnknownField(String),
    InvalidValue { field: &'static str, reason: String },
    /// Combat-script name and lines only change together, from a loaded file.
    ScriptFileOnly(&'static str),
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownField(key) => write!(f, "unknown settings field: {key}"),
            Self::InvalidValue { field, reason } => write!(f, "invalid value for {field}: {reason}"),
            Self::ScriptFileOnly(field) => {
                write!(f, "{field} is set by loading a combat script file, not edited directly")
            }
        }
    }
}

impl std::error::Error for FieldError {}

macro_rules! settings_fields {
    ($( $variant:ident($ty:ty) => $($path:ident).+, $key:literal, $label:literal; )+) => {
        /// Every settings field addressable by key.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum SettingsField {
            $( $variant, )+
        }

        /// A typed single-field replacement. Applying one is total: no validation.
        #[derive(Debug, Clone, PartialEq)]
        pub enum SettingsUpdate {
            $( $variant($ty), )+
        }

        impl SettingsField {
            pub const ALL: &'static [SettingsField] = &[ $( SettingsField::$variant, )+ ];

            /// Backend/settings-file key.
            #[must_use]
            pub fn key(self) -> &'static str {
                match self {
                    $( Self::$variant => $key, )+
                }
            }

            #[must_use]
            pub fn label(self) -> &'static str {
                match self {
                    $( Self::$variant => $label, )+
                }
            }

            #[must_use]
            pub fn render(self, settings: &Settings) -> String {
                match self {
                    $( Self::$variant => FieldValue::render(&settings.$($path).+), )+
                }
            }

            /// Snapshot the current value as an update that would restore it.
            #[must_use]
            pub fn current(self, settings: &Settings) -> SettingsUpdate {
                match self {
                    $( Self::$variant => SettingsUpdate::$variant(settings.$($path).+.clone()), )+
                }
            }

            pub fn parse_update(self, raw: &str) -> Result<SettingsUpdate, FieldError> {
                match self {
                    $(
                        Self::$variant => <$ty as FieldValue>::parse(raw)
                            .map(SettingsUpdate::$variant)
                            .map_err(|reason| FieldError::InvalidValue { field: $key, reason }),
                    )+
                }
            }
        }

        impl SettingsUpdate {
            #[must_use]
            pub fn field(&self) -> SettingsField {
                match self {
                    $( Self::$variant(_) => SettingsField::$variant, )+
                }
            }

            pub fn apply(self, settings: &mut Settings) {
                match self {
                    $( Self::$variant(value) => settings.$($path).+ = value, )+
                }
            }
        }
    };
}

settings_fields! {
    CombatScriptName(String) => combat_script_name, "combatScriptName", "Combat Script";
    CombatScript(Vec<String>) => combat_script, "combatScript", "Combat Script Lines";
    FarmingMode(String) => farming_mode, "farmingMode", "Farming Mode";
    Item(String) => item, "item", "Item";
    Mission(String) => mission, "mission", "Mission";
    Map(String) => map, "map", "Map";
    ItemAmount(u32) => item_amount, "itemAmount", "Item Amount";
    Summons(Vec<String>) => summons, "summons", "Support Summons";
    SummonElements(Vec<String>) => summon_elements, "summonElements", "Summon Elements";
    GroupNumber(i32) => group_number, "groupNumber", "Group #";
    PartyNumber(i32) => party_number, "partyNumber", "Party #";
    DebugMode(bool) => debug_mode, "debugMode", "Debug Mode";
    TwitterApiKey(String) => twitter.api_key, "twitterAPIKey", "API Key";
    TwitterApiKeySecret(String) => twitter.api_key_secret, "twitterAPIKeySecret", "API Key Secret";
    TwitterAccessToken(String) => twitter.access_token, "twitterAccessToken", "Access Token";
    TwitterAccessTokenSecret(String) => twitter.access_token_secret, "twitterAccessTokenSecret", "Access Token Secret";
    EnableDiscordNotifications(bool) => discord.enabled, "enableDiscordNotifications", "Enable Discord Notifications";
    DiscordToken(String) => discord.token, "discordToken", "Discord Token";
    DiscordUserId(String) => discord.user_id, "discordUserID", "User ID";
    EnableAutoRestore(bool) => enable_auto_restore, "enableAutoRestore", "Enable Auto-Restore";
    EnableFullElixir(bool) => enable_full_elixir, "enableFullElixir", "Enable Full Elixirs";
    EnableSoulBalm(bool) => enable_soul_balm, "enableSoulBalm", "Enable Soul Balms";
    EnableBezierCurveMouseMovement(bool) => enable_bezier_curve_mouse_movement, "enableBezierCurveMouseMovement", "Enable Bezier Curve Mouse Movement";
    MouseSpeed(f64) => mouse_speed, "mouseSpeed", "Mouse Speed (seconds)";
    EnableDelayBetweenRuns(bool) => enable_delay_between_runs, "enableDelayBetweenRuns", "Enable Delay Between Runs";
    DelayBetweenRuns(u32) => delay_between_runs, "delayBetweenRuns", "Delay In Seconds";
    EnableRandomizedDelayBetweenRuns(bool) => enable_randomized_delay_between_runs, "enableRandomizedDelayBetweenRuns", "Enable Randomized Delay Between Runs";
    DelayBetweenRunsLowerBound(u32) => delay_between_runs_lower_bound, "delayBetweenRunsLowerBound", "Delay In Seconds Lower Bound";
    DelayBetweenRunsUpperBound(u32) => delay_between_runs_upper_bound, "delayBetweenRunsUpperBound", "Delay In Seconds Upper Bound";
    EnableAutoExitRaid(bool) => enable_auto_exit_raid, "enableAutoExitRaid", "Enable Auto Exit Raid";
    TimeAllowedUntilAutoExitRaid(u32) => time_allowed_until_auto_exit_raid, "timeAllowedUntilAutoExitRaid", "Minutes Until Auto Exit Raid";
    EnableNoTimeout(bool) => enable_no_timeout, "enableNoTimeout", "Enable No Timeout";
    EnableNightmare(bool) => nightmare.enabled, "enableNightmare", "Enable Nightmare";
    EnableCustomNightmareSettings(bool) => nightmare.custom_settings, "enableCustomNightmareSettings", "Enable Custom Settings";
    NightmareCombatScriptName(String) => nightmare.combat_script_name, "nightmareCombatScriptName", "Nightmare Combat Script";
    NightmareCombatScript(Vec<String>) => nightmare.combat_script, "nightmareCombatScript", "Nightmare Combat Script Lines";
    NightmareSummons(Vec<String>) => nightmare.summons, "nightmareSummons", "Nightmare Support Summons";
    NightmareSummonElements(Vec<String>) => nightmare.summon_elements, "nightmareSummonElements", "Nightmare Summon Elements";
    NightmareGroupNumber(i32) => nightmare.group_number, "nightmareGroupNumber", "Group #";
    NightmarePartyNumber(i32) => nightmare.party_number, "nightmarePartyNumber", "Party #";
    EnableStopOnArcarumBoss(bool) => enable_stop_on_arcarum_boss, "enableStopOnArcarumBoss", "Stop On Arcarum Boss";
}

impl SettingsField {
    /// Look up a field by its settings-file key, ignoring ASCII case.
    pub fn from_key(key: &str) -> Result<Self, FieldError> {
        Self::ALL
            .iter()
            .copied()
            .find(|field| field.key().eq_ignore_ascii_case(key.trim()))
            .ok_or_else(|| FieldError::UnknownField(key.to_string()))
    }
}

impl fmt::Display for SettingsField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashSet;

    #[test]
    fn keys_are_unique_and_match_serialized_settings() {
        let keys: HashSet<&str> = SettingsField::ALL.iter().map(|f| f.key()).collect();
        assert_eq!(keys.len(), SettingsField::ALL.len());

        let json = serde_json::to_value(Settings::default()).expect("serialize");
        let object = json.as_object().expect("object");
        assert_eq!(object.len(), SettingsField::ALL.len());
        for key in keys {
            assert!(object.contains_key(key), "serialized settings missing {key}");
        }
    }

    #[test]
    fn from_key_ignores_case_and_rejects_unknown() {
        assert_eq!(
            SettingsField::from_key("discorduserid"),
            Ok(SettingsField::DiscordUserId)
        );
        assert_eq!(
            SettingsField::from_key("warpSpeed"),
            Err(FieldError::UnknownField("warpSpeed".to_string()))
        );
    }

    #[rstest]
    #[case("true", true)]
    #[case("ON", true)]
    #[case("yes", true)]
    #[case("1", true)]
    #[case("false", false)]
    #[case("off", false)]
    #[case("0", false)]
    fn bool_values_accept_common_spellings(#[case] raw: &str, #[case] expected: bool) {
        assert_eq!(bool::parse(raw), Ok(expected));
    }

    #[test]
    fn list_values_split_on_commas() {
        assert_eq!(
            Vec::<String>::parse("Bahamut, Lucifer ,Agni"),
            Ok(vec![
                "Bahamut".to_string(),
                "Lucifer".to_string(),
                "Agni".to_string()
            ])
        );
        assert_eq!(Vec::<String>::parse("  "), Ok(Vec::new()));
    }

    #[test]
    fn parse_update_reports_field_on_bad_value() {
        let err = SettingsField::MouseSpeed
            .parse_update("fast")
            .expect_err("non-numeric speed");
        assert!(matches!(err, FieldError::InvalidValue { field: "mouseSpeed", .. }));
        assert!(SettingsField::MouseSpeed.parse_update("NaN").is_err());
    }

    #[test]
    fn apply_writes_nested_fields() {
        let mut settings = Settings::default();
        SettingsUpdate::NightmarePartyNumber(5).apply(&mut settings);
        SettingsUpdate::TwitterAccessToken("tok".to_string()).apply(&mut settings);
        assert_eq!(settings.nightmare.party_number, 5);
        assert_eq!(settings.twitter.access_token, "tok");
        assert_eq!(SettingsField::NightmarePartyNumber.render(&settings), "5");
    }

    #[test]
    fn current_round_trips_through_apply() {
        let mut source = Settings::default();
        source.summons = vec!["Bahamut".to_string()];
        source.mouse_speed = 0.5;
        let mut target = Settings::default();
        for field in SettingsField::ALL {
            field.current(&source).apply(&mut target);
        }
        assert_eq!(source, target);
    }
}
