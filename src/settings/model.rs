//! The settings aggregate shared by every view and handed to the backend.
//!
//! Field names serialize in the backend's camelCase shape. Credential and nightmare
//! groups are nested Rust structs flattened into the same JSON object.

use serde::{Deserialize, Serialize};

pub const DEFAULT_MOUSE_SPEED_SECS: f64 = 0.2;
pub const DEFAULT_DELAY_BETWEEN_RUNS_SECS: u32 = 15;
pub const DEFAULT_DELAY_LOWER_BOUND_SECS: u32 = 15;
pub const DEFAULT_DELAY_UPPER_BOUND_SECS: u32 = 60;
pub const DEFAULT_AUTO_EXIT_RAID_MINUTES: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    // Game run parameters.
    pub combat_script_name: String,
    pub combat_script: Vec<String>,
    pub farming_mode: String,
    pub item: String,
    pub mission: String,
    pub map: String,
    pub item_amount: u32,
    pub summons: Vec<String>,
    pub summon_elements: Vec<String>,
    pub group_number: i32,
    pub party_number: i32,
    pub debug_mode: bool,

    #[serde(flatten)]
    pub twitter: TwitterCredentials,
    #[serde(flatten)]
    pub discord: DiscordSettings,

    // Refill.
    pub enable_auto_restore: bool,
    pub enable_full_elixir: bool,
    pub enable_soul_balm: bool,

    // Mouse and timing.
    pub enable_bezier_curve_mouse_movement: bool,
    pub mouse_speed: f64,
    pub enable_delay_between_runs: bool,
    pub delay_between_runs: u32,
    pub enable_randomized_delay_between_runs: bool,
    pub delay_between_runs_lower_bound: u32,
    pub delay_between_runs_upper_bound: u32,
    pub enable_auto_exit_raid: bool,
    pub time_allowed_until_auto_exit_raid: u32,
    pub enable_no_timeout: bool,

    #[serde(flatten)]
    pub nightmare: NightmareSettings,

    pub enable_stop_on_arcarum_boss: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            combat_script_name: String::new(),
            combat_script: Vec::new(),
            farming_mode: String::new(),
            item: String::new(),
            mission: String::new(),
            map: String::new(),
            item_amount: 1,
            summons: Vec::new(),
            summon_elements: Vec::new(),
            group_number: 1,
            party_number: 1,
            debug_mode: false,
            twitter: TwitterCredentials::default(),
            discord: DiscordSettings::default(),
            enable_auto_restore: true,
            enable_full_elixir: false,
            enable_soul_balm: false,
            enable_bezier_curve_mouse_movement: true,
            mouse_speed: DEFAULT_MOUSE_SPEED_SECS,
            enable_delay_between_runs: false,
            delay_between_runs: DEFAULT_DELAY_BETWEEN_RUNS_SECS,
            enable_randomized_delay_between_runs: false,
            delay_between_runs_lower_bound: DEFAULT_DELAY_LOWER_BOUND_SECS,
            delay_between_runs_upper_bound: DEFAULT_DELAY_UPPER_BOUND_SECS,
            enable_auto_exit_raid: false,
            time_allowed_until_auto_exit_raid: DEFAULT_AUTO_EXIT_RAID_MINUTES,
            enable_no_timeout: false,
            nightmare: NightmareSettings::default(),
            enable_stop_on_arcarum_boss: true,
        }
    }
}

/// Twitter API keys the backend uses to scan for raid codes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwitterCredentials {
    #[serde(rename = "twitterAPIKey")]
    pub api_key: String,
    #[serde(rename = "twitterAPIKeySecret")]
    pub api_key_secret: String,
    #[serde(rename = "twitterAccessToken")]
    pub access_token: String,
    #[serde(rename = "twitterAccessTokenSecret")]
    pub access_token_secret: String,
}

/// Discord DM notification bind. Token and user id are ignored unless `enabled`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordSettings {
    #[serde(rename = "enableDiscordNotifications")]
    pub enabled: bool,
    #[serde(rename = "discordToken")]
    pub token: String,
    #[serde(rename = "discordUserID")]
    pub user_id: String,
}

/// Override profile for nightmare / boss variants of a farming mode.
///
/// Only consulted when both `enabled` and `custom_settings` are set; otherwise the
/// parent run parameters apply (see [`crate::nightmare::effective_profile`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NightmareSettings {
    #[serde(rename = "enableNightmare")]
    pub enabled: bool,
    #[serde(rename = "enableCustomNightmareSettings")]
    pub custom_settings: bool,
    #[serde(rename = "nightmareCombatScriptName")]
    pub combat_script_name: String,
    #[serde(rename = "nightmareCombatScript")]
    pub combat_script: Vec<String>,
    #[serde(rename = "nightmareSummons")]
    pub summons: Vec<String>,
    #[serde(rename = "nightmareSummonElements")]
    pub summon_elements: Vec<String>,
    #[serde(rename = "nightmareGroupNumber")]
    pub group_number: i32,
    #[serde(rename = "nightmarePartyNumber")]
    pub party_number: i32,
}

impl Default for NightmareSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            custom_settings: false,
            combat_script_name: String::new(),
            combat_script: Vec::new(),
            summons: Vec::new(),
            summon_elements: Vec::new(),
            group_number: 1,
            party_number: 1,
        }
    }
}
