//! Settings aggregate, its field catalogue, the shared store and form rules.

mod field;
mod model;
pub mod persistence;
pub mod rules;
mod store;

pub use field::{FieldError, FieldValue, SettingsField, SettingsUpdate};
pub use model::{
    DiscordSettings, NightmareSettings, Settings, TwitterCredentials,
    DEFAULT_AUTO_EXIT_RAID_MINUTES, DEFAULT_DELAY_BETWEEN_RUNS_SECS,
    DEFAULT_DELAY_LOWER_BOUND_SECS, DEFAULT_DELAY_UPPER_BOUND_SECS, DEFAULT_MOUSE_SPEED_SECS,
};
pub use rules::{FieldWarning, ScriptTarget};
pub use store::{SettingsChange, SettingsStore};
