//! Settings store, combat-script loader and credential-test runner for the
//! Granblue Fantasy farming bot. The `gbf-settings` binary drives these against a
//! JSON settings file shared with the backend.

pub mod combat_script;
pub mod config;
pub mod credential_test;
pub mod form;
mod lock;
pub mod logging;
pub mod nightmare;
pub mod process_signal;
pub mod settings;
pub mod toast;

pub use combat_script::{CombatScript, CombatScriptError};
pub use config::{AppConfig, ResolvedConfig, UserConfig};
pub use credential_test::{CredentialKind, CredentialTester, TestNotification, TestOutcome};
pub use logging::init_logging;
pub use settings::{FieldError, Settings, SettingsField, SettingsStore, SettingsUpdate};
