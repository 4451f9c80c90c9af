//! Form-level edit rules layered over the store.
//!
//! The store accepts anything; these helpers keep the delay toggles exclusive and
//! the delay bounds ordered, keep combat-script name and lines paired, and report
//! out-of-range group/party numbers.

use std::fmt;
use std::ops::RangeInclusive;
use std::path::Path;

use super::field::{FieldError, SettingsField, SettingsUpdate};
use super::model::Settings;
use super::store::SettingsStore;
use crate::combat_script::CombatScript;

pub const GROUP_RANGE: RangeInclusive<i32> = 1..=7;
pub const PARTY_RANGE: RangeInclusive<i32> = 1..=6;

/// Non-blocking warning shown next to a field; the value is still stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldWarning {
    pub field: SettingsField,
    pub value: i32,
    pub allowed: RangeInclusive<i32>,
}

impl fmt::Display for FieldWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {} is outside {}..={}",
            self.field.key(),
            self.value,
            self.allowed.start(),
            self.allowed.end()
        )
    }
}

/// Which profile a combat-script selection belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptTarget {
    Main,
    Nightmare,
}

pub fn set_fixed_delay_enabled(store: &SettingsStore, enabled: bool) {
    if enabled && store.read(|s| s.enable_randomized_delay_between_runs) {
        store.set(SettingsUpdate::EnableRandomizedDelayBetweenRuns(false));
    }
    store.set(SettingsUpdate::EnableDelayBetweenRuns(enabled));
}

pub fn set_randomized_delay_enabled(store: &SettingsStore, enabled: bool) {
    if enabled && store.read(|s| s.enable_delay_between_runs) {
        store.set(SettingsUpdate::EnableDelayBetweenRuns(false));
    }
    store.set(SettingsUpdate::EnableRandomizedDelayBetweenRuns(enabled));
}

/// Edit the lower bound, snapping to the upper bound if it would exceed it.
pub fn set_delay_lower_bound(store: &SettingsStore, value: u32) {
    let upper = store.read(|s| s.delay_between_runs_upper_bound);
    store.set(SettingsUpdate::DelayBetweenRunsLowerBound(value.min(upper)));
}

/// Edit the upper bound, snapping to the lower bound if it would fall below it.
pub fn set_delay_upper_bound(store: &SettingsStore, value: u32) {
    let lower = store.read(|s| s.delay_between_runs_lower_bound);
    store.set(SettingsUpdate::DelayBetweenRunsUpperBound(value.max(lower)));
}

/// Load the picked file into the main or nightmare script fields.
///
/// Returns the stored script so callers can show "None Selected" on fallback.
pub fn select_combat_script(
    store: &SettingsStore,
    target: ScriptTarget,
    path: Option<&Path>,
) -> CombatScript {
    let script = CombatScript::load(path);
    let (name_update, lines_update) = match target {
        ScriptTarget::Main => (
            SettingsUpdate::CombatScriptName(script.name.clone()),
            SettingsUpdate::CombatScript(script.lines.clone()),
        ),
        ScriptTarget::Nightmare => (
            SettingsUpdate::NightmareCombatScriptName(script.name.clone()),
            SettingsUpdate::NightmareCombatScript(script.lines.clone()),
        ),
    };
    store.set(name_update);
    store.set(lines_update);
    script
}

/// Fields written only by [`select_combat_script`].
#[must_use]
pub fn is_script_file_field(field: SettingsField) -> bool {
    matches!(
        field,
        SettingsField::CombatScriptName
            | SettingsField::CombatScript
            | SettingsField::NightmareCombatScriptName
            | SettingsField::NightmareCombatScript
    )
}

/// Apply one form edit through the rules above, then report warnings.
///
/// Combat-script fields are refused; they change only through a file selection.
pub fn apply_edit(
    store: &SettingsStore,
    update: SettingsUpdate,
) -> Result<Vec<FieldWarning>, FieldError> {
    let field = update.field();
    if is_script_file_field(field) {
        return Err(FieldError::ScriptFileOnly(field.key()));
    }
    match update {
        SettingsUpdate::EnableDelayBetweenRuns(enabled) => set_fixed_delay_enabled(store, enabled),
        SettingsUpdate::EnableRandomizedDelayBetweenRuns(enabled) => {
            set_randomized_delay_enabled(store, enabled);
        }
        SettingsUpdate::DelayBetweenRunsLowerBound(value) => set_delay_lower_bound(store, value),
        SettingsUpdate::DelayBetweenRunsUpperBound(value) => set_delay_upper_bound(store, value),
        other => store.set(other),
    }
    Ok(store.read(field_warnings))
}

#[must_use]
pub fn field_warnings(settings: &Settings) -> Vec<FieldWarning> {
    let checks = [
        (SettingsField::GroupNumber, settings.group_number, GROUP_RANGE),
        (SettingsField::PartyNumber, settings.party_number, PARTY_RANGE),
        (
            SettingsField::NightmareGroupNumber,
            settings.nightmare.group_number,
            GROUP_RANGE,
        ),
        (
            SettingsField::NightmarePartyNumber,
            settings.nightmare.party_number,
            PARTY_RANGE,
        ),
    ];
    checks
        .into_iter()
        .filter(|(_, value, allowed)| !allowed.contains(value))
        .map(|(field, value, allowed)| FieldWarning {
            field,
            value,
            allowed,
        })
        .collect()
}
