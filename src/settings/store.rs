//! Process-wide settings store shared by handle with every consumer.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::field::{SettingsField, SettingsUpdate};
use super::model::Settings;
use crate::lock::lock_or_recover;

/// Notification sent to subscribers after every store mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingsChange {
    /// Monotonic mutation counter, starting at 1 for the first change.
    pub revision: u64,
    /// The field that changed, or `None` when the whole aggregate was replaced.
    pub field: Option<SettingsField>,
}

#[derive(Default)]
struct BotFlags {
    ready: AtomicBool,
    running: AtomicBool,
    start_requested: AtomicBool,
    stop_requested: AtomicBool,
    refresh_alert: AtomicBool,
}

struct StoreInner {
    settings: Mutex<Settings>,
    revision: AtomicU64,
    subscribers: Mutex<Vec<Sender<SettingsChange>>>,
    flags: BotFlags,
}

/// Cloneable handle to the shared settings aggregate and bot status flags.
///
/// The store does not validate. Cross-field rules (delay exclusivity, bound
/// clamping) live in [`super::rules`] and run before `set`.
#[derive(Clone)]
pub struct SettingsStore {
    inner: Arc<StoreInner>,
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    #[must_use]
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                settings: Mutex::new(settings),
                revision: AtomicU64::new(0),
                subscribers: Mutex::new(Vec::new()),
                flags: BotFlags::default(),
            }),
        }
    }

    /// Current snapshot.
    #[must_use]
    pub fn get(&self) -> Settings {
        lock_or_recover(&self.inner.settings, "settings store get").clone()
    }

    /// Read a projection without cloning the whole aggregate.
    pub fn read<R>(&self, f: impl FnOnce(&Settings) -> R) -> R {
        let guard = lock_or_recover(&self.inner.settings, "settings store read");
        f(&guard)
    }

    /// Replace one field.
    pub fn set(&self, update: SettingsUpdate) {
        let field = update.field();
        {
            let mut guard = lock_or_recover(&self.inner.settings, "settings store set");
            update.apply(&mut guard);
        }
        tracing::debug!(field = field.key(), "settings field updated");
        self.notify(Some(field));
    }

    /// Swap in a whole new aggregate.
    pub fn replace(&self, settings: Settings) {
        *lock_or_recover(&self.inner.settings, "settings store replace") = settings;
        tracing::debug!("settings replaced");
        self.notify(None);
    }

    /// Batched caller edit, published as one whole-aggregate change.
    pub fn update(&self, f: impl FnOnce(&mut Settings)) {
        {
            let mut guard = lock_or_recover(&self.inner.settings, "settings store update");
            f(&mut guard);
        }
        self.notify(None);
    }

    /// Receive a [`SettingsChange`] for every subsequent mutation.
    pub fn subscribe(&self) -> Receiver<SettingsChange> {
        let (tx, rx) = unbounded();
        lock_or_recover(&self.inner.subscribers, "settings store subscribe").push(tx);
        rx
    }

    /// Number of mutations applied so far.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.inner.revision.load(Ordering::SeqCst)
    }

    fn notify(&self, field: Option<SettingsField>) {
        let revision = self.inner.revision.fetch_add(1, Ordering::SeqCst) + 1;
        let change = SettingsChange { revision, field };
        let mut subscribers = lock_or_recover(&self.inner.subscribers, "settings store notify");
        subscribers.retain(|tx| tx.send(change).is_ok());
    }

    #[must_use]
    pub fn ready_status(&self) -> bool {
        self.inner.flags.ready.load(Ordering::SeqCst)
    }

    pub fn set_ready_status(&self, ready: bool) {
        self.inner.flags.ready.store(ready, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_bot_running(&self) -> bool {
        self.inner.flags.running.load(Ordering::SeqCst)
    }

    pub fn set_bot_running(&self, running: bool) {
        self.inner.flags.running.store(running, Ordering::SeqCst);
    }

    #[must_use]
    pub fn start_requested(&self) -> bool {
        self.inner.flags.start_requested.load(Ordering::SeqCst)
    }

    pub fn set_start_requested(&self, requested: bool) {
        self.inner
            .flags
            .start_requested
            .store(requested, Ordering::SeqCst);
    }

    #[must_use]
    pub fn stop_requested(&self) -> bool {
        self.inner.flags.stop_requested.load(Ordering::SeqCst)
    }

    pub fn set_stop_requested(&self, requested: bool) {
        self.inner
            .flags
            .stop_requested
            .store(requested, Ordering::SeqCst);
    }

    #[must_use]
    pub fn refresh_alert(&self) -> bool {
        self.inner.flags.refresh_alert.load(Ordering::SeqCst)
    }

    pub fn set_refresh_alert(&self, alert: bool) {
        self.inner.flags.refresh_alert.store(alert, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn flags_default_to_false_and_toggle_independently() {
        let store = SettingsStore::new();
        assert!(!store.ready_status());
        assert!(!store.is_bot_running());
        assert!(!store.start_requested());
        assert!(!store.stop_requested());
        assert!(!store.refresh_alert());

        store.set_start_requested(true);
        store.set_refresh_alert(true);
        assert!(store.start_requested());
        assert!(store.refresh_alert());
        assert!(!store.stop_requested());
        assert!(!store.ready_status());
        assert!(!store.is_bot_running());
    }

    #[test]
    fn clones_share_the_same_aggregate() {
        let store = SettingsStore::new();
        let view = store.clone();
        store.set(SettingsUpdate::Mission("Grand Order".to_string()));
        assert_eq!(view.get().mission, "Grand Order");
        store.set_bot_running(true);
        assert!(view.is_bot_running());
    }

    #[test]
    fn subscribers_see_every_change_in_order() {
        let store = SettingsStore::new();
        let rx = store.subscribe();
        store.set(SettingsUpdate::ItemAmount(10));
        store.replace(Settings::default());
        store.set(SettingsUpdate::EnableSoulBalm(true));

        let changes: Vec<SettingsChange> = rx.try_iter().collect();
        assert_eq!(
            changes,
            vec![
                SettingsChange { revision: 1, field: Some(SettingsField::ItemAmount) },
                SettingsChange { revision: 2, field: None },
                SettingsChange { revision: 3, field: Some(SettingsField::EnableSoulBalm) },
            ]
        );
        assert_eq!(store.revision(), 3);
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let store = SettingsStore::new();
        let rx = store.subscribe();
        drop(rx);
        store.set(SettingsUpdate::DebugMode(true));
        assert!(lock_or_recover(&store.inner.subscribers, "test").is_empty());
        assert!(store.get().debug_mode);
    }

    fn any_update() -> impl Strategy<Value = SettingsUpdate> {
        prop_oneof![
            any::<u32>().prop_map(SettingsUpdate::ItemAmount),
            any::<i32>().prop_map(SettingsUpdate::GroupNumber),
            any::<i32>().prop_map(SettingsUpdate::NightmarePartyNumber),
            any::<bool>().prop_map(SettingsUpdate::EnableFullElixir),
            any::<bool>().prop_map(SettingsUpdate::EnableNightmare),
            (0.0f64..10.0).prop_map(SettingsUpdate::MouseSpeed),
            "[a-zA-Z0-9 ]{0,16}".prop_map(SettingsUpdate::DiscordToken),
            "[a-zA-Z0-9 ]{0,16}".prop_map(SettingsUpdate::TwitterApiKeySecret),
            prop::collection::vec("[A-Za-z]{1,8}", 0..4).prop_map(SettingsUpdate::NightmareSummons),
            any::<u32>().prop_map(SettingsUpdate::DelayBetweenRunsUpperBound),
        ]
    }

    proptest! {
        #[test]
        fn set_then_get_changes_only_that_field(update in any_update()) {
            let store = SettingsStore::new();
            let before = store.get();
            let field = update.field();
            store.set(update.clone());
            let after = store.get();

            prop_assert_eq!(field.current(&after), update);
            for other in SettingsField::ALL.iter().copied().filter(|f| *f != field) {
                prop_assert_eq!(other.current(&after), other.current(&before));
            }
        }
    }
}
