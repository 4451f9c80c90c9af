//! Drives the Twitter and Discord test runs side by side.
//!
//! Each kind owns its `TestRun` and event receiver, so the two never share
//! in-progress or failure state. Events are drained on the caller's thread.

use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, TryRecvError};

use super::launcher::{BackendCommand, BackendLauncher, ProcessLauncher};
use super::machine::{OutputStream, TestAction, TestEvent, TestPhase, TestRun};
use super::{CredentialKind, TestOutcome};
use crate::process_signal::{ProcessTreeKiller, SystemKiller};
use crate::toast::{ToastCenter, ToastSeverity};

const POLL_INTERVAL_MS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestNotification {
    pub kind: CredentialKind,
    pub outcome: TestOutcome,
}

struct TestSlot {
    run: TestRun,
    events: Option<Receiver<TestEvent>>,
}

impl TestSlot {
    fn new(kind: CredentialKind) -> Self {
        Self {
            run: TestRun::new(kind),
            events: None,
        }
    }
}

pub struct CredentialTester {
    launcher: Box<dyn BackendLauncher>,
    killer: Box<dyn ProcessTreeKiller>,
    twitter: TestSlot,
    discord: TestSlot,
    toasts: ToastCenter,
    pending: Vec<TestNotification>,
}

impl CredentialTester {
    pub fn new(launcher: Box<dyn BackendLauncher>, killer: Box<dyn ProcessTreeKiller>) -> Self {
        Self {
            launcher,
            killer,
            twitter: TestSlot::new(CredentialKind::Twitter),
            discord: TestSlot::new(CredentialKind::Discord),
            toasts: ToastCenter::new(),
            pending: Vec::new(),
        }
    }

    /// Real backend process with the platform tree killer.
    #[must_use]
    pub fn for_backend(command: BackendCommand) -> Self {
        Self::new(
            Box::new(ProcessLauncher::new(command)),
            Box::new(SystemKiller),
        )
    }

    /// Start a test. Returns `false` if that kind is already in flight.
    ///
    /// A spawn failure is not returned as an error: it runs through the same
    /// failure path as a runtime error and surfaces as a failed notification.
    pub fn start(&mut self, kind: CredentialKind) -> bool {
        let slot = match kind {
            CredentialKind::Twitter => &mut self.twitter,
            CredentialKind::Discord => &mut self.discord,
        };
        if !slot.run.begin() {
            tracing::debug!(kind = %kind, "test already in progress; ignoring start");
            return false;
        }

        match self.launcher.launch(kind) {
            Ok(launched) => {
                tracing::debug!(kind = %kind, pid = launched.pid, "test launched");
                slot.events = Some(launched.events);
            }
            Err(err) => {
                tracing::warn!(kind = %kind, "failed to start backend test: {err}");
                apply_event(
                    &mut slot.run,
                    TestEvent::Error(format!("failed to start backend: {err}")),
                    self.killer.as_ref(),
                    &mut self.toasts,
                    &mut self.pending,
                );
            }
        }
        true
    }

    /// Drain every event that has arrived and return the notifications raised.
    pub fn poll(&mut self) -> Vec<TestNotification> {
        let mut notifications = std::mem::take(&mut self.pending);
        for slot in [&mut self.twitter, &mut self.discord] {
            drain_slot(slot, self.killer.as_ref(), &mut self.toasts, &mut notifications);
        }
        self.toasts.tick();
        notifications
    }

    /// Poll until `kind` is idle or `timeout` passes. Returns `true` when idle.
    ///
    /// Notifications raised meanwhile stay queued for the next [`Self::poll`].
    pub fn wait_until_idle(&mut self, kind: CredentialKind, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            let notifications = self.poll();
            self.pending.extend(notifications);
            if !self.is_in_progress(kind) {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(POLL_INTERVAL_MS));
        }
    }

    /// Treat an in-flight test as errored: failure notification plus tree kill.
    pub fn fail_in_flight(&mut self, kind: CredentialKind, reason: &str) {
        let slot = match kind {
            CredentialKind::Twitter => &mut self.twitter,
            CredentialKind::Discord => &mut self.discord,
        };
        if !slot.run.in_progress() {
            return;
        }
        slot.events = None;
        apply_event(
            &mut slot.run,
            TestEvent::Error(reason.to_string()),
            self.killer.as_ref(),
            &mut self.toasts,
            &mut self.pending,
        );
    }

    #[must_use]
    pub fn run(&self, kind: CredentialKind) -> &TestRun {
        match kind {
            CredentialKind::Twitter => &self.twitter.run,
            CredentialKind::Discord => &self.discord.run,
        }
    }

    #[must_use]
    pub fn is_in_progress(&self, kind: CredentialKind) -> bool {
        self.run(kind).in_progress()
    }

    #[must_use]
    pub fn has_failed(&self, kind: CredentialKind) -> bool {
        self.run(kind).failed()
    }

    #[must_use]
    pub fn toasts(&self) -> &ToastCenter {
        &self.toasts
    }
}

impl Drop for CredentialTester {
    fn drop(&mut self) {
        for slot in [&self.twitter, &self.discord] {
            if let Some(pid) = slot.run.pid() {
                let _ = self.killer.kill_tree(pid);
            }
        }
    }
}

fn drain_slot(
    slot: &mut TestSlot,
    killer: &dyn ProcessTreeKiller,
    toasts: &mut ToastCenter,
    notifications: &mut Vec<TestNotification>,
) {
    let Some(events) = slot.events.take() else {
        return;
    };
    loop {
        let event = match events.try_recv() {
            Ok(event) => event,
            Err(TryRecvError::Empty) => {
                slot.events = Some(events);
                return;
            }
            Err(TryRecvError::Disconnected) => {
                TestEvent::Error("backend event stream ended without a close event".to_string())
            }
        };
        if apply_event(&mut slot.run, event, killer, toasts, notifications) {
            return;
        }
    }
}

/// Run one transition and its side effects. Returns `true` once the run is idle.
fn apply_event(
    run: &mut TestRun,
    event: TestEvent,
    killer: &dyn ProcessTreeKiller,
    toasts: &mut ToastCenter,
    notifications: &mut Vec<TestNotification>,
) -> bool {
    let kind = run.kind();
    for action in run.handle(event) {
        match action {
            TestAction::Log { stream, line } => {
                let line = strip_ansi_escapes::strip_str(&line);
                match stream {
                    OutputStream::Stdout => tracing::info!(kind = %kind, "backend: {line}"),
                    OutputStream::Stderr => tracing::warn!(kind = %kind, "backend: {line}"),
                }
            }
            TestAction::Notify(outcome) => {
                let severity = match outcome {
                    TestOutcome::Succeeded => ToastSeverity::Success,
                    TestOutcome::Failed => ToastSeverity::Error,
                };
                toasts.push(severity, format!("{kind}: {}", outcome.message()));
                notifications.push(TestNotification { kind, outcome });
            }
            TestAction::Terminate { pid } => match killer.kill_tree(pid) {
                Ok(()) => tracing::debug!(kind = %kind, pid, "backend process tree terminated"),
                Err(err) => tracing::warn!(kind = %kind, pid, "failed to kill backend: {err}"),
            },
        }
    }

    if run.phase() == TestPhase::Terminating {
        run.finish();
        true
    } else {
        false
    }
}
