//! Per-invocation state machine for one credential test.
//!
//! `Idle -> Spawning -> Running -> {Succeeded, Failed} -> Terminating -> Idle`.
//! Only `Error` and `Closed` lead to cleanup; marker lines just record the outcome.

use super::{classify_line, CredentialKind, TestOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestPhase {
    Idle,
    Spawning,
    Running,
    Succeeded,
    Failed,
    Terminating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// Messages from the backend process, in emission order. `Closed`/`Error` come last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestEvent {
    Spawned { pid: u32 },
    Stdout(String),
    Stderr(String),
    Error(String),
    Closed { code: Option<i32> },
}

/// Side effects the owner of a [`TestRun`] must carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestAction {
    Notify(TestOutcome),
    Terminate { pid: u32 },
    Log { stream: OutputStream, line: String },
}

#[derive(Debug, Clone)]
pub struct TestRun {
    kind: CredentialKind,
    phase: TestPhase,
    pid: Option<u32>,
    in_progress: bool,
    failed: bool,
    outcome: Option<TestOutcome>,
}

impl TestRun {
    #[must_use]
    pub fn new(kind: CredentialKind) -> Self {
        Self {
            kind,
            phase: TestPhase::Idle,
            pid: None,
            in_progress: false,
            failed: false,
            outcome: None,
        }
    }

    #[must_use]
    pub fn kind(&self) -> CredentialKind {
        self.kind
    }

    #[must_use]
    pub fn phase(&self) -> TestPhase {
        self.phase
    }

    #[must_use]
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    #[must_use]
    pub fn in_progress(&self) -> bool {
        self.in_progress
    }

    #[must_use]
    pub fn failed(&self) -> bool {
        self.failed
    }

    /// Outcome reported by the most recent run, if any marker or error was seen.
    #[must_use]
    pub fn outcome(&self) -> Option<TestOutcome> {
        self.outcome
    }

    /// Enter `Spawning`. Refused while a previous run is still in progress.
    pub fn begin(&mut self) -> bool {
        if self.in_progress {
            return false;
        }
        self.phase = TestPhase::Spawning;
        self.in_progress = true;
        self.failed = false;
        self.outcome = None;
        self.pid = None;
        true
    }

    pub fn handle(&mut self, event: TestEvent) -> Vec<TestAction> {
        if matches!(self.phase, TestPhase::Idle | TestPhase::Terminating) {
            return Vec::new();
        }

        match event {
            TestEvent::Spawned { pid } => {
                self.pid = Some(pid);
                self.phase = TestPhase::Running;
                Vec::new()
            }
            TestEvent::Stdout(line) => match classify_line(&line) {
                Some(outcome) => {
                    self.record(outcome);
                    self.phase = match outcome {
                        TestOutcome::Succeeded => TestPhase::Succeeded,
                        TestOutcome::Failed => TestPhase::Failed,
                    };
                    vec![
                        TestAction::Log {
                            stream: OutputStream::Stdout,
                            line,
                        },
                        TestAction::Notify(outcome),
                    ]
                }
                None => vec![TestAction::Log {
                    stream: OutputStream::Stdout,
                    line,
                }],
            },
            TestEvent::Stderr(line) => vec![TestAction::Log {
                stream: OutputStream::Stderr,
                line,
            }],
            TestEvent::Error(message) => {
                self.record(TestOutcome::Failed);
                let mut actions = vec![
                    TestAction::Log {
                        stream: OutputStream::Stderr,
                        line: message,
                    },
                    TestAction::Notify(TestOutcome::Failed),
                ];
                actions.extend(self.terminate());
                actions
            }
            TestEvent::Closed { .. } => self.terminate().into_iter().collect(),
        }
    }

    /// Leave `Terminating` once the kill action ran.
    pub fn finish(&mut self) {
        self.pid = None;
        self.in_progress = false;
        self.phase = TestPhase::Idle;
    }

    fn record(&mut self, outcome: TestOutcome) {
        self.failed = outcome == TestOutcome::Failed;
        self.outcome = Some(outcome);
    }

    fn terminate(&mut self) -> Option<TestAction> {
        self.phase = TestPhase::Terminating;
        self.pid.map(|pid| TestAction::Terminate { pid })
    }
}
