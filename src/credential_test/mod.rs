//! Credential tests: ask the backend to make a live API call and report pass/fail.
//!
//! The backend is launched as `<interpreter> <script> <selector>` and speaks a
//! two-phrase stdout contract. Everything else it prints is logged and ignored.

mod launcher;
mod machine;
mod tester;

use std::fmt;

use clap::ValueEnum;

pub use launcher::{BackendCommand, BackendLauncher, LaunchedTest, ProcessLauncher};
pub use machine::{OutputStream, TestAction, TestEvent, TestPhase, TestRun};
pub use tester::{CredentialTester, TestNotification};

pub const SUCCESS_MARKER: &str = "Test successfully completed.";
pub const FAILURE_MARKER: &str = "Test failed.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum CredentialKind {
    Twitter,
    Discord,
}

impl CredentialKind {
    pub const ALL: [CredentialKind; 2] = [Self::Twitter, Self::Discord];

    /// Numeric selector the backend test entrypoint dispatches on.
    #[must_use]
    pub fn selector(self) -> u8 {
        match self {
            Self::Twitter => 9,
            Self::Discord => 10,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Twitter => "Twitter",
            Self::Discord => "Discord",
        }
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestOutcome {
    Succeeded,
    Failed,
}

impl TestOutcome {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Succeeded => "Test was successful.",
            Self::Failed => "Test was not successful.",
        }
    }
}

/// Match a backend stdout line against the two result markers.
#[must_use]
pub fn classify_line(line: &str) -> Option<TestOutcome> {
    if line.contains(SUCCESS_MARKER) {
        Some(TestOutcome::Succeeded)
    } else if line.contains(FAILURE_MARKER) {
        Some(TestOutcome::Failed)
    } else {
        None
    }
}
