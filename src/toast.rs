//! Transient notifications (snackbar toasts) with auto-dismiss and a bounded history.

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

/// Maximum number of toasts kept in the history ring.
pub const TOAST_HISTORY_MAX: usize = 50;

/// Test-result toasts stay up for ten seconds unless clicked away.
pub const DEFAULT_DISMISS_MS: u64 = 10_000;

/// Maximum number of toasts visible simultaneously.
pub const MAX_VISIBLE_TOASTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastSeverity {
    Info,
    Success,
    Warning,
    Error,
}

impl ToastSeverity {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Success => "OK",
            Self::Warning => "WARN",
            Self::Error => "ERR",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub id: u64,
    pub severity: ToastSeverity,
    pub message: String,
    pub created_at: Instant,
    pub dismiss_at: Instant,
    pub dismissed: bool,
}

impl fmt::Display for Toast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity.label(), self.message)
    }
}

#[derive(Debug)]
pub struct ToastCenter {
    active: VecDeque<Toast>,
    history: VecDeque<Toast>,
    next_id: u64,
    dismiss_after: Duration,
}

impl ToastCenter {
    #[must_use]
    pub fn new() -> Self {
        Self::with_dismiss_after(Duration::from_millis(DEFAULT_DISMISS_MS))
    }

    #[must_use]
    pub fn with_dismiss_after(dismiss_after: Duration) -> Self {
        Self {
            active: VecDeque::new(),
            history: VecDeque::new(),
            next_id: 0,
            dismiss_after,
        }
    }

    pub fn push(&mut self, severity: ToastSeverity, message: impl Into<String>) -> u64 {
        let now = Instant::now();
        let id = self.next_id;
        self.next_id += 1;
        let toast = Toast {
            id,
            severity,
            message: message.into(),
            created_at: now,
            dismiss_at: now + self.dismiss_after,
            dismissed: false,
        };

        // Evict the oldest visible toast at capacity.
        if self.active.len() >= MAX_VISIBLE_TOASTS {
            if let Some(mut evicted) = self.active.pop_front() {
                evicted.dismissed = true;
                self.push_history(evicted);
            }
        }

        self.active.push_back(toast);
        id
    }

    /// Dismiss expired toasts. Returns `true` if anything was dismissed.
    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> bool {
        let before = self.active.len();
        let mut expired = Vec::new();

        self.active.retain(|toast| {
            if toast.dismissed || now >= toast.dismiss_at {
                expired.push(toast.clone());
                false
            } else {
                true
            }
        });

        for mut toast in expired {
            toast.dismissed = true;
            self.push_history(toast);
        }

        self.active.len() != before
    }

    /// Dismiss the most recent active toast (click-to-close).
    pub fn dismiss_latest(&mut self) -> bool {
        if let Some(mut toast) = self.active.pop_back() {
            toast.dismissed = true;
            self.push_history(toast);
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn active_toasts(&self) -> &VecDeque<Toast> {
        &self.active
    }

    #[must_use]
    pub fn latest(&self) -> Option<&Toast> {
        self.active.back()
    }

    #[must_use]
    pub fn history(&self) -> &VecDeque<Toast> {
        &self.history
    }

    fn push_history(&mut self, toast: Toast) {
        if self.history.len() >= TOAST_HISTORY_MAX {
            self.history.pop_front();
        }
        self.history.push_back(toast);
    }
}

impl Default for ToastCenter {
    fn default() -> Self {
        Self::new()
    }
}
