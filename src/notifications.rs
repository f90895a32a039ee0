//! User-facing notifications.
//!
//! `ToastManager` is the bundled [`Notifier`]: hosts share it behind a
//! `parking_lot::Mutex` and render `toasts()` however they like. Hosts with
//! their own notification surface implement `Notifier` directly.

use crate::services::Notifier;
use parking_lot::Mutex;
use std::time::Duration;

/// Severity of a notification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ToastVariant {
    Success,
    Info,
    Warning,
    Error,
}

impl ToastVariant {
    pub fn default_duration(&self) -> Duration {
        match self {
            ToastVariant::Success | ToastVariant::Info => Duration::from_secs(3),
            ToastVariant::Warning => Duration::from_secs(4),
            ToastVariant::Error => Duration::from_secs(5),
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            ToastVariant::Success => "✓",
            ToastVariant::Error => "✗",
            ToastVariant::Info => "ℹ",
            ToastVariant::Warning => "⚠",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub variant: ToastVariant,
    pub duration: Duration,
}

impl Toast {
    pub fn new(message: impl Into<String>, variant: ToastVariant) -> Self {
        Self {
            id: 0,
            message: message.into(),
            variant,
            duration: variant.default_duration(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, ToastVariant::Success)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, ToastVariant::Info)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, ToastVariant::Warning)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, ToastVariant::Error)
    }
}

/// Ordered list of live toasts
#[derive(Debug, Default)]
pub struct ToastManager {
    toasts: Vec<Toast>,
    next_id: u64,
}

impl ToastManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a toast, assigning it an id. Returns the id.
    pub fn push(&mut self, mut toast: Toast) -> u64 {
        self.next_id += 1;
        toast.id = self.next_id;
        tracing::debug!(id = toast.id, variant = ?toast.variant, "{}", toast.message);
        self.toasts.push(toast);
        self.next_id
    }

    pub fn remove(&mut self, id: u64) {
        self.toasts.retain(|t| t.id != id);
    }

    pub fn clear(&mut self) {
        self.toasts.clear();
    }

    pub fn count(&self) -> usize {
        self.toasts.len()
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    /// Most recent toast, if any
    pub fn latest(&self) -> Option<&Toast> {
        self.toasts.last()
    }
}

impl Notifier for Mutex<ToastManager> {
    fn notify(&self, message: &str, variant: ToastVariant) {
        self.lock().push(Toast::new(message, variant));
    }
}
