//! Transient user feedback.
//!
//! The `Notifier` holds a single notification slot. A new notification
//! replaces whatever is showing and restarts the hide timer; the timer of a
//! replaced notification is ignored when it fires. There is no queue.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, warn};

/// Default time a notification stays visible
pub const DEFAULT_NOTIFICATION_DURATION: Duration = Duration::from_millis(3000);

/// Display hint only; no severity changes behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Info,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub text: String,
    pub severity: Severity,
    pub visible: bool,
}

struct Inner {
    slot: watch::Sender<Notification>,
    generation: AtomicU64,
    // Serializes "replace" against "hide if still current"
    lock: Mutex<()>,
}

/// Single-slot, auto-dismissing notification channel.
/// Clone is cheap and all clones share the slot.
#[derive(Clone)]
pub struct Notifier {
    inner: Arc<Inner>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (slot, _) = watch::channel(Notification {
            text: String::new(),
            severity: Severity::Success,
            visible: false,
        });
        Self {
            inner: Arc::new(Inner {
                slot,
                generation: AtomicU64::new(0),
                lock: Mutex::new(()),
            }),
        }
    }

    /// Show `text` for the default duration
    pub fn notify(&self, text: impl Into<String>, severity: Severity) {
        self.notify_for(text, severity, DEFAULT_NOTIFICATION_DURATION);
    }

    /// Show `text` for `duration`, replacing the current notification.
    ///
    /// The hide timer runs as a tokio task. Outside a runtime the
    /// notification is still shown but stays up until replaced or dismissed.
    pub fn notify_for(&self, text: impl Into<String>, severity: Severity, duration: Duration) {
        let text = text.into();
        debug!(severity = severity.label(), text = %text, "Notification");

        let generation = {
            let _guard = self.lock();
            let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
            self.inner.slot.send_replace(Notification {
                text,
                severity,
                visible: true,
            });
            generation
        };

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No tokio runtime, notification will not auto-hide");
            return;
        };
        let inner = Arc::clone(&self.inner);
        runtime.spawn(async move {
            tokio::time::sleep(duration).await;
            let _guard = match inner.lock.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if inner.generation.load(Ordering::SeqCst) == generation {
                inner.slot.send_modify(|n| n.visible = false);
            }
        });
    }

    /// Hide the current notification immediately
    pub fn dismiss(&self) {
        let _guard = self.lock();
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        self.inner.slot.send_if_modified(|n| {
            let was_visible = n.visible;
            n.visible = false;
            was_visible
        });
    }

    /// The visible notification, if any
    pub fn current(&self) -> Option<Notification> {
        let notification = self.inner.slot.borrow();
        notification.visible.then(|| notification.clone())
    }

    /// Observe every change of the slot (shown, replaced, hidden)
    pub fn subscribe(&self) -> watch::Receiver<Notification> {
        self.inner.slot.subscribe()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ()> {
        match self.inner.lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
