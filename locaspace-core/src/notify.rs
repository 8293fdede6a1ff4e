use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tokio::sync::broadcast;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// Transient user-facing notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Toast {
    pub id: Uuid,
    pub level: ToastLevel,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Toast {
    pub fn new(level: ToastLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            level,
            title: title.into(),
            message: message.into(),
            created_at: Utc::now(),
        }
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ToastLevel::Success, title, message)
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ToastLevel::Warning, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ToastLevel::Error, title, message)
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);
}

/// A toast on its way to subscribers. Without a recipient it is meant for
/// everyone.
#[derive(Debug, Clone, Serialize)]
pub struct Delivery {
    pub recipient: Option<String>,
    pub toast: Toast,
}

impl Delivery {
    pub fn is_for(&self, user_id: &str) -> bool {
        self.recipient.as_deref().is_none_or(|r| r == user_id)
    }
}

/// Fans toasts out to every live subscriber (SSE streams in the BFF).
#[derive(Clone)]
pub struct BroadcastNotifier {
    tx: broadcast::Sender<Delivery>,
    recipient: Option<String>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, recipient: None }
    }

    /// Same channel, but every toast sent through the returned notifier is
    /// addressed to `user_id` only.
    pub fn for_recipient(&self, user_id: impl Into<String>) -> Self {
        Self {
            tx: self.tx.clone(),
            recipient: Some(user_id.into()),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Delivery> {
        self.tx.subscribe()
    }
}

impl Notifier for BroadcastNotifier {
    fn notify(&self, toast: Toast) {
        tracing::debug!(level = ?toast.level, title = %toast.title, recipient = ?self.recipient, "toast");
        // No subscriber means nobody is looking; the toast is dropped.
        let _ = self.tx.send(Delivery {
            recipient: self.recipient.clone(),
            toast,
        });
    }
}

/// Keeps every toast in memory. Used by tests and headless runs.
#[derive(Default)]
pub struct RecordingNotifier {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().map(|t| t.clone()).unwrap_or_default()
    }

    pub fn count(&self, level: ToastLevel) -> usize {
        self.toasts().iter().filter(|t| t.level == level).count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, toast: Toast) {
        if let Ok(mut toasts) = self.toasts.lock() {
            toasts.push(toast);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_broadcast_reaches_subscriber() {
        let notifier = BroadcastNotifier::new(8);
        let mut rx = notifier.subscribe();

        notifier.notify(Toast::success("Saved", "Draft saved"));

        let delivery = rx.recv().await.unwrap();
        assert_eq!(delivery.toast.level, ToastLevel::Success);
        assert_eq!(delivery.toast.title, "Saved");
        assert!(delivery.is_for("anyone"));
    }

    #[tokio::test]
    async fn test_addressed_toasts() {
        let notifier = BroadcastNotifier::new(8);
        let mut rx = notifier.subscribe();

        notifier.for_recipient("u-1").notify(Toast::warning("Draft", "not saved"));

        let delivery = rx.recv().await.unwrap();
        assert!(delivery.is_for("u-1"));
        assert!(!delivery.is_for("u-2"));
    }

    #[test]
    fn test_broadcast_without_subscriber_is_silent() {
        let notifier = BroadcastNotifier::new(8);
        notifier.notify(Toast::error("Oops", "nobody listens"));
    }

    #[test]
    fn test_recording_notifier_counts_levels() {
        let notifier = RecordingNotifier::new();
        notifier.notify(Toast::success("a", "b"));
        notifier.notify(Toast::error("c", "d"));
        notifier.notify(Toast::error("e", "f"));
        assert_eq!(notifier.count(ToastLevel::Error), 2);
        assert_eq!(notifier.toasts().len(), 3);
    }
}
