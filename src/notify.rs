use tokio::sync::broadcast;

/// NoticeLevel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// Notice
///
/// A transient, human-readable message a shell would render as a toast.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Notifier
///
/// Broadcast channel for transient notices. Mutation failures are published
/// here in addition to being returned to the caller. Delivery is lossy: a
/// subscriber that falls behind drops old notices rather than blocking a
/// store, and publishing with no subscribers is fine.
#[derive(Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notice>,
}

const NOTICE_BUFFER: usize = 32;

impl Notifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(NOTICE_BUFFER);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }

    pub fn info(&self, message: impl Into<String>) {
        self.publish(NoticeLevel::Info, message.into());
    }

    pub fn success(&self, message: impl Into<String>) {
        self.publish(NoticeLevel::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.publish(NoticeLevel::Error, message.into());
    }

    fn publish(&self, level: NoticeLevel, message: String) {
        let _ = self.tx.send(Notice { level, message });
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
