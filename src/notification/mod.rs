mod bus;

pub use bus::{NotificationBus, RecordingSink};

/// How a notification should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Info,
    Error,
}

/// A human-readable status message emitted after each command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }
}

/// Receives notifications emitted by the editor
pub trait NotificationSink: Send {
    fn notify(&mut self, notification: &Notification);
}
