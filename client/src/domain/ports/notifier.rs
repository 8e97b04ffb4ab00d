//! Driven port for transient user notifications ("toasts").

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeLevel {
    /// The action succeeded.
    Success,
    /// The action failed or was refused.
    Error,
}

/// One message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Display text.
    pub message: String,
}

impl Notice {
    /// A success notice.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    /// An error notice.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Port for surfacing notices to whoever is driving the client.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    /// Show one notice. Delivery is best effort and never fails the caller.
    fn notify(&self, notice: Notice);
}
