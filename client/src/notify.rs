//! Notification seam. The core decides *that* a message is needed and its
//! category; rendering belongs to the collaborator behind [`Notifier`].

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoticeLevel {
    Error,
    Success,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub level: NoticeLevel,
}

impl Notice {
    pub fn new(message: String, level: NoticeLevel) -> Self {
        Self { message, level }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message.into(), NoticeLevel::Error)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message.into(), NoticeLevel::Success)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message.into(), NoticeLevel::Info)
    }
}

/// Mutation outcomes are reported through this trait.
pub trait Notifier {
    fn notify(&self, notice: Notice);
}

/// Discards all notices. The default when no collaborator is attached.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _notice: Notice) {}
}
