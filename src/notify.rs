//! User-facing outcome notices.
//!
//! The core reports outcomes as a [`Notice`] with a short title and a
//! description. How notices are shown is up to the front end; the default
//! [`LogNotifier`] only logs them.

use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Input was rejected.
    Error,
    /// The target of an operation does not exist, or there is nothing to act on.
    NotFound,
    Success,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn new(
        level: NoticeLevel,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            level,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, title, description)
    }

    pub fn not_found(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NoticeLevel::NotFound, title, description)
    }

    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, title, description)
    }

    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, title, description)
    }
}

pub trait Notifier {
    fn notify(&self, notice: Notice);
}

/// Writes notices to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error | NoticeLevel::NotFound => {
                tracing::warn!("{}: {}", notice.title, notice.description)
            }
            NoticeLevel::Success | NoticeLevel::Info => {
                tracing::info!("{}: {}", notice.title, notice.description)
            }
        }
    }
}

/// Keeps every notice. Clones share the same list.
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|notices| notices.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices().pop()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}
