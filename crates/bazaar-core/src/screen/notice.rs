//! Transient notifications ("toasts")

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Shared queue of pending notices; the front end drains and shows them.
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    queue: Arc<Mutex<Vec<Notice>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn queue(&self) -> MutexGuard<'_, Vec<Notice>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, level: NoticeLevel, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(?level, %message, "notice");
        self.queue().push(Notice { level, message });
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(NoticeLevel::Success, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(NoticeLevel::Error, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(NoticeLevel::Info, message);
    }

    /// Take every pending notice, oldest first
    pub fn drain(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.queue())
    }

    /// Copy of the pending notices, leaving them queued
    pub fn pending(&self) -> Vec<Notice> {
        self.queue().clone()
    }

    pub fn last(&self) -> Option<Notice> {
        self.queue().last().cloned()
    }
}
