//! Transient, dismissible user notices (toasts).
//!
//! Every user-visible failure and confirmation ends up here. Nothing is
//! fatal; the front end shows notices and the user dismisses them.

#[cfg(test)]
#[path = "notice_test.rs"]
mod notice_test;

use std::collections::VecDeque;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Clone, Debug, Default)]
pub struct Notifications {
    next_id: u64,
    items: VecDeque<Notice>,
}

impl Notifications {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: NoticeLevel, message: impl Into<String>) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.items.push_back(Notice { id, level, message: message.into() });
        id
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.push(NoticeLevel::Success, message)
    }

    pub fn info(&mut self, message: impl Into<String>) -> u64 {
        self.push(NoticeLevel::Info, message)
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.push(NoticeLevel::Error, message)
    }

    /// Returns whether a notice with `id` was showing.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|notice| notice.id != id);
        self.items.len() != before
    }

    /// Take every pending notice, oldest first.
    pub fn drain(&mut self) -> Vec<Notice> {
        self.items.drain(..).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.items.iter()
    }

    #[must_use]
    pub fn last(&self) -> Option<&Notice> {
        self.items.back()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
