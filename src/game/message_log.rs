//! # Message Log
//!
//! Bounded narration log: the newest lines are kept, the oldest fall off.

use crate::config;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Fixed-capacity FIFO of narration lines.
///
/// # Examples
///
/// ```
/// use delver::MessageLog;
///
/// let mut log = MessageLog::with_capacity(2);
/// log.add("one");
/// log.add("two");
/// log.add("three");
/// assert_eq!(log.lines().collect::<Vec<_>>(), vec!["two", "three"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageLog {
    capacity: usize,
    lines: VecDeque<String>,
}

impl MessageLog {
    /// Creates a log with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(config::MESSAGE_LOG_CAPACITY)
    }

    /// Creates a log that keeps at most `capacity` lines.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            lines: VecDeque::with_capacity(capacity),
        }
    }

    /// Appends a line, evicting the oldest ones past capacity.
    pub fn add(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::debug!("{}", message);

        self.lines.push_back(message);
        while self.lines.len() > self.capacity {
            self.lines.pop_front();
        }
    }

    /// Lines from oldest to newest.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// The most recent line.
    pub fn last(&self) -> Option<&str> {
        self.lines.back().map(String::as_str)
    }

    /// Number of lines currently held.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the log holds no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Maximum number of lines kept.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity() {
        let log = MessageLog::new();
        assert_eq!(log.capacity(), 9);
        assert!(log.is_empty());
    }

    #[test]
    fn test_keeps_last_capacity_messages_in_order() {
        let mut log = MessageLog::new();
        for i in 0..20 {
            log.add(format!("message {}", i));
            assert!(log.len() <= log.capacity());
        }

        let lines: Vec<&str> = log.lines().collect();
        let expected: Vec<String> = (11..20).map(|i| format!("message {}", i)).collect();
        assert_eq!(lines, expected);
        assert_eq!(log.last(), Some("message 19"));
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let mut log = MessageLog::with_capacity(0);
        log.add("lost");
        assert!(log.is_empty());
        assert_eq!(log.last(), None);
    }

    #[test]
    fn test_clear() {
        let mut log = MessageLog::new();
        log.add("a");
        log.add("b");
        log.clear();
        assert_eq!(log.len(), 0);
    }
}
