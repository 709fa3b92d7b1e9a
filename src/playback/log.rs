//! Bounded console log

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// Number of lines the console keeps
pub const LOG_CAPACITY: usize = 9;

/// Most recent log lines, newest first
///
/// Pushing onto a full history silently drops the oldest line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogHistory {
    lines: VecDeque<String>,
}

impl LogHistory {
    pub fn new() -> Self {
        Self {
            lines: VecDeque::with_capacity(LOG_CAPACITY),
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push_front(line.into());
        self.lines.truncate(LOG_CAPACITY);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Newest line
    pub fn latest(&self) -> Option<&str> {
        self.lines.front().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }
}

/// Shared handle to the session console
///
/// Cloned into answer tasks and the image studio so late results can be
/// appended without going through the controller.
#[derive(Debug, Clone, Default)]
pub struct ConsoleLog {
    inner: Arc<Mutex<LogHistory>>,
}

impl ConsoleLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, LogHistory> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn push(&self, line: impl Into<String>) {
        self.lock().push(line);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Replace the whole history with a single line
    pub fn reset_to(&self, line: impl Into<String>) {
        let mut log = self.lock();
        log.clear();
        log.push(line);
    }

    pub fn snapshot(&self) -> LogHistory {
        self.lock().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lock().to_vec()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_first() {
        let mut log = LogHistory::new();
        log.push("a");
        log.push("b");
        assert_eq!(log.to_vec(), vec!["b", "a"]);
        assert_eq!(log.latest(), Some("b"));
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut log = LogHistory::new();
        for i in 0..12 {
            log.push(format!("line {}", i));
        }
        assert_eq!(log.len(), LOG_CAPACITY);
        assert_eq!(log.latest(), Some("line 11"));
        assert_eq!(log.iter().last(), Some("line 3"));
    }

    #[test]
    fn test_console_clones_share_history() {
        let console = ConsoleLog::new();
        let task_side = console.clone();
        task_side.push("from task");
        assert_eq!(console.lines(), vec!["from task"]);

        console.reset_to("fresh");
        assert_eq!(task_side.lines(), vec!["fresh"]);
    }
}
