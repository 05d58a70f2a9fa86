//! User-facing message log.
//!
//! Operations that repair a document on the user's behalf (the fragment
//! sweep, for one) record what they did here so a front end can show it.
//! Every entry is also emitted as a `tracing` event.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub level: Level,
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    entries: Vec<Message>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: Level, text: impl Into<String>) {
        let text = text.into();
        match level {
            Level::Info => tracing::info!(target: "sketchcrab::log", "{text}"),
            Level::Warning => tracing::warn!(target: "sketchcrab::log", "{text}"),
            Level::Error => tracing::error!(target: "sketchcrab::log", "{text}"),
        }
        self.entries.push(Message { level, text });
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push(Level::Info, text);
    }

    pub fn warn(&mut self, text: impl Into<String>) {
        self.push(Level::Warning, text);
    }

    pub fn entries(&self) -> &[Message] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns and forgets everything logged so far.
    pub fn drain(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_keep_order_and_level() {
        let mut log = MessageLog::new();
        log.info("one");
        log.warn("two");
        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[1].level, Level::Warning);
        let drained = log.drain();
        assert_eq!(drained[0].text, "one");
        assert!(log.is_empty());
    }
}
