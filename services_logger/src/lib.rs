//! # Activity Log
//!
//! This crate records what users did to the namespace.
//!
//! ## Philosophy
//!
//! Logging is explicit and structured, not text-based or printf-style.
//! Every mutation produces one `ActivityEntry`, whether it succeeded,
//! partially succeeded or failed. Entries are also emitted as `tracing`
//! events so they show up in the process log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use uuid::Uuid;

/// Number of entries kept when no capacity is given
pub const DEFAULT_CAPACITY: usize = 500;

/// Unique identifier for an activity entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActivityId(Uuid);

impl ActivityId {
    /// Creates a new unique activity ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ActivityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "activity:{}", self.0)
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    /// Debug information
    Debug,
    /// Informational messages
    Info,
    /// Warnings
    Warn,
    /// Errors
    Error,
}

/// What was done
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    CreateFolder,
    Upload,
    Download,
    Delete,
    Rename,
    Copy,
    Move,
    Paste,
    AttachLink,
    RemoveLink,
    Login,
    Logout,
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ActivityAction::CreateFolder => "create_folder",
            ActivityAction::Upload => "upload",
            ActivityAction::Download => "download",
            ActivityAction::Delete => "delete",
            ActivityAction::Rename => "rename",
            ActivityAction::Copy => "copy",
            ActivityAction::Move => "move",
            ActivityAction::Paste => "paste",
            ActivityAction::AttachLink => "attach_link",
            ActivityAction::RemoveLink => "remove_link",
            ActivityAction::Login => "login",
            ActivityAction::Logout => "logout",
        };
        f.write_str(label)
    }
}

/// How it ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum ActivityOutcome {
    /// Everything the action set out to do happened
    Success,
    /// Some constituent steps took effect; cleanup may be needed
    Partial(String),
    /// Nothing took effect
    Failed(String),
}

impl ActivityOutcome {
    /// Level the outcome is logged at
    pub fn level(&self) -> LogLevel {
        match self {
            ActivityOutcome::Success => LogLevel::Info,
            ActivityOutcome::Partial(_) => LogLevel::Warn,
            ActivityOutcome::Failed(_) => LogLevel::Error,
        }
    }

    /// Returns true for `Success`
    pub fn is_success(&self) -> bool {
        matches!(self, ActivityOutcome::Success)
    }
}

impl fmt::Display for ActivityOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityOutcome::Success => write!(f, "ok"),
            ActivityOutcome::Partial(detail) => write!(f, "partial: {}", detail),
            ActivityOutcome::Failed(detail) => write!(f, "failed: {}", detail),
        }
    }
}

/// A structured activity record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// Unique identifier
    pub id: ActivityId,
    /// What was done
    pub action: ActivityAction,
    /// Display path the action targeted
    pub path: String,
    /// Who did it (`email` or `anonymous`)
    pub actor: String,
    /// How it ended
    pub outcome: ActivityOutcome,
    /// When it was recorded
    pub timestamp: DateTime<Utc>,
    /// Extra structured fields, in insertion order
    pub fields: Vec<(String, String)>,
}

impl ActivityEntry {
    /// Creates a successful entry stamped now
    pub fn new(action: ActivityAction, path: impl Into<String>, actor: impl Into<String>) -> Self {
        Self {
            id: ActivityId::new(),
            action,
            path: path.into(),
            actor: actor.into(),
            outcome: ActivityOutcome::Success,
            timestamp: Utc::now(),
            fields: Vec::new(),
        }
    }

    /// Sets the outcome
    pub fn with_outcome(mut self, outcome: ActivityOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    /// Adds a field to the entry
    pub fn with_field(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.fields.push((key.into(), value.to_string()));
        self
    }

    /// Gets a field value by key
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Level this entry is logged at
    pub fn level(&self) -> LogLevel {
        self.outcome.level()
    }

    fn emit(&self) {
        let fields = self
            .fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ");
        match self.level() {
            LogLevel::Debug => tracing::debug!(
                action = %self.action, path = %self.path, actor = %self.actor,
                outcome = %self.outcome, fields = %fields, "activity"
            ),
            LogLevel::Info => tracing::info!(
                action = %self.action, path = %self.path, actor = %self.actor,
                outcome = %self.outcome, fields = %fields, "activity"
            ),
            LogLevel::Warn => tracing::warn!(
                action = %self.action, path = %self.path, actor = %self.actor,
                outcome = %self.outcome, fields = %fields, "activity"
            ),
            LogLevel::Error => tracing::error!(
                action = %self.action, path = %self.path, actor = %self.actor,
                outcome = %self.outcome, fields = %fields, "activity"
            ),
        }
    }
}

impl fmt::Display for ActivityEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} [{}]",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.actor,
            self.action,
            self.path,
            self.outcome
        )?;
        for (key, value) in &self.fields {
            write!(f, " {}={}", key, value)?;
        }
        Ok(())
    }
}

/// Bounded in-memory activity log, oldest entries evicted first
#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: VecDeque<ActivityEntry>,
    capacity: usize,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityLog {
    /// Creates a log holding up to `DEFAULT_CAPACITY` entries
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a log holding up to `capacity` entries (at least one)
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Records an entry and emits it as a tracing event
    pub fn record(&mut self, entry: ActivityEntry) -> ActivityId {
        entry.emit();
        let id = entry.id;
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
        id
    }

    /// All retained entries, oldest first
    pub fn entries(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter()
    }

    /// The last `n` entries, oldest first
    pub fn recent(&self, n: usize) -> Vec<&ActivityEntry> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).collect()
    }

    /// Entries that targeted a path
    pub fn for_path(&self, path: &str) -> Vec<&ActivityEntry> {
        self.entries.iter().filter(|e| e.path == path).collect()
    }

    /// Number of retained entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks if the log is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn test_entry_creation() {
        let entry = ActivityEntry::new(ActivityAction::Upload, "/a.txt", "admin@example.com");
        assert_eq!(entry.action, ActivityAction::Upload);
        assert_eq!(entry.path, "/a.txt");
        assert!(entry.outcome.is_success());
        assert_eq!(entry.level(), LogLevel::Info);
        assert!(entry.fields.is_empty());
    }

    #[test]
    fn test_entry_with_fields() {
        let entry = ActivityEntry::new(ActivityAction::Delete, "/Docs/", "a")
            .with_field("deleted", 3)
            .with_field("failed", 1)
            .with_outcome(ActivityOutcome::Partial("1 of 4 failed".to_string()));

        assert_eq!(entry.fields[0].0, "deleted");
        assert_eq!(entry.field("failed"), Some("1"));
        assert_eq!(entry.field("missing"), None);
        assert_eq!(entry.level(), LogLevel::Warn);
    }

    #[test]
    fn test_entry_display() {
        let entry = ActivityEntry::new(ActivityAction::Rename, "/a.txt", "a@x.com")
            .with_field("to", "/b.txt");
        let text = entry.to_string();
        assert!(text.ends_with("a@x.com rename /a.txt [ok] to=/b.txt"));
    }

    #[test]
    fn test_outcome_serializes_tagged() {
        let json = serde_json::to_value(ActivityOutcome::Failed("denied".to_string())).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["detail"], "denied");
    }

    #[test]
    fn test_log_evicts_oldest() {
        let mut log = ActivityLog::with_capacity(2);
        log.record(ActivityEntry::new(ActivityAction::Upload, "/1", "a"));
        log.record(ActivityEntry::new(ActivityAction::Upload, "/2", "a"));
        log.record(ActivityEntry::new(ActivityAction::Upload, "/3", "a"));

        let paths: Vec<&str> = log.entries().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["/2", "/3"]);
    }

    #[test]
    fn test_recent_and_for_path() {
        let mut log = ActivityLog::new();
        log.record(ActivityEntry::new(ActivityAction::Upload, "/a", "x"));
        log.record(ActivityEntry::new(ActivityAction::Delete, "/b", "x"));
        log.record(ActivityEntry::new(ActivityAction::Download, "/a", "x"));

        assert_eq!(log.recent(2)[0].path, "/b");
        assert_eq!(log.recent(10).len(), 3);
        assert_eq!(log.for_path("/a").len(), 2);

        log.clear();
        assert!(log.is_empty());
    }
}
