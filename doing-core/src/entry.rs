use crate::tags::{self, Tag};
use crate::timestamp;
use chrono::{DateTime, Duration, Local};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Name of the tag that marks an entry as finished.
pub const DONE_TAG: &str = "done";

static NEXT_ENTRY_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque in-memory identity of an entry.
///
/// The text format has no keys, so ids are minted when an entry is created or
/// decoded and are never written to disk. Two entries with the same subject and
/// timestamp still have different ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(u64);

impl EntryId {
    fn next() -> Self {
        EntryId(NEXT_ENTRY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// One journal line (plus its note lines).
#[derive(Debug, Clone)]
pub struct Entry {
    id: EntryId,
    pub timestamp: DateTime<Local>,
    /// Text after the separator, tag markers included.
    pub subject: String,
    pub notes: Vec<String>,
}

impl Entry {
    pub fn new(timestamp: DateTime<Local>, subject: impl Into<String>) -> Self {
        Self {
            id: EntryId::next(),
            timestamp,
            subject: subject.into(),
            notes: Vec::new(),
        }
    }

    pub fn with_notes(mut self, notes: Vec<String>) -> Self {
        self.notes = notes;
        self
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn tags(&self) -> Vec<Tag> {
        tags::extract(&self.subject)
    }

    pub fn has_tag(&self, name: &str) -> bool {
        tags::has_tag(&self.subject, name)
    }

    pub fn tag_value(&self, name: &str) -> Option<String> {
        tags::tag_value(&self.subject, name)
    }

    pub fn is_done(&self) -> bool {
        self.has_tag(DONE_TAG)
    }

    /// Completion time carried by the `@done(...)` marker.
    ///
    /// `None` for unfinished entries and for cancelled ones (bare `@done`).
    pub fn done_at(&self) -> Option<DateTime<Local>> {
        self.tag_value(DONE_TAG)
            .and_then(|value| timestamp::parse(&value).ok())
    }

    /// Marks the entry done. `None` records a cancellation (no timestamp).
    pub fn finish(&mut self, at: Option<DateTime<Local>>) {
        let value = at.map(|t| timestamp::format(&t));
        self.subject = tags::set_tag(&self.subject, DONE_TAG, value.as_deref());
    }

    /// Subject with the done marker stripped and every other tag kept.
    pub fn unfinished_subject(&self) -> String {
        tags::remove_tag(&self.subject, DONE_TAG)
    }

    /// Time between starting and finishing the entry.
    pub fn interval(&self) -> Option<Duration> {
        self.done_at().map(|done| done - self.timestamp)
    }

    /// Whether the subject or any note contains `needle` (already lowercased).
    pub(crate) fn contains_lowercase(&self, needle: &str) -> bool {
        self.subject.to_lowercase().contains(needle)
            || self.notes.iter().any(|n| n.to_lowercase().contains(needle))
    }
}

// Ids are not part of equality.
impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.timestamp == other.timestamp
            && self.subject == other.subject
            && self.notes == other.notes
    }
}

impl Eq for Entry {}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", timestamp::format(&self.timestamp), self.subject)
    }
}
