//! `@tag` and `@tag(value)` markers embedded in entry subjects.
//!
//! Tags are never stored apart from the subject text: every function here
//! re-scans the text it is given.

use crate::error::{DoingError, DoingResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

static TAG_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@(\w+)(?:\(([^()]*)\))?").unwrap());

/// A tag found in a subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub value: Option<String>,
}

impl Tag {
    pub fn new(name: impl Into<String>, value: Option<String>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Rejects tags that would not scan back out of a subject unchanged.
    pub fn validate(&self) -> DoingResult<()> {
        if self.name.is_empty() || !self.name.chars().all(is_word_char) {
            return Err(DoingError::Argument(format!(
                "`{}` is not a valid tag name",
                self.name
            )));
        }
        match self.value.as_deref() {
            Some(value) if value.contains(['(', ')', '\n', '\r']) => {
                Err(DoingError::Argument(format!(
                    "tag values cannot contain parentheses or line breaks: @{}({value})",
                    self.name
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Position of one marker inside the subject.
struct Marker<'a> {
    name: &'a str,
    value: Option<&'a str>,
    span: Range<usize>,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn markers(subject: &str) -> impl Iterator<Item = Marker<'_>> {
    TAG_MARKER.captures_iter(subject).filter_map(move |caps| {
        let whole = caps.get(0)?;
        // `me@example.com` is an address, not a tag.
        if subject[..whole.start()]
            .chars()
            .next_back()
            .is_some_and(is_word_char)
        {
            return None;
        }
        Some(Marker {
            name: caps.get(1)?.as_str(),
            value: caps.get(2).map(|v| v.as_str()),
            span: whole.range(),
        })
    })
}

fn find<'a>(subject: &'a str, name: &str) -> Option<Marker<'a>> {
    markers(subject).find(|m| m.name == name)
}

/// Renders a marker: `@name` or `@name(value)`.
pub fn format_tag(name: &str, value: Option<&str>) -> String {
    match value {
        Some(v) => format!("@{name}({v})"),
        None => format!("@{name}"),
    }
}

/// Every tag in `subject`, left to right, duplicates included.
pub fn extract(subject: &str) -> Vec<Tag> {
    markers(subject)
        .map(|m| Tag::new(m.name, m.value.map(str::to_string)))
        .collect()
}

pub fn has_tag(subject: &str, name: &str) -> bool {
    find(subject, name).is_some()
}

/// Value of the first `name` marker. `None` when the tag is missing or bare.
pub fn tag_value(subject: &str, name: &str) -> Option<String> {
    find(subject, name).and_then(|m| m.value.map(str::to_string))
}

/// Replaces the first `name` marker in place, or appends a new one.
///
/// ```
/// # use doing_core::tags::set_tag;
/// let s = set_tag("Write report @work", "done", Some("2025-08-15 12:00"));
/// assert_eq!(s, "Write report @work @done(2025-08-15 12:00)");
/// assert_eq!(set_tag(&s, "done", None), "Write report @work @done");
/// ```
pub fn set_tag(subject: &str, name: &str, value: Option<&str>) -> String {
    let marker = format_tag(name, value);
    match find(subject, name) {
        Some(m) => {
            let mut out = String::with_capacity(subject.len() + marker.len());
            out.push_str(&subject[..m.span.start]);
            out.push_str(&marker);
            out.push_str(&subject[m.span.end..]);
            out
        }
        None => {
            let base = subject.trim_end();
            if base.is_empty() {
                marker
            } else {
                format!("{base} {marker}")
            }
        }
    }
}

/// Deletes the first `name` marker along with the whitespace it leaves behind.
pub fn remove_tag(subject: &str, name: &str) -> String {
    let Some(m) = find(subject, name) else {
        return subject.to_string();
    };
    let before = &subject[..m.span.start];
    let after = subject[m.span.end..].trim_start();
    if after.is_empty() {
        before.trim_end().to_string()
    } else {
        format!("{before}{after}")
    }
}
