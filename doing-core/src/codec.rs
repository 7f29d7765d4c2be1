//! Reads and writes the plain-text journal file.
//!
//! Layout:
//! ```text
//! Currently:
//! 	- 2025-08-15 12:34 | Write report @work
//! 		a note line
//! Later:
//! 	- 2025-08-14 09:00 | Call the bank
//! ```

use crate::entry::Entry;
use crate::error::{DoingError, DoingResult};
use crate::journal::Journal;
use crate::timestamp;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static ENTRY_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*- (\d{4}-\d{2}-\d{2} \d{2}:\d{2}) \| ?(.*)$").unwrap()
});
static SECTION_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\S[^:]*):\s*$").unwrap());

const ENTRY_INDENT: &str = "\t";
const NOTE_INDENT: &str = "\t\t";

/// Parses a whole journal file.
///
/// Entries found before the first header go to `default_section`, which is
/// also appended at the end if the file never mentions it.
pub fn decode(raw: &str, default_section: &str) -> DoingResult<Journal> {
    let mut journal = Journal::without_sections(default_section);
    let mut section: Option<String> = None;
    let mut last_entry = None;

    for (idx, line) in raw.lines().enumerate() {
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }

        if let Some(caps) = ENTRY_LINE.captures(line) {
            let stamp = timestamp::parse(&caps[1]).map_err(|e| match e {
                DoingError::Format { message, .. } => DoingError::format_at(line_no, message),
                other => other,
            })?;
            let entry = Entry::new(stamp, &caps[2]);
            let target = section.get_or_insert_with(|| default_section.to_string());
            last_entry = Some(journal.add_entry(target, entry, false));
            continue;
        }

        if let Some(caps) = SECTION_HEADER.captures(line) {
            let name = caps[1].trim_end().to_string();
            journal.add_section(&name);
            section = Some(name);
            last_entry = None;
            continue;
        }

        let is_indented = line.starts_with(char::is_whitespace);
        match last_entry.and_then(|id| journal.entry_mut(id)) {
            Some(entry) if is_indented => entry.notes.push(line.trim().to_string()),
            _ => {
                return Err(DoingError::format_at(
                    line_no,
                    format!("expected a section header or an entry, found `{}`", line.trim()),
                ));
            }
        }
    }

    journal.ensure_current_section();
    debug!(
        sections = journal.sections().count(),
        entries = journal.entries().count(),
        "decoded journal"
    );
    Ok(journal)
}

/// Serializes the journal. `decode(&encode(j), ..) == j` for any journal the
/// engine produces.
pub fn encode(journal: &Journal) -> String {
    let mut out = String::new();
    for section in journal.sections() {
        out.push_str(section.name());
        out.push_str(":\n");
        for entry in &section.entries {
            out.push_str(&format_entry_line(entry));
            out.push('\n');
            for note in &entry.notes {
                out.push_str(NOTE_INDENT);
                out.push_str(note);
                out.push('\n');
            }
        }
    }
    out
}

/// Whether `line` would be read back as an entry rather than a note or header.
pub(crate) fn is_entry_line(line: &str) -> bool {
    ENTRY_LINE.is_match(line)
}

/// `\t- 2025-08-15 12:34 | subject`
pub fn format_entry_line(entry: &Entry) -> String {
    format!(
        "{ENTRY_INDENT}- {} | {}",
        timestamp::format(&entry.timestamp),
        entry.subject
    )
}
