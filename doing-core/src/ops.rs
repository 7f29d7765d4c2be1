//! Operations that change the journal.
//!
//! Each one works on a journal in memory and reports what it did as a list of
//! messages. Saving is left to the caller (see [`crate::Doing::apply`]).

use crate::codec;
use crate::config::Config;
use crate::entry::{Entry, EntryId};
use crate::error::{DoingError, DoingResult};
use crate::journal::{Journal, validate_section_name};
use crate::query::{Search, TagFilter};
use crate::tags::{self, Tag};
use crate::timestamp::{self, parse_relative, round_to_minute};
use chrono::{DateTime, Local};
use std::cmp::Reverse;
use tracing::info;

/// Values every operation needs besides the journal itself.
#[derive(Debug, Clone)]
pub struct OpContext {
    /// "Now", already truncated to the minute.
    pub now: DateTime<Local>,
    pub later_section: String,
    pub archive_section: String,
}

impl OpContext {
    pub fn new(config: &Config, now: DateTime<Local>) -> Self {
        Self {
            now: round_to_minute(now),
            later_section: config.later_section.clone(),
            archive_section: config.archive_section.clone(),
        }
    }
}

/// What an operation did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Human-readable report lines, in the order things happened.
    pub messages: Vec<String>,
    /// Whether the journal needs saving.
    pub changed: bool,
}

impl Outcome {
    fn say(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    fn changed(&mut self, message: impl Into<String>) {
        self.changed = true;
        self.say(message);
    }
}

#[derive(Debug, Clone, Default)]
pub struct NowOptions {
    /// Target section; must exist. Defaults to the current section.
    pub section: Option<String>,
    /// Backdate offset such as `20m`.
    pub back: Option<String>,
    /// Finish the section's previous front entry first.
    pub finish_last: bool,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DoneOptions {
    pub section: Option<String>,
    pub back: Option<String>,
    /// Without a subject, finish the most recent unfinished entry with these tags.
    pub tags: Option<TagFilter>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FinishOptions {
    pub section: Option<String>,
    pub tags: Option<TagFilter>,
    /// How many entries to finish, most recent first.
    pub count: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct CancelOptions {
    pub section: Option<String>,
    pub tags: Option<TagFilter>,
}

#[derive(Debug, Clone, Default)]
pub struct ResumeOptions {
    /// Where to look for the entry to repeat. All sections when absent.
    pub section: Option<String>,
    pub tags: Option<TagFilter>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ArchiveOptions {
    pub source: Option<String>,
    pub tags: Option<TagFilter>,
    pub search: Option<Search>,
    /// Leave this many of the most recent matches in each source.
    pub keep: Option<usize>,
    /// Destination; defaults to the configured archive section.
    pub target: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TagOptions {
    pub section: Option<String>,
    /// Number of most recent entries to tag. Defaults to one.
    pub count: Option<usize>,
    pub remove: bool,
}

/// Resolves the section an operation acts on.
fn target_section(journal: &Journal, requested: Option<&str>) -> DoingResult<String> {
    match requested {
        None => Ok(journal.current_section().to_string()),
        Some(name) if name.trim().is_empty() => Err(DoingError::Argument(
            "a section name is required".to_string(),
        )),
        Some(name) => journal
            .resolve_section(name.trim())
            .map(str::to_string)
            .ok_or_else(|| DoingError::NotFound(format!("section \"{name}\" does not exist"))),
    }
}

fn entry_text(subject: &str) -> DoingResult<&str> {
    let subject = subject.trim();
    if subject.is_empty() {
        return Err(DoingError::Argument("no entry text given".to_string()));
    }
    if subject.contains(['\n', '\r']) {
        return Err(DoingError::Argument("entry text cannot span lines".to_string()));
    }
    Ok(subject)
}

fn start_time(ctx: &OpContext, back: Option<&str>) -> DoingResult<DateTime<Local>> {
    match back {
        Some(offset) => parse_relative(offset, ctx.now),
        None => Ok(ctx.now),
    }
}

fn note_lines(note: Option<&str>) -> DoingResult<Vec<String>> {
    let Some(note) = note else {
        return Ok(Vec::new());
    };
    let lines: Vec<String> = note
        .split(['\n', '\r'])
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
    if let Some(line) = lines.iter().find(|l| codec::is_entry_line(l)) {
        return Err(DoingError::Argument(format!(
            "note line would be read back as an entry: {line}"
        )));
    }
    Ok(lines)
}

fn check_count(count: Option<usize>) -> DoingResult<()> {
    if count == Some(0) {
        return Err(DoingError::Argument("count must be at least 1".to_string()));
    }
    Ok(())
}

fn matches(filter: Option<&TagFilter>, entry: &Entry) -> bool {
    filter.is_none_or(|f| f.matches(entry))
}

fn add_new_entry(journal: &mut Journal, section: &str, entry: Entry, outcome: &mut Outcome) {
    let message = format!("Added \"{}\" to {section}", entry.subject);
    journal.add_entry(section, entry, true);
    info!(section, "added entry");
    outcome.changed(message);
}

fn finish_entry(journal: &mut Journal, id: EntryId, at: Option<DateTime<Local>>) -> Option<String> {
    let entry = journal.entry_mut(id)?;
    entry.finish(at);
    info!(cancelled = at.is_none(), "finished entry");
    Some(entry.unfinished_subject())
}

/// Starts a new entry.
pub fn now(
    journal: &mut Journal,
    ctx: &OpContext,
    subject: &str,
    opts: &NowOptions,
) -> DoingResult<Outcome> {
    let section = target_section(journal, opts.section.as_deref())?;
    let subject = entry_text(subject)?;
    let timestamp = start_time(ctx, opts.back.as_deref())?;
    let notes = note_lines(opts.note.as_deref())?;
    let mut outcome = Outcome::default();

    if opts.finish_last {
        let front = journal
            .section(&section)?
            .front()
            .filter(|e| !e.is_done())
            .map(Entry::id);
        if let Some(id) = front {
            if let Some(title) = finish_entry(journal, id, Some(ctx.now)) {
                outcome.changed(format!("Marked \"{title}\" @done"));
            }
        }
    }

    let entry = Entry::new(timestamp, subject).with_notes(notes);
    add_new_entry(journal, &section, entry, &mut outcome);
    Ok(outcome)
}

/// Adds an entry to the later section, creating it on first use.
pub fn later(
    journal: &mut Journal,
    ctx: &OpContext,
    subject: &str,
    back: Option<&str>,
    note: Option<&str>,
) -> DoingResult<Outcome> {
    let subject = entry_text(subject)?;
    let timestamp = start_time(ctx, back)?;
    let notes = note_lines(note)?;
    let later = validate_section_name(&ctx.later_section)?;
    let mut outcome = Outcome::default();

    if journal.add_section(later) {
        outcome.changed(format!("Added section \"{later}\""));
    }
    let entry = Entry::new(timestamp, subject).with_notes(notes);
    add_new_entry(journal, later, entry, &mut outcome);
    Ok(outcome)
}

/// Records a finished entry, or finishes an existing one when `subject` is `None`.
pub fn done(
    journal: &mut Journal,
    ctx: &OpContext,
    subject: Option<&str>,
    opts: &DoneOptions,
) -> DoingResult<Outcome> {
    let section = target_section(journal, opts.section.as_deref())?;
    let at = start_time(ctx, opts.back.as_deref())?;
    let mut outcome = Outcome::default();

    if let Some(subject) = subject {
        let subject = entry_text(subject)?;
        let finished = tags::set_tag(subject, "done", Some(&timestamp::format(&at)));
        let entry = Entry::new(at, finished).with_notes(note_lines(opts.note.as_deref())?);
        add_new_entry(journal, &section, entry, &mut outcome);
        return Ok(outcome);
    }

    let bucket = journal.section(&section)?;
    let id = match &opts.tags {
        Some(filter) => bucket
            .entries
            .iter()
            .find(|e| !e.is_done() && filter.matches(e))
            .map(Entry::id)
            .ok_or_else(|| {
                DoingError::NotFound(format!("no unfinished entry in {section} matches the tags"))
            })?,
        None => {
            let front = bucket
                .front()
                .ok_or_else(|| DoingError::NotFound(format!("section \"{section}\" is empty")))?;
            if front.is_done() {
                outcome.say(format!("\"{}\" is already @done", front.unfinished_subject()));
                return Ok(outcome);
            }
            front.id()
        }
    };

    if let Some(title) = finish_entry(journal, id, Some(at)) {
        outcome.changed(format!("Marked \"{title}\" @done"));
    }
    Ok(outcome)
}

/// Finishes unfinished entries, most recent first.
///
/// With a tag filter every match is finished unless `count` says otherwise;
/// without one only the newest entry (or the newest `count`).
pub fn finish(journal: &mut Journal, ctx: &OpContext, opts: &FinishOptions) -> DoingResult<Outcome> {
    check_count(opts.count)?;
    let section = target_section(journal, opts.section.as_deref())?;
    let limit = opts
        .count
        .unwrap_or(if opts.tags.is_some() { usize::MAX } else { 1 });

    let ids: Vec<EntryId> = journal
        .section(&section)?
        .entries
        .iter()
        .filter(|e| !e.is_done() && matches(opts.tags.as_ref(), e))
        .take(limit)
        .map(Entry::id)
        .collect();
    if ids.is_empty() {
        return Err(DoingError::NotFound(format!(
            "no unfinished entries to finish in {section}"
        )));
    }

    let mut outcome = Outcome::default();
    for id in ids {
        if let Some(title) = finish_entry(journal, id, Some(ctx.now)) {
            outcome.changed(format!("Marked \"{title}\" @done"));
        }
    }
    Ok(outcome)
}

/// Marks the most recent unfinished entry `@done` without a time.
pub fn cancel(journal: &mut Journal, opts: &CancelOptions) -> DoingResult<Outcome> {
    let section = target_section(journal, opts.section.as_deref())?;
    let id = journal
        .section(&section)?
        .entries
        .iter()
        .find(|e| !e.is_done() && matches(opts.tags.as_ref(), e))
        .map(Entry::id)
        .ok_or_else(|| DoingError::NotFound(format!("no unfinished entry to cancel in {section}")))?;

    let mut outcome = Outcome::default();
    if let Some(title) = finish_entry(journal, id, None) {
        outcome.changed(format!("Cancelled \"{title}\""));
    }
    Ok(outcome)
}

/// Repeats the most recent (matching) entry as a new, unfinished one.
///
/// An unfinished original is finished now; a finished one is left alone. The
/// copy loses its `@done` marker but keeps every other tag.
pub fn resume(journal: &mut Journal, ctx: &OpContext, opts: &ResumeOptions) -> DoingResult<Outcome> {
    let scope = match opts.section.as_deref() {
        Some(name) => Some(target_section(journal, Some(name))?),
        None => None,
    };
    let (id, was_done, subject) = journal
        .entries()
        .filter(|(section, _)| scope.as_deref().is_none_or(|s| s == *section))
        .filter(|(_, e)| matches(opts.tags.as_ref(), e))
        .min_by_key(|(_, e)| Reverse(e.timestamp))
        .map(|(_, e)| (e.id(), e.is_done(), e.unfinished_subject()))
        .ok_or_else(|| DoingError::NotFound("no entry to resume".to_string()))?;
    let notes = note_lines(opts.note.as_deref())?;

    let mut outcome = Outcome::default();
    if !was_done {
        if let Some(title) = finish_entry(journal, id, Some(ctx.now)) {
            outcome.changed(format!("Marked \"{title}\" @done"));
        }
    }

    let current = journal.current_section().to_string();
    let entry = Entry::new(ctx.now, subject).with_notes(notes);
    add_new_entry(journal, &current, entry, &mut outcome);
    Ok(outcome)
}

/// Moves matching entries into the archive section.
///
/// Sources: the given section; otherwise every section but the target when a
/// tag or search filter is set; otherwise the current section.
pub fn archive(journal: &mut Journal, ctx: &OpContext, opts: &ArchiveOptions) -> DoingResult<Outcome> {
    let target = validate_section_name(opts.target.as_deref().unwrap_or(&ctx.archive_section))?;
    let target = journal.resolve_section(target).unwrap_or(target).to_string();

    let sources: Vec<String> = match opts.source.as_deref() {
        Some(name) => {
            let source = target_section(journal, Some(name))?;
            if source == target {
                return Err(DoingError::Argument(format!(
                    "cannot archive {source} into itself"
                )));
            }
            vec![source]
        }
        None if opts.tags.is_some() || opts.search.is_some() => journal
            .section_names()
            .filter(|name| *name != target)
            .map(str::to_string)
            .collect(),
        None if journal.current_section() == target => Vec::new(),
        None => vec![journal.current_section().to_string()],
    };

    let keep = opts.keep.unwrap_or(0);
    let mut outcome = Outcome::default();
    for source in sources {
        let ids: Vec<EntryId> = journal
            .section(&source)?
            .entries
            .iter()
            .filter(|e| {
                matches(opts.tags.as_ref(), e) && opts.search.as_ref().is_none_or(|s| s.matches(e))
            })
            .skip(keep)
            .map(Entry::id)
            .collect();
        if ids.is_empty() {
            continue;
        }

        if journal.add_section(&target) {
            outcome.changed(format!("Added section \"{target}\""));
        }
        // oldest first, so the newest ends up at the front of the target
        for id in ids.iter().rev() {
            journal.move_entry(*id, &source, &target)?;
        }
        info!(from = %source, to = %target, count = ids.len(), "archived entries");
        outcome.changed(format!(
            "Archived {} items from {source} to {target}",
            ids.len()
        ));
    }

    if !outcome.changed {
        outcome.say("No entries to archive");
    }
    Ok(outcome)
}

/// Creates a section. Existing sections are left alone unless `fail_if_exists`.
pub fn add_section(journal: &mut Journal, name: &str, fail_if_exists: bool) -> DoingResult<Outcome> {
    let name = validate_section_name(name)?;

    let mut outcome = Outcome::default();
    if journal.add_section(name) {
        info!(section = name, "added section");
        outcome.changed(format!("Added section \"{name}\""));
    } else if fail_if_exists {
        return Err(DoingError::Argument(format!("section \"{name}\" already exists")));
    } else {
        outcome.say(format!("Section \"{name}\" already exists"));
    }
    Ok(outcome)
}

/// Adds (or removes) tags on the most recent entries of a section.
pub fn tag(journal: &mut Journal, to_apply: &[Tag], opts: &TagOptions) -> DoingResult<Outcome> {
    check_count(opts.count)?;
    if to_apply.is_empty() {
        return Err(DoingError::Argument("no tags given".to_string()));
    }
    to_apply.iter().try_for_each(Tag::validate)?;
    let section = target_section(journal, opts.section.as_deref())?;
    let bucket = journal.section_mut(&section, false)?;
    if bucket.is_empty() {
        return Err(DoingError::NotFound(format!("section \"{section}\" is empty")));
    }

    let mut outcome = Outcome::default();
    for entry in bucket.entries.iter_mut().take(opts.count.unwrap_or(1)) {
        for t in to_apply {
            let before = entry.subject.clone();
            let marker = tags::format_tag(&t.name, t.value.as_deref());
            if opts.remove {
                entry.subject = tags::remove_tag(&entry.subject, &t.name);
                if entry.subject != before {
                    outcome.changed(format!("Removed @{} from \"{before}\"", t.name));
                }
            } else {
                entry.subject = tags::set_tag(&entry.subject, &t.name, t.value.as_deref());
                if entry.subject != before {
                    outcome.changed(format!("Added {marker} to \"{before}\""));
                }
            }
        }
    }
    if !outcome.changed {
        outcome.say("No tags changed");
    }
    Ok(outcome)
}
