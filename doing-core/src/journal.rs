//! The in-memory journal document: an ordered map of sections and the
//! entry-level operations the rest of the engine is built on.

use crate::entry::{Entry, EntryId};
use crate::error::{DoingError, DoingResult};
use indexmap::IndexMap;
use indexmap::map::Entry as MapEntry;

/// Trims `name` and checks it can be written as a `Name:` header and read back.
pub fn validate_section_name(name: &str) -> DoingResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DoingError::Argument("a section name is required".to_string()));
    }
    if name.contains([':', '\n', '\r']) {
        return Err(DoingError::Argument(format!(
            "section names cannot contain `:` or line breaks: {name}"
        )));
    }
    Ok(name)
}

/// A named bucket of entries, newest first by convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: String,
    pub entries: Vec<Entry>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recently added entry.
    pub fn front(&self) -> Option<&Entry> {
        self.entries.first()
    }

    pub fn position(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|e| e.id() == id)
    }

    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id() == id)
    }

    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.id() == id)
    }

    pub fn insert(&mut self, entry: Entry, at_front: bool) {
        if at_front {
            self.entries.insert(0, entry);
        } else {
            self.entries.push(entry);
        }
    }
}

/// The whole journal file, parsed.
///
/// `current_section` always names an existing section: constructors create it
/// and nothing removes sections.
#[derive(Debug, Clone)]
pub struct Journal {
    sections: IndexMap<String, Section>,
    current_section: String,
}

// `IndexMap` equality ignores order; section order is part of the file.
impl PartialEq for Journal {
    fn eq(&self, other: &Self) -> bool {
        self.current_section == other.current_section
            && self.sections.len() == other.sections.len()
            && self.sections.values().eq(other.sections.values())
    }
}

impl Eq for Journal {}

impl Journal {
    /// An empty journal holding only the current section.
    pub fn new(current_section: &str) -> Self {
        let mut journal = Self::without_sections(current_section);
        journal.ensure_current_section();
        journal
    }

    /// Used by the codec, which creates sections in file order and only then
    /// makes sure the current one exists.
    pub(crate) fn without_sections(current_section: &str) -> Self {
        Self {
            sections: IndexMap::new(),
            current_section: current_section.to_string(),
        }
    }

    pub(crate) fn ensure_current_section(&mut self) {
        let name = self.current_section.clone();
        self.add_section(&name);
    }

    pub fn current_section(&self) -> &str {
        &self.current_section
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    /// Finds the stored name for a user-supplied section name.
    ///
    /// An exact match wins; otherwise a case-insensitive match is accepted when
    /// it is unique (`later` finds `Later`).
    pub fn resolve_section(&self, name: &str) -> Option<&str> {
        if let Some((key, _)) = self.sections.get_key_value(name) {
            return Some(key.as_str());
        }
        let lower = name.to_lowercase();
        let mut candidates = self
            .sections
            .keys()
            .map(String::as_str)
            .filter(|k| k.to_lowercase() == lower);
        match (candidates.next(), candidates.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }

    pub fn section(&self, name: &str) -> DoingResult<&Section> {
        self.sections
            .get(name)
            .ok_or_else(|| DoingError::NotFound(format!("section \"{name}\" does not exist")))
    }

    /// Mutable lookup; with `create` a missing section is appended first.
    pub fn section_mut(&mut self, name: &str, create: bool) -> DoingResult<&mut Section> {
        if create {
            return Ok(self.sections.entry(name.to_string()).or_insert_with(|| Section::new(name)));
        }
        self.sections
            .get_mut(name)
            .ok_or_else(|| DoingError::NotFound(format!("section \"{name}\" does not exist")))
    }

    /// Appends an empty section. Returns `false` when it already existed.
    pub fn add_section(&mut self, name: &str) -> bool {
        match self.sections.entry(name.to_string()) {
            MapEntry::Occupied(_) => false,
            MapEntry::Vacant(slot) => {
                slot.insert(Section::new(name));
                true
            }
        }
    }

    /// Inserts into `section` (created if missing) and returns the entry's id.
    pub fn add_entry(&mut self, section: &str, entry: Entry, at_front: bool) -> EntryId {
        let id = entry.id();
        self.sections
            .entry(section.to_string())
            .or_insert_with(|| Section::new(section))
            .insert(entry, at_front);
        id
    }

    pub fn remove_entry(&mut self, section: &str, id: EntryId) -> DoingResult<Entry> {
        let bucket = self.section_mut(section, false)?;
        let pos = bucket.position(id).ok_or_else(|| {
            DoingError::NotFound(format!("entry is not in section \"{section}\""))
        })?;
        Ok(bucket.entries.remove(pos))
    }

    /// Moves one entry to the front of `to` (created if missing).
    pub fn move_entry(&mut self, id: EntryId, from: &str, to: &str) -> DoingResult<()> {
        let entry = self.remove_entry(from, id)?;
        self.add_entry(to, entry, true);
        Ok(())
    }

    /// Looks an entry up anywhere in the journal.
    pub fn find(&self, id: EntryId) -> Option<(&str, &Entry)> {
        self.sections
            .values()
            .find_map(|s| s.get(id).map(|e| (s.name(), e)))
    }

    pub fn entry_mut(&mut self, id: EntryId) -> Option<&mut Entry> {
        self.sections.values_mut().find_map(|s| s.get_mut(id))
    }

    /// Every entry with the name of its section, in file order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.sections
            .values()
            .flat_map(|s| s.entries.iter().map(move |e| (s.name(), e)))
    }
}
