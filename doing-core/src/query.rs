//! Selecting entries by section, tag and search text.

use crate::entry::Entry;
use crate::error::{DoingError, DoingResult};
use crate::journal::Journal;
use crate::tags::Tag;
use regex::{Regex, RegexBuilder};
use strum_macros::{AsRefStr, EnumString};

/// How the tags of a [`TagFilter`] combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TagBool {
    /// Every tag must be present.
    And,
    /// At least one tag must be present.
    #[default]
    Or,
    /// None of the tags may be present.
    Not,
}

/// A set of tags to match entries against.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagFilter {
    pub tags: Vec<Tag>,
    pub mode: TagBool,
}

impl TagFilter {
    /// Parses `tag1, @tag2 tag3(value)`. Leading `@` is optional.
    ///
    /// ```
    /// # use doing_core::query::{TagBool, TagFilter};
    /// let f = TagFilter::parse("@work, project(alpha)", TagBool::And).unwrap();
    /// assert_eq!(f.tags.len(), 2);
    /// assert_eq!(f.tags[1].value.as_deref(), Some("alpha"));
    /// ```
    pub fn parse(input: &str, mode: TagBool) -> DoingResult<Self> {
        let mut tags = Vec::new();
        for raw in input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            let raw = raw.strip_prefix('@').unwrap_or(raw);
            let (name, value) = match raw.split_once('(') {
                Some((name, rest)) => {
                    let value = rest.strip_suffix(')').ok_or_else(|| {
                        DoingError::Argument(format!("unbalanced parenthesis in tag `{raw}`"))
                    })?;
                    (name, Some(value.to_string()))
                }
                None => (raw, None),
            };
            let tag = Tag::new(name, value);
            tag.validate()?;
            tags.push(tag);
        }
        if tags.is_empty() {
            return Err(DoingError::Argument("no tags given".to_string()));
        }
        Ok(Self { tags, mode })
    }

    pub fn single(name: &str) -> Self {
        Self {
            tags: vec![Tag::new(name, None)],
            mode: TagBool::Or,
        }
    }

    pub fn matches(&self, entry: &Entry) -> bool {
        let present = |wanted: &Tag| match &wanted.value {
            None => entry.has_tag(&wanted.name),
            Some(value) => entry
                .tags()
                .iter()
                .any(|t| t.name == wanted.name && t.value.as_deref() == Some(value)),
        };
        match self.mode {
            TagBool::And => self.tags.iter().all(present),
            TagBool::Or => self.tags.iter().any(present),
            TagBool::Not => !self.tags.iter().any(present),
        }
    }
}

/// A text search: `/pattern/` is a case-insensitive regex, anything else a
/// case-insensitive substring.
#[derive(Debug, Clone)]
pub enum Search {
    Pattern(Regex),
    Substring(String),
}

impl Search {
    pub fn parse(input: &str) -> DoingResult<Self> {
        let trimmed = input.trim();
        let delimited = trimmed
            .strip_prefix('/')
            .and_then(|s| s.strip_suffix('/'))
            .filter(|s| !s.is_empty());
        match delimited {
            Some(pattern) => RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map(Search::Pattern)
                .map_err(|e| DoingError::Argument(format!("invalid search pattern: {e}"))),
            None if trimmed.is_empty() => {
                Err(DoingError::Argument("empty search text".to_string()))
            }
            None => Ok(Search::Substring(trimmed.to_lowercase())),
        }
    }

    /// Looks at the subject and every note line.
    pub fn matches(&self, entry: &Entry) -> bool {
        match self {
            Search::Pattern(re) => {
                re.is_match(&entry.subject) || entry.notes.iter().any(|n| re.is_match(n))
            }
            Search::Substring(needle) => entry.contains_lowercase(needle),
        }
    }
}

/// What [`show`] should select.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub section: Option<String>,
    pub tags: Option<TagFilter>,
    pub search: Option<Search>,
    pub count: Option<usize>,
}

impl Query {
    pub fn section(mut self, name: impl Into<String>) -> Self {
        self.section = Some(name.into());
        self
    }

    pub fn tags(mut self, filter: TagFilter) -> Self {
        self.tags = Some(filter);
        self
    }

    pub fn search(mut self, search: Search) -> Self {
        self.search = Some(search);
        self
    }

    pub fn count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Tag and search predicates only; section and count are applied by [`show`].
    pub fn matches(&self, entry: &Entry) -> bool {
        self.tags.as_ref().is_none_or(|f| f.matches(entry))
            && self.search.as_ref().is_none_or(|s| s.matches(entry))
    }
}

/// An entry selected by [`show`], with the section it lives in.
#[derive(Debug, Clone, Copy)]
pub struct Shown<'a> {
    pub section: &'a str,
    pub entry: &'a Entry,
}

/// Selects entries without touching the journal.
///
/// Sections are visited in file order (or only the requested one), entries
/// front-first, so the result is most recent first within each section. The
/// iterator is lazy; call `show` again to start over.
pub fn show<'a>(
    journal: &'a Journal,
    query: &Query,
) -> DoingResult<impl Iterator<Item = Shown<'a>> + use<'a>> {
    let only = match &query.section {
        Some(name) => Some(
            journal
                .resolve_section(name)
                .ok_or_else(|| DoingError::NotFound(format!("section \"{name}\" does not exist")))?,
        ),
        None => None,
    };
    let limit = query.count.unwrap_or(usize::MAX);
    let predicate = query.clone();

    Ok(journal
        .entries()
        .filter(move |(section, _)| only.is_none_or(|name| name == *section))
        .filter(move |(_, entry)| predicate.matches(entry))
        .map(|(section, entry)| Shown { section, entry })
        .take(limit))
}

/// Most recent entry of the current section, optionally restricted by tags.
pub fn last<'a>(journal: &'a Journal, tags: Option<&TagFilter>) -> Option<&'a Entry> {
    let query = Query {
        section: Some(journal.current_section().to_string()),
        tags: tags.cloned(),
        ..Default::default()
    };
    show(journal, &query.count(1))
        .ok()
        .and_then(|mut found| found.next())
        .map(|shown| shown.entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::sample_journal;

    fn subjects<'a>(found: impl Iterator<Item = Shown<'a>>) -> Vec<&'a str> {
        found.map(|s| s.entry.subject.as_str()).collect()
    }

    #[test]
    fn show_all_walks_sections_in_order() {
        let j = sample_journal();
        let all = subjects(show(&j, &Query::default()).unwrap());
        assert_eq!(
            all,
            vec![
                "Review PR @work @review",
                "Write report @work @done(2025-08-15 10:30)",
                "Coffee @break",
                "Call the bank",
                "Read a book @leisure",
            ]
        );
    }

    #[test]
    fn show_restricts_to_section_case_insensitively() {
        let j = sample_journal();
        let later = subjects(show(&j, &Query::default().section("later")).unwrap());
        assert_eq!(later, vec!["Call the bank", "Read a book @leisure"]);
    }

    #[test]
    fn show_unknown_section_is_not_found() {
        let j = sample_journal();
        assert!(matches!(
            show(&j, &Query::default().section("Nope")).map(|it| it.count()),
            Err(DoingError::NotFound(_))
        ));
    }

    #[test]
    fn show_reports_section_of_each_entry() {
        let j = sample_journal();
        let sections: Vec<_> = show(&j, &Query::default()).unwrap().map(|s| s.section).collect();
        assert_eq!(sections, vec!["Currently", "Currently", "Currently", "Later", "Later"]);
    }

    #[test]
    fn tag_filter_modes() {
        let j = sample_journal();
        let or = TagFilter::parse("review break", TagBool::Or).unwrap();
        assert_eq!(
            subjects(show(&j, &Query::default().tags(or)).unwrap()),
            vec!["Review PR @work @review", "Coffee @break"]
        );

        let and = TagFilter::parse("@work,@done", TagBool::And).unwrap();
        assert_eq!(
            subjects(show(&j, &Query::default().tags(and)).unwrap()),
            vec!["Write report @work @done(2025-08-15 10:30)"]
        );

        let not = TagFilter::parse("work", TagBool::Not).unwrap();
        assert_eq!(
            subjects(show(&j, &Query::default().tags(not)).unwrap()),
            vec!["Coffee @break", "Call the bank", "Read a book @leisure"]
        );
    }

    #[test]
    fn tag_filter_with_value() {
        let j = sample_journal();
        let hit = TagFilter::parse("done(2025-08-15 10:30)", TagBool::Or);
        // whitespace splits tags, so values with spaces do not parse
        assert!(hit.is_err());

        let mut filter = TagFilter::single("done");
        filter.tags[0].value = Some("2025-08-15 10:30".to_string());
        assert_eq!(show(&j, &Query::default().tags(filter.clone())).unwrap().count(), 1);
        filter.tags[0].value = Some("2025-08-15 11:00".to_string());
        assert_eq!(show(&j, &Query::default().tags(filter)).unwrap().count(), 0);
    }

    #[test]
    fn tag_filter_rejects_junk() {
        assert!(TagFilter::parse("", TagBool::Or).is_err());
        assert!(TagFilter::parse("@", TagBool::Or).is_err());
        assert!(TagFilter::parse("bad-name", TagBool::Or).is_err());
        assert!(TagFilter::parse("open(paren", TagBool::Or).is_err());
        assert!(TagFilter::parse("client(a)b)", TagBool::Or).is_err());
        assert!(TagFilter::parse("client((a)", TagBool::Or).is_err());
    }

    #[test]
    fn tag_bool_parses_from_text() {
        assert_eq!("and".parse::<TagBool>().unwrap(), TagBool::And);
        assert_eq!("NOT".parse::<TagBool>().unwrap(), TagBool::Not);
        assert!("xor".parse::<TagBool>().is_err());
        assert_eq!(TagBool::Or.as_ref(), "or");
    }

    #[test]
    fn substring_search_is_case_insensitive() {
        let j = sample_journal();
        let q = Query::default().search(Search::parse("COFFEE").unwrap());
        assert_eq!(subjects(show(&j, &q).unwrap()), vec!["Coffee @break"]);
    }

    #[test]
    fn search_looks_at_notes() {
        let j = sample_journal();
        let q = Query::default().search(Search::parse("reviewer").unwrap());
        assert_eq!(subjects(show(&j, &q).unwrap()), vec!["Review PR @work @review"]);
    }

    #[test]
    fn delimited_search_is_a_regex() {
        let j = sample_journal();
        let q = Query::default().search(Search::parse("/^(call|read)\\b/").unwrap());
        assert_eq!(
            subjects(show(&j, &q).unwrap()),
            vec!["Call the bank", "Read a book @leisure"]
        );
        assert!(matches!(Search::parse("/(unclosed/"), Err(DoingError::Argument(_))));
        assert!(matches!(Search::parse("  "), Err(DoingError::Argument(_))));
    }

    #[test]
    fn count_truncates_most_recent_first() {
        let j = sample_journal();
        let q = Query::default().count(2);
        assert_eq!(
            subjects(show(&j, &q).unwrap()),
            vec!["Review PR @work @review", "Write report @work @done(2025-08-15 10:30)"]
        );
    }

    #[test]
    fn show_is_restartable() {
        let j = sample_journal();
        let q = Query::default().tags(TagFilter::single("work"));
        let first: Vec<_> = subjects(show(&j, &q).unwrap());
        let second: Vec<_> = subjects(show(&j, &q).unwrap());
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn last_uses_current_section() {
        let j = sample_journal();
        assert_eq!(last(&j, None).unwrap().subject, "Review PR @work @review");
        let filter = TagFilter::single("break");
        assert_eq!(last(&j, Some(&filter)).unwrap().subject, "Coffee @break");
        assert!(last(&j, Some(&TagFilter::single("leisure"))).is_none());
    }
}
