use crate::{
    Config,
    entry::Entry,
    error::DoingResult,
    journal::Journal,
    ops::{OpContext, Outcome},
    query::{self, Query, Shown, TagFilter},
    store,
};
use chrono::{DateTime, Local};
use tracing::debug;

/// A loaded journal bound to its file.
pub struct Doing {
    pub config: Config,
    journal: Journal,
    reference_time: Option<DateTime<Local>>,
}

impl Doing {
    /// Loads the journal named by `config`. A missing file starts empty.
    pub fn open(config: Config) -> DoingResult<Self> {
        config.validate()?;
        let journal = store::load(&config.doing_file, &config.current_section)?;
        Ok(Self::with_journal(config, journal))
    }

    pub fn with_journal(config: Config, journal: Journal) -> Self {
        Self {
            config,
            journal,
            reference_time: None,
        }
    }

    /// Pins "now" for every later operation. Without it the clock is read per call.
    pub fn with_reference_time(mut self, now: DateTime<Local>) -> Self {
        self.reference_time = Some(now);
        self
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn context(&self) -> OpContext {
        OpContext::new(&self.config, self.reference_time.unwrap_or_else(Local::now))
    }

    pub fn show<'a>(
        &'a self,
        query: &Query,
    ) -> DoingResult<impl Iterator<Item = Shown<'a>> + use<'a>> {
        query::show(&self.journal, query)
    }

    pub fn last(&self, tags: Option<&TagFilter>) -> Option<&Entry> {
        query::last(&self.journal, tags)
    }

    /// Runs an operation against a copy of the journal.
    ///
    /// The copy replaces the journal only once it has been saved, so a failed
    /// operation or a failed save leaves both memory and disk as they were.
    pub fn apply<F>(&mut self, op: F) -> DoingResult<Outcome>
    where
        F: FnOnce(&mut Journal, &OpContext) -> DoingResult<Outcome>,
    {
        let ctx = self.context();
        let mut draft = self.journal.clone();
        let outcome = op(&mut draft, &ctx)?;
        if outcome.changed {
            store::save(&draft, &self.config.doing_file)?;
            self.journal = draft;
        } else {
            debug!("nothing changed, journal not saved");
        }
        Ok(outcome)
    }
}
