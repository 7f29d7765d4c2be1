use crate::error::DoingResult;
use crate::journal::validate_section_name;
use std::path::PathBuf;

pub const DEFAULT_CURRENT_SECTION: &str = "Currently";
pub const DEFAULT_ARCHIVE_SECTION: &str = "Archive";
pub const DEFAULT_LATER_SECTION: &str = "Later";

/// Settings the engine runs with.
///
/// The engine never reads configuration files; callers build this value
/// however they like (see the CLI's TOML loader).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// The journal file.
    pub doing_file: PathBuf,
    /// Section targeted by `now`, `done`, `finish` and friends when none is given.
    pub current_section: String,
    /// Default destination of `archive`.
    pub archive_section: String,
    /// Section used by `later`.
    pub later_section: String,
}

impl Config {
    pub fn new(doing_file: impl Into<PathBuf>) -> Self {
        Self {
            doing_file: doing_file.into(),
            current_section: DEFAULT_CURRENT_SECTION.to_string(),
            archive_section: DEFAULT_ARCHIVE_SECTION.to_string(),
            later_section: DEFAULT_LATER_SECTION.to_string(),
        }
    }

    /// Checks every configured section name can be written to the file.
    pub fn validate(&self) -> DoingResult<()> {
        for name in [&self.current_section, &self.archive_section, &self.later_section] {
            validate_section_name(name)?;
        }
        Ok(())
    }
}
