//! Loading and saving the journal file.
//!
//! There is no locking: two processes saving at the same time means the last
//! one wins.

use crate::codec::{decode, encode};
use crate::error::{DoingError, DoingResult};
use crate::journal::Journal;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Reads and decodes `path`. A missing file is an empty journal.
pub fn load(path: &Path, default_section: &str) -> DoingResult<Journal> {
    match fs::read_to_string(path) {
        Ok(raw) => {
            debug!(path = %path.display(), bytes = raw.len(), "loading journal");
            decode(&raw, default_section)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "journal file missing, starting empty");
            Ok(Journal::new(default_section))
        }
        Err(e) => Err(DoingError::storage(path, e)),
    }
}

/// Replaces the contents of `path` with the encoded journal.
///
/// The text goes to a temporary file in the same directory which is then
/// renamed over `path`, so an interrupted save never leaves a truncated file.
pub fn save(journal: &Journal, path: &Path) -> DoingResult<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| DoingError::storage(dir, e))?;

    let raw = encode(journal);
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| DoingError::storage(dir, e))?;
    tmp.write_all(raw.as_bytes())
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| DoingError::storage(tmp.path(), e))?;
    tmp.persist(path)
        .map_err(|e| DoingError::storage(path, e.error))?;

    debug!(path = %path.display(), bytes = raw.len(), "saved journal");
    Ok(())
}
