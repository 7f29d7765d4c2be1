//! Error type shared by every engine operation.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Everything the journal engine can fail with.
///
/// The engine never recovers from these itself: they are handed back to the
/// caller, which decides how to present them.
#[derive(Debug, Error)]
pub enum DoingError {
    /// Journal content (or a timestamp/offset argument) could not be parsed.
    #[error("{}{message}", .line.map(|l| format!("line {l}: ")).unwrap_or_default())]
    Format {
        /// 1-based line number in the journal file, when the problem comes from one.
        line: Option<usize>,
        message: String,
    },

    /// The journal file could not be read or written.
    #[error("cannot access {}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A section or entry that the operation needs does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The caller passed an invalid or missing value.
    #[error("{0}")]
    Argument(String),
}

impl DoingError {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        DoingError::Format {
            line: None,
            message: message.into(),
        }
    }

    pub(crate) fn format_at(line: usize, message: impl Into<String>) -> Self {
        DoingError::Format {
            line: Some(line),
            message: message.into(),
        }
    }

    pub(crate) fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        DoingError::Storage {
            path: path.into(),
            source,
        }
    }
}

pub type DoingResult<T> = Result<T, DoingError>;
