//! Include resolution errors.

use std::io;
use std::path::PathBuf;

/// Error raised while resolving an include directive.
///
/// Every variant except [`InvalidRange`](Self::InvalidRange) is an expected
/// render-time condition and is shown inline in the rendered output.
#[derive(Debug, thiserror::Error)]
pub enum IncludeError {
    /// Negative line index in a hand-built selection.
    #[error("invalid line range {start}..={end}")]
    InvalidRange {
        /// Requested first line.
        start: i64,
        /// Requested last line.
        end: i64,
    },

    /// No usable absolute working directory in the render environment.
    #[error("unable to resolve file: {0}")]
    Unresolved(String),

    /// Referenced file does not exist.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Referenced path is a directory.
    #[error("expected a file, found a directory: {}", .0.display())]
    NotAFile(PathBuf),

    /// Reading the file failed.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// Path that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}
