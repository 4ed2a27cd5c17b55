//! Tail-related error types.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors seen while opening or reading the tailed file.
///
/// None of these end a tail on their own: they are reported on a
/// `TailEvent` and the tailer keeps retrying.
#[derive(Debug, Error)]
pub enum TailError {
    /// The file does not exist (yet).
    #[error("{} does not exist", .0.display())]
    NotFound(PathBuf),

    /// The path exists but is not a regular file.
    #[error("{} is not a regular file", .0.display())]
    NotAFile(PathBuf),

    /// Any other I/O failure.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl TailError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound(path.to_path_buf())
        } else {
            Self::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
