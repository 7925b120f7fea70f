//! Error taxonomy for relocation runs.
//!
//! Every variant is fatal: callers surface it once and stop. Nothing is
//! retried and nothing already written to the destination is rolled back.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub type Result<T, E = RelocateError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum RelocateError {
    /// Bad command-line input (argument count, malformed module path).
    #[error("usage: {0}")]
    Usage(String),

    /// Destination directory exists and is not empty.
    #[error("target directory {} exists and is non-empty", .dir.display())]
    Precondition { dir: PathBuf },

    /// The template module could not be located on disk.
    #[error("resolve {module}: {detail}")]
    Resolution { module: String, detail: String },

    /// A source file or manifest failed structural parsing.
    #[error("parsing {}: {detail}", .file.display())]
    Parse { file: PathBuf, detail: String },

    /// A renamed package would not be a legal identifier.
    #[error("{}: cannot rename package {from} to package {to}: invalid package name", .file.display())]
    Identifier {
        file: PathBuf,
        from: String,
        to: String,
    },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl RelocateError {
    pub fn parse(file: impl AsRef<Path>, detail: impl Into<String>) -> Self {
        Self::Parse {
            file: file.as_ref().to_path_buf(),
            detail: detail.into(),
        }
    }

    pub fn resolution(module: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Resolution {
            module: module.into(),
            detail: detail.into(),
        }
    }

    /// Adapter for `map_err` on filesystem calls.
    pub fn io(path: impl AsRef<Path>) -> impl FnOnce(io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        move |source| Self::Io { path, source }
    }

    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }
}
