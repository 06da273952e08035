//! Error types for lemmaloops.

use std::path::PathBuf;
use thiserror::Error;

/// Result type used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The config file could not be read.
    #[error("failed to read config {}: {source}", .path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON (or has the wrong shape).
    #[error("failed to parse config {}: {source}", .path.display())]
    ConfigJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The theory document could not be read.
    #[error("failed to read theory {}: {source}", .path.display())]
    TheoryIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An external executable could not be started.
    #[error("failed to execute `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The macro tool ran but reported failure.
    #[error("`{program}` exited with status {status}")]
    MacroTool { program: String, status: String },

    /// Reading or writing a scratch artifact failed.
    #[error("scratch file {}: {source}", .path.display())]
    Scratch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Fuzzy name resolution was asked to pick from nothing.
    #[error("no candidate to match against `{target}`")]
    NoMatchFound { target: String },
}

impl Error {
    pub(crate) fn scratch(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Scratch {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        Error::Spawn {
            program: program.into(),
            source,
        }
    }
}
