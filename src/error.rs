//! Error types shared by the scan and analysis phases

use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a scan/analyze cycle
#[derive(Error, Debug)]
pub enum Error {
    /// Cancellation was requested through the progress monitor.
    /// This is a control-flow exit, not a failure.
    #[error("Analysis cancelled")]
    Cancelled,

    #[error("Invalid element query `{query}`: {reason}")]
    QueryCompile { query: String, reason: String },

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk {path}: {reason}")]
    Walk { path: PathBuf, reason: String },

    #[error("Failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Invalid search pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

/// Problems that only abandon the current XML file
#[derive(Error, Debug)]
pub enum XmlError {
    #[error("file not found")]
    NotFound,

    #[error("not well-formed: {0}")]
    Malformed(String),

    #[error("not decodable in its declared encoding")]
    Encoding,
}

pub type Result<T> = std::result::Result<T, Error>;
