// src/error.rs
use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the monitor and its collaborators.
///
/// Per-entry failures (`Fetch` on enrichment, `Parse`) are absorbed by the
/// caller; `Fetch` on the primary feed and `StoreCorrupt` abort the run.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("store file {path} is corrupt: {reason}")]
    StoreCorrupt { path: PathBuf, reason: String },

    #[error("notification failed: {0}")]
    Notify(String),

    #[error("inclusion rules not configured")]
    ConfigMissing,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MonitorError {
    pub(crate) fn fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Fetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, MonitorError>;
