use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Failed to snapshot database {path}: {source}")]
    Snapshot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Metadata lookup failed: {0}")]
    MetadataLookup(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("{0}")]
    PrimarySearch(String),

    #[error("Keyword search failed: {0}")]
    KeywordSearch(String),
}

impl Error {
    /// Message of the innermost cause, used as the user-facing detail line.
    pub fn root_cause(&self) -> String {
        let mut current: &dyn std::error::Error = self;
        while let Some(next) = current.source() {
            current = next;
        }
        current.to_string()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
