//! Error types for bibclean-core

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for cleaning operations
pub type Result<T> = std::result::Result<T, CleanError>;

/// Main error type for cleaning operations
#[derive(Error, Debug)]
pub enum CleanError {
    /// Reading or writing a file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Two different records ended up with the same cite key
    #[error("duplicate items {key}!\n{existing}\n{incoming}")]
    DuplicateKey {
        key: String,
        existing: String,
        incoming: String,
    },

    /// A record has neither an author nor an editor field
    #[error("record {key} lacks required author/editor field")]
    MissingAuthor { key: String },

    /// Neither the abbreviation source nor its cache exists
    #[error("journal abbreviation table not found: {0}")]
    AbbreviationSource(PathBuf),

    /// The abbreviation cache could not be encoded
    #[error("abbreviation cache error: {0}")]
    Cache(String),

    /// The configuration file could not be parsed
    #[error("config error: {0}")]
    Config(String),

    /// The configuration parsed but holds unusable values
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl CleanError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CleanError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<toml::de::Error> for CleanError {
    fn from(err: toml::de::Error) -> Self {
        CleanError::Config(err.to_string())
    }
}

impl From<bincode::Error> for CleanError {
    fn from(err: bincode::Error) -> Self {
        CleanError::Cache(err.to_string())
    }
}
