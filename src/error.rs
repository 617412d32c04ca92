//! Error types.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = ModernizeError> = std::result::Result<T, E>;

/// Errors that abort the transform of one element, or the loading of config.
#[derive(Debug, Error)]
pub enum ModernizeError {
    #[error("src attribute not found")]
    MissingSrc,

    #[error("src attribute does not have a value")]
    EmptySrc,

    /// A bound `src` whose expression is not a registered import.
    #[error("src binding `{0}` does not resolve to an import")]
    UnresolvedSrc(String),

    /// Inline option payload that is not valid JSON for its key.
    #[error("Invalid value for {key}: {source}")]
    InvalidOption {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid value for quality: {format} quality {value} is out of range 0..=100")]
    InvalidQuality { format: String, value: u8 },

    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("config file parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// An element failure, tagged with where the element starts.
    #[error("<{tag}> at byte {position}: {source}")]
    Element {
        tag: String,
        position: usize,
        #[source]
        source: Box<ModernizeError>,
    },

    #[error("template parse error at byte {position}: {message}")]
    Template { position: usize, message: String },
}

impl ModernizeError {
    /// The underlying error with element context stripped.
    pub fn root(&self) -> &ModernizeError {
        match self {
            Self::Element { source, .. } => source.root(),
            other => other,
        }
    }
}
