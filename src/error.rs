//! Error types for loading, decoding and saving entity documents.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for entity document operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while working with an entity document.
///
/// None of these are retried; a failed load or save aborts the whole
/// load/mutate/save sequence.
#[derive(Debug, Error)]
pub enum Error {
    /// The document file could not be opened, created or replaced.
    #[error("cannot open {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The text is not a YAML document.
    #[error("document is not valid YAML: {0}")]
    Parse(#[source] serde_yaml::Error),

    /// The YAML parsed, but its tags or shapes do not match the entity tree.
    #[error("malformed document at {at}: {reason}")]
    MalformedDocument { at: String, reason: String },

    /// A group, record or field name is absent from its parent.
    #[error("{scope} '{name}' not found")]
    KeyNotFound { scope: &'static str, name: String },

    /// Emitting YAML (or writing it to the output stream) failed.
    #[error("failed to encode document: {0}")]
    Encode(#[source] serde_yaml::Error),
}

impl Error {
    pub(crate) fn malformed(at: &str, reason: impl Into<String>) -> Self {
        Self::MalformedDocument {
            at: at.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(scope: &'static str, name: &str) -> Self {
        Self::KeyNotFound {
            scope,
            name: name.to_string(),
        }
    }

    pub(crate) fn unavailable(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::SourceUnavailable {
            path: path.into(),
            source,
        }
    }
}
