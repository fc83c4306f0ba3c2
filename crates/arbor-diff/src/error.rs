//! Error types for the diff crate.
//!
//! The diff walk itself cannot fail; these cover configuration loading and
//! conversion of results out of the tree model.

use std::path::PathBuf;

use arbor_types::TypeError;

/// Errors that can occur around diff operations.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// A configuration file could not be read.
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration text was malformed or held invalid values.
    #[error("invalid config: {0}")]
    Config(String),

    /// A tree could not be converted.
    #[error("tree error: {0}")]
    Type(#[from] TypeError),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
