use thiserror::Error;

use crate::tree::TreeKind;

/// Errors produced by tree operations.
#[derive(Debug, Error, PartialEq)]
pub enum TypeError {
    #[error("cycle detected at `{path}`")]
    Cycle { path: String },

    #[error("non-finite float cannot be represented: {0}")]
    NonFiniteFloat(f64),

    #[error("expected {expected}, found {actual}")]
    KindMismatch {
        expected: TreeKind,
        actual: TreeKind,
    },
}
