//! Failures reported by the path store when an operation does not fit the current tree shape.

use thiserror::Error;

use crate::vfs::NodeKind;

/// Why a store operation was refused.
///
/// None of these are transient: retrying the same call against the same tree gives the same
/// answer. Callers that need to branch before calling can use `has()` / `get_metadata()`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{path} does not exist")]
    NotFound { path: String },

    #[error("{path} is not a {expected}")]
    WrongKind { path: String, expected: NodeKind },

    #[error("{path} already exists")]
    Conflict { path: String },

    #[error("cannot create {path}: ancestor {ancestor} is a file")]
    AncestorBlocked { path: String, ancestor: String },
}

impl StoreError {
    pub(crate) fn not_found(path: &str) -> Self {
        StoreError::NotFound { path: path.to_string() }
    }

    pub(crate) fn wrong_kind(path: &str, expected: NodeKind) -> Self {
        StoreError::WrongKind {
            path: path.to_string(),
            expected,
        }
    }

    pub(crate) fn conflict(path: &str) -> Self {
        StoreError::Conflict { path: path.to_string() }
    }

    pub(crate) fn ancestor_blocked(path: &str, ancestor: &str) -> Self {
        StoreError::AncestorBlocked {
            path: path.to_string(),
            ancestor: ancestor.to_string(),
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
