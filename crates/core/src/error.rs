//! Persistence-level errors
//!
//! [`StoreError`] is what a [`PersistenceProvider`](crate::PersistenceProvider)
//! reports. The root crate wraps it as its `Persistence` error kind.

use crate::entity::EntityKind;
use crate::types::RowId;
use thiserror::Error;

/// Errors raised by a persistence provider
#[derive(Debug, Error)]
pub enum StoreError {
    /// Insert of a (group, row_id) that already exists
    #[error("duplicate {kind} identity {group}/{row_id}")]
    DuplicateIdentity {
        /// Table
        kind: EntityKind,
        /// Group half of the identity
        group: String,
        /// Row half of the identity
        row_id: RowId,
    },

    /// Update of a row that no longer exists
    #[error("{kind} {group}/{row_id} vanished before commit")]
    MissingRow {
        /// Table
        kind: EntityKind,
        /// Group half of the identity
        group: String,
        /// Row half of the identity
        row_id: RowId,
    },

    /// Insert of a value whose (group, name) is already taken
    #[error("value name {name:?} already exists in group {group:?}")]
    UniqueViolation {
        /// Group
        group: String,
        /// Duplicated name
        name: String,
    },

    /// I/O failure in a durable backend
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding or decoding failure
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Persisted state failed validation
    #[error("corruption: {0}")]
    Corruption(String),

    /// Backend cannot serve requests (closed, unreachable, injected fault)
    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// True for constraint violations that a fresh re-read could resolve
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            StoreError::UniqueViolation { .. } | StoreError::MissingRow { .. }
        )
    }
}

/// Result type for provider operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;
