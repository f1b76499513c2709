//! Key-group registry.
//!
//! Key-groups are the top level of master data: each one names a category
//! (`Priority`, `Status`, ...) that values hang off.
//!
//! # Example
//!
//! ```ignore
//! use masterdata::prelude::*;
//!
//! let db = MasterData::ephemeral()?;
//!
//! let key = MasterKey::new("Priority", "admin").active(true);
//! let row_id = key.row_id.clone();
//! assert!(db.keys.insert(key)?);
//!
//! // Rename; identity is passed separately from the new state
//! let mut edit = db.keys.find_by_group("Priority")?.remove(0);
//! edit.name = "Ticket priority".into();
//! db.keys.update("Priority", &row_id, edit)?;
//! ```

use super::{insert_one, update_one};
use crate::error::Result;
use masterdata_core::{MasterKey, PersistenceProvider, Repository, RowId};
use std::sync::Arc;

/// Key-group operations.
///
/// Access via `db.keys`.
#[derive(Clone)]
pub struct MasterKeys {
    provider: Arc<dyn PersistenceProvider>,
}

impl MasterKeys {
    pub(crate) fn new(provider: Arc<dyn PersistenceProvider>) -> Self {
        Self { provider }
    }

    fn repo(&self) -> Repository<'_, MasterKey> {
        Repository::new(self.provider.as_ref())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Every key-group, in the provider's scan order.
    pub fn list_all(&self) -> Result<Vec<MasterKey>> {
        Ok(self.repo().find_all()?)
    }

    /// All rows whose group equals `group`.
    ///
    /// Usually zero or one row, but pre-existing duplicates are returned
    /// as they are.
    pub fn find_by_group(&self, group: &str) -> Result<Vec<MasterKey>> {
        Ok(self.repo().find_all_in_group(group)?)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Insert a new key-group and commit.
    ///
    /// Returns `Ok(true)` if the commit wrote the row, `Ok(false)` if it
    /// wrote nothing or the provider failed (logged). `Err` only for a key
    /// with an empty group, row id, or name.
    pub fn insert(&self, key: MasterKey) -> Result<bool> {
        insert_one(self.provider.as_ref(), key)
    }

    /// Update the key-group stored at (`original_group`, `original_row_id`).
    ///
    /// Only `name`, `is_active` and `is_deleted` are taken from `key`; group
    /// and row id never change. A missing target is a no-op that still
    /// returns `Ok(true)`.
    pub fn update(&self, original_group: &str, original_row_id: &RowId, key: MasterKey) -> Result<bool> {
        update_one(self.provider.as_ref(), original_group, original_row_id, &key)
    }
}
