//! Value registry.
//!
//! Values live inside a key-group. Nothing ties a value's group to an
//! existing key-group, so orphan values are legal and are listed like any
//! other.
//!
//! `insert` here is a plain insert: calling it twice with the same
//! (group, name) stores two rows. Use the [`Reconciler`](super::Reconciler)
//! for duplicate-free merges.

use super::{insert_one, update_one};
use crate::error::Result;
use masterdata_core::{MasterValue, PersistenceProvider, Repository, RowId};
use std::sync::Arc;
use tracing::warn;

/// Value operations.
///
/// Access via `db.values`.
#[derive(Clone)]
pub struct MasterValues {
    provider: Arc<dyn PersistenceProvider>,
}

impl MasterValues {
    pub(crate) fn new(provider: Arc<dyn PersistenceProvider>) -> Self {
        Self { provider }
    }

    fn repo(&self) -> Repository<'_, MasterValue> {
        Repository::new(self.provider.as_ref())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Values in `group`, or an empty list if the provider fails.
    ///
    /// "No values" and "could not read values" look the same to the caller;
    /// the failure is only visible in the log. Use
    /// [`try_list_all_by_group`](Self::try_list_all_by_group) to tell them apart.
    pub fn list_all_by_group(&self, group: &str) -> Vec<MasterValue> {
        self.try_list_all_by_group(group).unwrap_or_else(|e| {
            warn!(group, error = %e, "Listing values failed, returning none");
            Vec::new()
        })
    }

    /// Values in `group`, propagating provider failures.
    pub fn try_list_all_by_group(&self, group: &str) -> Result<Vec<MasterValue>> {
        Ok(self.repo().find_all_in_group(group)?)
    }

    /// First value in `group` named `name`, if any.
    pub fn find_by_name(&self, group: &str, name: &str) -> Result<Option<MasterValue>> {
        Ok(self.repo().find_by_name(group, name)?)
    }

    /// Every value in every group.
    pub fn list_all(&self) -> Result<Vec<MasterValue>> {
        Ok(self.repo().find_all()?)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Insert a value and commit, without any duplicate check.
    ///
    /// Same boolean contract as [`MasterKeys::insert`](super::MasterKeys::insert).
    pub fn insert(&self, value: MasterValue) -> Result<bool> {
        insert_one(self.provider.as_ref(), value)
    }

    /// Update the value stored at (`original_group`, `original_row_id`).
    ///
    /// Same merge and no-op rules as [`MasterKeys::update`](super::MasterKeys::update).
    pub fn update(
        &self,
        original_group: &str,
        original_row_id: &RowId,
        value: MasterValue,
    ) -> Result<bool> {
        update_one(self.provider.as_ref(), original_group, original_row_id, &value)
    }
}
