//! Typed reads over a provider
//!
//! [`Repository`] narrows a [`PersistenceProvider`] to one entity type so
//! callers work with `MasterKey`/`MasterValue` rather than [`Record`]s.

use crate::entity::{Entity, Record};
use crate::error::StoreResult;
use crate::traits::PersistenceProvider;
use crate::types::RowId;
use std::marker::PhantomData;

/// Typed view of one table
pub struct Repository<'a, E> {
    provider: &'a dyn PersistenceProvider,
    _entity: PhantomData<fn() -> E>,
}

impl<'a, E: Entity> Repository<'a, E> {
    /// Wrap a provider
    pub fn new(provider: &'a dyn PersistenceProvider) -> Self {
        Self {
            provider,
            _entity: PhantomData,
        }
    }

    /// Point lookup by composite identity
    pub fn find(&self, group: &str, row_id: &RowId) -> StoreResult<Option<E>> {
        Ok(self
            .provider
            .lookup(E::KIND, group, row_id)?
            .and_then(E::from_record))
    }

    /// First row in `group` named `name`
    pub fn find_by_name(&self, group: &str, name: &str) -> StoreResult<Option<E>> {
        Ok(self
            .provider
            .lookup_by_name(E::KIND, group, name)?
            .and_then(E::from_record))
    }

    /// All rows in `group`
    pub fn find_all_in_group(&self, group: &str) -> StoreResult<Vec<E>> {
        Ok(typed(self.provider.scan_group(E::KIND, group)?))
    }

    /// All rows
    pub fn find_all(&self) -> StoreResult<Vec<E>> {
        Ok(typed(self.provider.scan_all(E::KIND)?))
    }
}

fn typed<E: Entity>(records: Vec<Record>) -> Vec<E> {
    records.into_iter().filter_map(E::from_record).collect()
}
