//! Write staging
//!
//! A [`WriteBatch`] is the unit of work handed to
//! [`PersistenceProvider::commit`](crate::PersistenceProvider::commit).
//! It is owned by the caller, so concurrent operations never share staged
//! state. Mutations are applied in staging order.

use crate::entity::{Entity, Record};
use crate::types::RowId;
use serde::{Deserialize, Serialize};

/// A staged change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mutation {
    /// Insert a new row; its (group, row_id) must not exist yet
    Insert(Record),
    /// Overwrite an existing row addressed by its (group, row_id)
    Update(Record),
}

impl Mutation {
    /// The record carried by this mutation
    pub fn record(&self) -> &Record {
        match self {
            Mutation::Insert(r) | Mutation::Update(r) => r,
        }
    }

    /// Mutable access to the carried record
    pub fn record_mut(&mut self) -> &mut Record {
        match self {
            Mutation::Insert(r) | Mutation::Update(r) => r,
        }
    }

    /// True for inserts
    pub fn is_insert(&self) -> bool {
        matches!(self, Mutation::Insert(_))
    }
}

/// Ordered list of staged mutations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteBatch {
    mutations: Vec<Mutation>,
}

impl WriteBatch {
    /// Create an empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage an insert
    pub fn stage_insert<E: Entity>(&mut self, entity: E) {
        self.mutations.push(Mutation::Insert(entity.into_record()));
    }

    /// Stage an update
    pub fn stage_update<E: Entity>(&mut self, entity: E) {
        self.mutations.push(Mutation::Update(entity.into_record()));
    }

    /// Number of staged mutations
    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    /// True if nothing is staged
    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    /// Iterate over staged mutations in order
    pub fn iter(&self) -> impl Iterator<Item = &Mutation> {
        self.mutations.iter()
    }

    /// Staged rows of type `E` in `group`, in staging order
    pub fn staged_in_group<'a, E: Entity>(
        &'a self,
        group: &'a str,
    ) -> impl Iterator<Item = &'a E> + 'a {
        self.mutations
            .iter()
            .map(Mutation::record)
            .filter(move |r| r.group() == group)
            .filter_map(E::from_record_ref)
    }

    /// Most recently staged row of type `E` with this identity, for in-place edits
    pub fn staged_mut<E: Entity>(&mut self, group: &str, row_id: &RowId) -> Option<&mut E> {
        self.mutations
            .iter_mut()
            .rev()
            .map(Mutation::record_mut)
            .find(|r| r.kind() == E::KIND && r.group() == group && r.row_id() == row_id)
            .and_then(E::from_record_mut)
    }
}

impl IntoIterator for WriteBatch {
    type Item = Mutation;
    type IntoIter = std::vec::IntoIter<Mutation>;

    fn into_iter(self) -> Self::IntoIter {
        self.mutations.into_iter()
    }
}
