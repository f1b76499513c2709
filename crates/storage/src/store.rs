//! The bundled persistence provider
//!
//! [`MemoryStore`] keeps both tables in memory and optionally mirrors every
//! commit into a [`Journal`] so the state survives restarts.
//!
//! ## Commit Sequence
//!
//! ```text
//! 1. take the commit lock
//! 2. validate every mutation against current state + earlier mutations
//! 3. IF any check fails: return the error, nothing written
//! 4. append the batch to the journal (DURABILITY POINT)
//! 5. apply the mutations to the tables
//! 6. return the number of mutations applied
//! ```
//!
//! Reads never take the commit lock. A reader running concurrently with a
//! commit may see part of that commit; the store makes no cross-row
//! isolation promise beyond "a failed commit writes nothing".

use crate::sharded::ShardedTable;
use crate::wal::{Durability, Journal};
use masterdata_core::{
    EntityKind, Mutation, PersistenceProvider, Record, RowId, StoreError, StoreResult, WriteBatch,
};
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

/// In-memory provider with optional journal
pub struct MemoryStore {
    keys: ShardedTable,
    values: ShardedTable,

    /// Insertion sequence; every inserted row takes the next value
    seq: AtomicU64,

    /// Reject value writes that leave two rows of a group sharing a name
    unique_value_names: bool,

    /// Commit serialization lock
    ///
    /// Holds the journal, so appending and applying happen under one lock
    /// and validation cannot go stale between check and apply.
    commit_lock: Mutex<Option<Journal>>,
}

impl MemoryStore {
    /// Create an ephemeral store with no disk I/O
    pub fn ephemeral() -> Self {
        Self {
            keys: ShardedTable::new(),
            values: ShardedTable::new(),
            seq: AtomicU64::new(0),
            unique_value_names: false,
            commit_lock: Mutex::new(None),
        }
    }

    /// Open a journal-backed store, replaying whatever the journal holds
    pub fn open(path: impl AsRef<Path>, durability: Durability) -> StoreResult<Self> {
        let (journal, batches) = Journal::open(path, durability)?;
        let store = Self::ephemeral();
        let replayed = batches.len();
        for batch in batches {
            store.apply(batch);
        }
        info!(
            batches = replayed,
            keys = store.keys.total_rows(),
            values = store.values.total_rows(),
            "Master data store opened"
        );
        *store.commit_lock.lock() = Some(journal);
        Ok(store)
    }

    /// Enforce unique value names within a group at commit time
    pub fn with_unique_value_names(mut self, enabled: bool) -> Self {
        self.unique_value_names = enabled;
        self
    }

    /// True if this store writes a journal
    pub fn is_durable(&self) -> bool {
        self.commit_lock.lock().is_some()
    }

    /// Row count for a table
    pub fn row_count(&self, kind: EntityKind) -> usize {
        self.table(kind).total_rows()
    }

    /// Current insertion sequence
    pub fn sequence(&self) -> u64 {
        self.seq.load(Ordering::Acquire)
    }

    fn table(&self, kind: EntityKind) -> &ShardedTable {
        match kind {
            EntityKind::MasterKey => &self.keys,
            EntityKind::MasterValue => &self.values,
        }
    }

    /// Check every mutation against current state plus earlier mutations
    fn validate(&self, batch: &WriteBatch) -> StoreResult<()> {
        let mut inserted: FxHashSet<(EntityKind, &str, &RowId)> = FxHashSet::default();
        // value names per group as they stand after the mutations seen so far
        let mut names: FxHashMap<&str, FxHashMap<RowId, String>> = FxHashMap::default();

        for mutation in batch.iter() {
            let record = mutation.record();
            let kind = record.kind();
            let identity = (kind, record.group(), record.row_id());
            let exists = self.table(kind).contains(record.group(), record.row_id())
                || inserted.contains(&identity);

            match mutation {
                Mutation::Insert(_) => {
                    if exists {
                        return Err(StoreError::DuplicateIdentity {
                            kind,
                            group: record.group().to_string(),
                            row_id: record.row_id().clone(),
                        });
                    }
                    inserted.insert(identity);
                }
                Mutation::Update(_) => {
                    if !exists {
                        return Err(StoreError::MissingRow {
                            kind,
                            group: record.group().to_string(),
                            row_id: record.row_id().clone(),
                        });
                    }
                }
            }

            if self.unique_value_names && kind == EntityKind::MasterValue {
                let group = names
                    .entry(record.group())
                    .or_insert_with(|| self.values.names(record.group()));
                claim_name(group, record)?;
            }
        }
        Ok(())
    }

    /// Apply a validated batch
    fn apply(&self, batch: WriteBatch) -> u64 {
        let mut written = 0;
        for mutation in batch {
            match mutation {
                Mutation::Insert(record) => {
                    let seq = self.seq.fetch_add(1, Ordering::AcqRel) + 1;
                    self.table(record.kind()).insert(record, seq);
                }
                Mutation::Update(record) => {
                    self.table(record.kind()).replace(record);
                }
            }
            written += 1;
        }
        written
    }
}

/// Record `record`'s name in its group, failing if another row holds it
///
/// A row keeping its current name never conflicts, so updates that only
/// touch flags pass even over duplicates written before the constraint
/// was switched on.
fn claim_name(group: &mut FxHashMap<RowId, String>, record: &Record) -> StoreResult<()> {
    let renamed = group
        .get(record.row_id())
        .map_or(true, |current| current != record.name());
    if renamed
        && group
            .iter()
            .any(|(row_id, name)| row_id != record.row_id() && name == record.name())
    {
        return Err(StoreError::UniqueViolation {
            group: record.group().to_string(),
            name: record.name().to_string(),
        });
    }
    group.insert(record.row_id().clone(), record.name().to_string());
    Ok(())
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::ephemeral()
    }
}

impl PersistenceProvider for MemoryStore {
    fn lookup(&self, kind: EntityKind, group: &str, row_id: &RowId) -> StoreResult<Option<Record>> {
        Ok(self.table(kind).get(group, row_id))
    }

    fn lookup_by_name(
        &self,
        kind: EntityKind,
        group: &str,
        name: &str,
    ) -> StoreResult<Option<Record>> {
        Ok(self.table(kind).find_by_name(group, name))
    }

    fn scan_group(&self, kind: EntityKind, group: &str) -> StoreResult<Vec<Record>> {
        Ok(self.table(kind).list_group(group))
    }

    fn scan_all(&self, kind: EntityKind) -> StoreResult<Vec<Record>> {
        Ok(self.table(kind).list_all())
    }

    fn commit(&self, batch: WriteBatch) -> StoreResult<u64> {
        if batch.is_empty() {
            return Ok(0);
        }

        let mut journal = self.commit_lock.lock();
        self.validate(&batch)?;
        if let Some(journal) = journal.as_mut() {
            journal.append(&batch)?;
        }
        let written = self.apply(batch);
        debug!(written, "Committed batch");
        Ok(written)
    }

    fn flush(&self) -> StoreResult<()> {
        if let Some(journal) = self.commit_lock.lock().as_mut() {
            journal.sync()?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("keys", &self.keys.total_rows())
            .field("values", &self.values.total_rows())
            .field("sequence", &self.sequence())
            .field("unique_value_names", &self.unique_value_names)
            .finish()
    }
}
