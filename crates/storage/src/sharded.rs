//! Group-sharded table
//!
//! One [`ShardedTable`] holds every row of one entity kind.
//!
//! # Design
//!
//! - DashMap: sharded by group, lock-free reads across groups
//! - FxHashMap: O(1) lookups by row id within a group
//! - Per-group: writers to different groups never contend
//!
//! Every row carries the sequence number of the commit that first inserted
//! it. Scans sort by that sequence, so iteration order is insertion order
//! and stays stable across updates and journal replay.

use dashmap::DashMap;
use masterdata_core::{Record, RowId};
use rustc_hash::FxHashMap;

/// A stored row plus its insertion sequence
#[derive(Debug, Clone)]
pub(crate) struct Slot {
    pub(crate) record: Record,
    pub(crate) seq: u64,
}

/// Per-group shard
///
/// Each group gets its own shard with an FxHashMap for O(1) lookups.
#[derive(Debug, Default)]
pub struct Shard {
    pub(crate) data: FxHashMap<RowId, Slot>,
}

impl Shard {
    /// Create a new empty shard
    pub fn new() -> Self {
        Self::default()
    }

    /// Get number of rows in this shard
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if shard is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn sorted(&self) -> Vec<Record> {
        let mut slots: Vec<&Slot> = self.data.values().collect();
        slots.sort_by_key(|s| s.seq);
        slots.into_iter().map(|s| s.record.clone()).collect()
    }
}

/// Rows of one entity kind, sharded by group
///
/// # Thread Safety
///
/// All operations are thread-safe:
/// - get(): Lock-free read via DashMap
/// - insert()/replace(): Only locks the target group's shard
/// - Different groups never contend
#[derive(Debug, Default)]
pub struct ShardedTable {
    shards: DashMap<String, Shard>,
}

impl ShardedTable {
    /// Create new empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Get number of shards (groups)
    pub fn group_count(&self) -> usize {
        self.shards.len()
    }

    /// Get total number of rows across all shards
    pub fn total_rows(&self) -> usize {
        self.shards.iter().map(|entry| entry.value().len()).sum()
    }

    /// Get a row by identity
    #[inline]
    pub fn get(&self, group: &str, row_id: &RowId) -> Option<Record> {
        self.shards
            .get(group)
            .and_then(|shard| shard.data.get(row_id).map(|s| s.record.clone()))
    }

    /// Check if a row exists
    #[inline]
    pub fn contains(&self, group: &str, row_id: &RowId) -> bool {
        self.shards
            .get(group)
            .map(|shard| shard.data.contains_key(row_id))
            .unwrap_or(false)
    }

    /// First row in insertion order whose name matches
    pub fn find_by_name(&self, group: &str, name: &str) -> Option<Record> {
        self.shards.get(group).and_then(|shard| {
            shard
                .data
                .values()
                .filter(|s| s.record.name() == name)
                .min_by_key(|s| s.seq)
                .map(|s| s.record.clone())
        })
    }

    /// Row id and current name of every row in `group`
    pub fn names(&self, group: &str) -> FxHashMap<RowId, String> {
        self.shards
            .get(group)
            .map(|shard| {
                shard
                    .data
                    .iter()
                    .map(|(row_id, s)| (row_id.clone(), s.record.name().to_string()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Insert a new row at sequence `seq`
    ///
    /// Overwrites silently if the identity exists; callers validate first.
    pub(crate) fn insert(&self, record: Record, seq: u64) {
        let group = record.group().to_string();
        let row_id = record.row_id().clone();
        self.shards
            .entry(group)
            .or_default()
            .data
            .insert(row_id, Slot { record, seq });
    }

    /// Replace an existing row, keeping its insertion sequence
    ///
    /// Returns false if the row does not exist.
    pub(crate) fn replace(&self, record: Record) -> bool {
        match self.shards.get_mut(record.group()) {
            Some(mut shard) => match shard.data.get_mut(record.row_id()) {
                Some(slot) => {
                    slot.record = record;
                    true
                }
                None => false,
            },
            None => false,
        }
    }

    /// All rows of a group, in insertion order
    pub fn list_group(&self, group: &str) -> Vec<Record> {
        self.shards
            .get(group)
            .map(|shard| shard.sorted())
            .unwrap_or_default()
    }

    /// All rows, in insertion order
    pub fn list_all(&self) -> Vec<Record> {
        let mut slots: Vec<Slot> = self
            .shards
            .iter()
            .flat_map(|entry| entry.value().data.values().cloned().collect::<Vec<_>>())
            .collect();
        slots.sort_by_key(|s| s.seq);
        slots.into_iter().map(|s| s.record).collect()
    }

    /// Count of rows in a group
    pub fn group_len(&self, group: &str) -> usize {
        self.shards.get(group).map(|shard| shard.len()).unwrap_or(0)
    }

    /// Groups that have rows
    pub fn groups(&self) -> Vec<String> {
        let mut groups: Vec<String> = self.shards.iter().map(|e| e.key().clone()).collect();
        groups.sort();
        groups
    }
}
