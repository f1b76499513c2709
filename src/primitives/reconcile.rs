//! Bulk reconciliation.
//!
//! Merges a batch of candidate values into storage with at most one row per
//! (group, name), creating missing key-groups on the way, and commits the
//! whole batch once.
//!
//! ## Per-candidate steps
//!
//! ```text
//! 1. does any key-group exist for candidate.group?   (storage or this batch)
//! 2. IF not: stage a new key-group named after the group
//! 3. find the first value in candidate.group named candidate.name
//! 4. IF none: stage the candidate as an insert
//! 5. ELSE: copy name/is_active/is_deleted onto it and stage an update
//! ```
//!
//! Reads see rows staged earlier in the same batch, so repeating a group or
//! a (group, name) within one input never produces a second row.
//!
//! ## Consistency
//!
//! The batch commit is atomic at the provider level, but reads and commit
//! are not isolated from other writers. Two reconciliations racing on the
//! same new (group, name) can both insert it, unless the store enforces
//! unique value names: then the loser's commit fails with a conflict and
//! the batch is re-run against fresh state.

use crate::config::{MasterDataConfig, ReconcileStrategy};
use crate::error::{Error, Result};
use crate::import::ImportRow;
use masterdata_core::{
    Audit, MasterKey, MasterValue, PersistenceProvider, Repository, RowId, StoreError,
    StoreResult, WriteBatch,
};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::validate_entity;

/// What a reconciliation did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Candidates in the input
    pub candidates: usize,
    /// Key-groups created because none existed
    pub keys_created: usize,
    /// Candidates stored as new value rows
    pub values_inserted: usize,
    /// Candidates merged into an existing row
    pub values_updated: usize,
    /// Rows the commit reported as written
    pub rows_written: u64,
    /// Commit attempts, including conflict retries
    pub attempts: u32,
}

/// Bulk reconciliation engine.
///
/// Access via `db.reconciler`.
#[derive(Clone)]
pub struct Reconciler {
    provider: Arc<dyn PersistenceProvider>,
    config: Arc<MasterDataConfig>,
}

impl Reconciler {
    pub(crate) fn new(provider: Arc<dyn PersistenceProvider>, config: Arc<MasterDataConfig>) -> Self {
        Self { provider, config }
    }

    /// Strategy this engine uses to find existing rows
    pub fn strategy(&self) -> ReconcileStrategy {
        self.config.strategy
    }

    /// Reconcile candidate values, in input order, as one batch.
    ///
    /// Every candidate is validated before storage is touched. Any provider
    /// failure while reading or committing aborts the batch with
    /// [`Error::BatchAborted`]; nothing from this call is then stored.
    pub fn reconcile<I>(&self, candidates: I) -> Result<ReconcileReport>
    where
        I: IntoIterator<Item = MasterValue>,
    {
        let candidates: Vec<MasterValue> = candidates.into_iter().collect();
        for candidate in &candidates {
            validate_entity(candidate)?;
        }

        let mut attempts = 0;
        loop {
            attempts += 1;
            let (batch, mut report) = self.stage(&candidates)?;

            match self.provider.commit(batch) {
                Ok(written) => {
                    report.rows_written = written;
                    report.attempts = attempts;
                    info!(
                        candidates = report.candidates,
                        keys_created = report.keys_created,
                        values_inserted = report.values_inserted,
                        values_updated = report.values_updated,
                        rows_written = written,
                        attempts,
                        "Reconciliation committed"
                    );
                    return Ok(report);
                }
                Err(e) if e.is_conflict() && attempts <= self.config.conflict_retries => {
                    warn!(attempt = attempts, error = %e, "Reconciliation hit a conflict, re-reading");
                }
                Err(source) => {
                    return Err(Error::BatchAborted {
                        processed: candidates.len(),
                        source,
                    });
                }
            }
        }
    }

    /// Reconcile rows from the import collaborator.
    ///
    /// Each row becomes a candidate with a fresh row id, stamped with the
    /// configured system actor.
    pub fn reconcile_rows<I>(&self, rows: I) -> Result<ReconcileReport>
    where
        I: IntoIterator<Item = ImportRow>,
    {
        let actor = self.config.system_actor.clone();
        self.reconcile(rows.into_iter().map(|row| row.into_candidate(&actor)))
    }

    /// Build the batch for one attempt
    fn stage(&self, candidates: &[MasterValue]) -> Result<(WriteBatch, ReconcileReport)> {
        let repo_keys = Repository::<MasterKey>::new(self.provider.as_ref());
        let repo_values = Repository::<MasterValue>::new(self.provider.as_ref());
        let mut existing: Box<dyn ExistingRows + '_> = match self.config.strategy {
            ReconcileStrategy::PerRow => Box::new(PerRow {
                keys: repo_keys,
                values: repo_values,
            }),
            ReconcileStrategy::Indexed => Box::new(Indexed {
                keys: repo_keys,
                values: repo_values,
                groups: FxHashMap::default(),
            }),
        };

        let mut batch = WriteBatch::new();
        let mut report = ReconcileReport {
            candidates: candidates.len(),
            ..Default::default()
        };

        for (processed, candidate) in candidates.iter().enumerate() {
            let abort = |source: StoreError| Error::BatchAborted { processed, source };
            let group = candidate.group.as_str();

            let staged_key = batch.staged_in_group::<MasterKey>(group).next().is_some();
            if !staged_key && !existing.has_key(group).map_err(abort)? {
                debug!(group, "Creating missing key-group");
                batch.stage_insert(self.new_key(group));
                report.keys_created += 1;
            }

            let stored = existing
                .first_value_named(group, &candidate.name)
                .map_err(abort)?;

            match stored {
                Some(row) => {
                    merge_staged_or_stage(&mut batch, row, candidate);
                    report.values_updated += 1;
                }
                None => {
                    let staged_row = batch
                        .staged_in_group::<MasterValue>(group)
                        .find(|v| v.name == candidate.name)
                        .map(|v| v.row_id.clone());
                    match staged_row {
                        Some(row_id) => {
                            if let Some(staged) = batch.staged_mut::<MasterValue>(group, &row_id) {
                                merge_into(staged, candidate);
                            }
                            report.values_updated += 1;
                        }
                        None => {
                            batch.stage_insert(candidate.clone());
                            report.values_inserted += 1;
                        }
                    }
                }
            }
        }

        Ok((batch, report))
    }

    fn new_key(&self, group: &str) -> MasterKey {
        MasterKey {
            group: group.to_string(),
            row_id: RowId::generate(),
            name: group.to_string(),
            is_active: false,
            is_deleted: false,
            audit: Audit::created_by(self.config.system_actor.clone()),
        }
    }
}

/// Merge into the staged copy of `row` if the batch already touches it,
/// otherwise stage an update of the stored row.
fn merge_staged_or_stage(batch: &mut WriteBatch, mut row: MasterValue, candidate: &MasterValue) {
    if let Some(staged) = batch.staged_mut::<MasterValue>(&row.group, &row.row_id) {
        merge_into(staged, candidate);
        return;
    }
    merge_into(&mut row, candidate);
    batch.stage_update(row);
}

fn merge_into(row: &mut MasterValue, candidate: &MasterValue) {
    use masterdata_core::Entity;

    row.merge_from(candidate);
    row.audit.touch(candidate.audit.updated_by.clone());
}

/// Read side of reconciliation, one implementation per strategy
trait ExistingRows {
    /// True if storage holds any key-group for `group`
    fn has_key(&mut self, group: &str) -> StoreResult<bool>;

    /// First stored value in `group` named `name`
    fn first_value_named(&mut self, group: &str, name: &str) -> StoreResult<Option<MasterValue>>;
}

/// Re-query storage for every candidate
struct PerRow<'a> {
    keys: Repository<'a, MasterKey>,
    values: Repository<'a, MasterValue>,
}

impl ExistingRows for PerRow<'_> {
    fn has_key(&mut self, group: &str) -> StoreResult<bool> {
        Ok(!self.keys.find_all_in_group(group)?.is_empty())
    }

    fn first_value_named(&mut self, group: &str, name: &str) -> StoreResult<Option<MasterValue>> {
        Ok(self
            .values
            .find_all_in_group(group)?
            .into_iter()
            .find(|v| v.name == name))
    }
}

/// What storage held for one group when it was first touched
struct GroupIndex {
    has_key: bool,
    first_by_name: FxHashMap<String, MasterValue>,
}

/// Load each referenced group once
struct Indexed<'a> {
    keys: Repository<'a, MasterKey>,
    values: Repository<'a, MasterValue>,
    groups: FxHashMap<String, GroupIndex>,
}

impl GroupIndex {
    fn load(
        keys: &Repository<'_, MasterKey>,
        values: &Repository<'_, MasterValue>,
        group: &str,
    ) -> StoreResult<Self> {
        let has_key = !keys.find_all_in_group(group)?.is_empty();
        let mut first_by_name = FxHashMap::default();
        for value in values.find_all_in_group(group)? {
            first_by_name.entry(value.name.clone()).or_insert(value);
        }
        Ok(Self {
            has_key,
            first_by_name,
        })
    }
}

impl Indexed<'_> {
    fn group(&mut self, group: &str) -> StoreResult<&GroupIndex> {
        match self.groups.entry(group.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let index = GroupIndex::load(&self.keys, &self.values, group)?;
                Ok(entry.insert(index))
            }
        }
    }
}

impl ExistingRows for Indexed<'_> {
    fn has_key(&mut self, group: &str) -> StoreResult<bool> {
        Ok(self.group(group)?.has_key)
    }

    fn first_value_named(&mut self, group: &str, name: &str) -> StoreResult<Option<MasterValue>> {
        Ok(self.group(group)?.first_by_name.get(name).cloned())
    }
}
