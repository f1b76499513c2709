//! Registries and the reconciliation engine.
//!
//! Each area is a thin facade over a shared persistence provider:
//!
//! 1. [`MasterKeys`] - key-group CRUD: `db.keys.insert(key)?`
//! 2. [`MasterValues`] - value CRUD scoped to a group: `db.values.find_by_name("Priority", "High")?`
//! 3. [`Reconciler`] - bulk merge of imported rows: `db.reconciler.reconcile(rows)?`
//!
//! Registry mutations follow a lenient contract: provider failures come back
//! as `Ok(false)` with a warning in the log, never as `Err`. Only invalid
//! input is an `Err`.

mod keys;
mod reconcile;
mod values;

pub use keys::MasterKeys;
pub use reconcile::{ReconcileReport, Reconciler};
pub use values::MasterValues;

use crate::error::{Error, Result};
use masterdata_core::{Entity, PersistenceProvider, Repository, RowId, WriteBatch};
use tracing::{debug, warn};

/// Reject entities missing a group, row id, or name
pub(crate) fn validate_entity<E: Entity>(entity: &E) -> Result<()> {
    validate_identity(entity.group(), entity.row_id())?;
    if entity.name().trim().is_empty() {
        return Err(Error::Validation(format!(
            "{} in group {:?} has an empty name",
            E::KIND,
            entity.group()
        )));
    }
    Ok(())
}

/// Reject an identity with an empty half
pub(crate) fn validate_identity(group: &str, row_id: &RowId) -> Result<()> {
    if group.trim().is_empty() {
        return Err(Error::Validation("group must not be empty".to_string()));
    }
    if row_id.is_empty() {
        return Err(Error::Validation(format!(
            "row id in group {:?} must not be empty",
            group
        )));
    }
    Ok(())
}

/// Insert one row and commit. `Ok(true)` only if the commit wrote something.
pub(crate) fn insert_one<E: Entity>(provider: &dyn PersistenceProvider, entity: E) -> Result<bool> {
    validate_entity(&entity)?;

    let kind = E::KIND;
    let group = entity.group().to_string();
    let row_id = entity.row_id().clone();

    let mut batch = WriteBatch::new();
    batch.stage_insert(entity);
    match provider.commit(batch) {
        Ok(written) if written > 0 => {
            debug!(%kind, %group, %row_id, "Inserted row");
            Ok(true)
        }
        Ok(_) => {
            warn!(%kind, %group, %row_id, "Insert committed no rows");
            Ok(false)
        }
        Err(e) => {
            warn!(%kind, %group, %row_id, error = %e, "Insert failed");
            Ok(false)
        }
    }
}

/// Merge `incoming` into the row at the original identity and commit.
///
/// A missing target is a successful no-op.
pub(crate) fn update_one<E: Entity>(
    provider: &dyn PersistenceProvider,
    original_group: &str,
    original_row_id: &RowId,
    incoming: &E,
) -> Result<bool> {
    validate_identity(original_group, original_row_id)?;
    if incoming.name().trim().is_empty() {
        return Err(Error::Validation(format!(
            "update of {} {}/{} has an empty name",
            E::KIND,
            original_group,
            original_row_id
        )));
    }

    let kind = E::KIND;
    let existing = match Repository::<E>::new(provider).find(original_group, original_row_id) {
        Ok(Some(existing)) => existing,
        Ok(None) => {
            debug!(%kind, group = original_group, row_id = %original_row_id, "Update target missing, nothing to do");
            return Ok(true);
        }
        Err(e) => {
            warn!(%kind, group = original_group, row_id = %original_row_id, error = %e, "Update lookup failed");
            return Ok(false);
        }
    };

    let mut merged = existing;
    merged.merge_from(incoming);
    merged.audit_mut().touch(incoming.audit().updated_by.clone());

    let mut batch = WriteBatch::new();
    batch.stage_update(merged);
    match provider.commit(batch) {
        Ok(_) => {
            debug!(%kind, group = original_group, row_id = %original_row_id, "Updated row");
            Ok(true)
        }
        Err(e) => {
            warn!(%kind, group = original_group, row_id = %original_row_id, error = %e, "Update failed");
            Ok(false)
        }
    }
}
