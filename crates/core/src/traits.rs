//! The persistence provider contract
//!
//! Any backend that can do point lookups, per-group scans, full scans and an
//! atomic batched commit can host the master data store. The bundled backend
//! is `masterdata_storage::MemoryStore`.

use crate::batch::WriteBatch;
use crate::entity::{EntityKind, Record};
use crate::error::StoreResult;
use crate::types::RowId;

/// Generic keyed persistence
///
/// Rows are addressed by a two-part identity (group, row_id). Scans return
/// rows in the provider's natural order; the bundled provider uses commit
/// order, which is what "first match" resolves against.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`. Staging happens on a caller-owned
/// [`WriteBatch`], so the provider only needs to make `commit` itself safe.
pub trait PersistenceProvider: Send + Sync {
    /// Point lookup by composite identity
    fn lookup(&self, kind: EntityKind, group: &str, row_id: &RowId) -> StoreResult<Option<Record>>;

    /// First row in `group` whose name equals `name`, in scan order
    fn lookup_by_name(
        &self,
        kind: EntityKind,
        group: &str,
        name: &str,
    ) -> StoreResult<Option<Record>>;

    /// All rows in `group`
    fn scan_group(&self, kind: EntityKind, group: &str) -> StoreResult<Vec<Record>>;

    /// All rows of `kind`
    fn scan_all(&self, kind: EntityKind) -> StoreResult<Vec<Record>>;

    /// Apply a batch and report the number of rows written
    ///
    /// A failed commit must leave storage unchanged.
    fn commit(&self, batch: WriteBatch) -> StoreResult<u64>;

    /// Push buffered writes to stable storage
    fn flush(&self) -> StoreResult<()> {
        Ok(())
    }
}
