//! Master Data Comprehensive Test Suite
//!
//! Exercises the public `MasterData` facade end to end: the registries, bulk
//! reconciliation, the lenient boolean contract under provider failure, and
//! journal recovery.
//!
//! ## Running Tests
//!
//! ```bash
//! # Run the whole suite
//! cargo test --test master_data_comprehensive
//!
//! # Reconciliation tests only
//! cargo test --test master_data_comprehensive reconciliation::
//! ```

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use masterdata::prelude::*;
use masterdata::{
    EntityKind, MemoryStore, PersistenceProvider, Record, StoreError, StoreResult, WriteBatch,
    SYSTEM_ACTOR,
};
use parking_lot::Mutex;

// Test modules
pub mod concurrency;
pub mod reconciliation;

// =============================================================================
// SHARED TEST UTILITIES
// =============================================================================

/// Create an ephemeral store with default settings
pub fn create_db() -> MasterData {
    MasterData::ephemeral().expect("Failed to create ephemeral store")
}

/// Create an ephemeral store using `strategy` for reconciliation
pub fn create_db_with(strategy: ReconcileStrategy) -> MasterData {
    MasterData::builder()
        .strategy(strategy)
        .open()
        .expect("Failed to create ephemeral store")
}

/// Create a store over a custom provider
pub fn create_db_over(provider: Arc<dyn PersistenceProvider>) -> MasterData {
    MasterData::builder()
        .provider(provider)
        .open()
        .expect("Failed to create store over provider")
}

/// Shorthand for an import row
pub fn row(group: &str, name: &str, is_active: bool) -> ImportRow {
    ImportRow::new(group, name, is_active)
}

/// Stored values as (group, name, is_active, is_deleted), ignoring row ids and audit
pub fn value_state(db: &MasterData) -> Vec<(String, String, bool, bool)> {
    let mut state: Vec<_> = db
        .values
        .list_all()
        .unwrap()
        .into_iter()
        .map(|v| (v.group, v.name, v.is_active, v.is_deleted))
        .collect();
    state.sort();
    state
}

/// Stored key-groups as (group, name, is_active), ignoring row ids and audit
pub fn key_state(db: &MasterData) -> Vec<(String, String, bool)> {
    let mut state: Vec<_> = db
        .keys
        .list_all()
        .unwrap()
        .into_iter()
        .map(|k| (k.group, k.name, k.is_active))
        .collect();
    state.sort();
    state
}

// =============================================================================
// FAULT INJECTION
// =============================================================================

/// Provider that delegates to a `MemoryStore` and fails on demand
pub struct FlakyProvider {
    pub inner: MemoryStore,
    fail_reads: AtomicBool,
    fail_commits: AtomicBool,
    swallow_commits: AtomicBool,
    commits: AtomicUsize,
}

impl FlakyProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryStore::ephemeral(),
            fail_reads: AtomicBool::new(false),
            fail_commits: AtomicBool::new(false),
            swallow_commits: AtomicBool::new(false),
            commits: AtomicUsize::new(0),
        })
    }

    /// Make every lookup and scan fail
    pub fn fail_reads(&self, on: bool) {
        self.fail_reads.store(on, Ordering::SeqCst);
    }

    /// Make every commit fail without writing
    pub fn fail_commits(&self, on: bool) {
        self.fail_commits.store(on, Ordering::SeqCst);
    }

    /// Make every commit report zero rows without writing
    pub fn swallow_commits(&self, on: bool) {
        self.swallow_commits.store(on, Ordering::SeqCst);
    }

    /// Commit calls seen, including failed ones
    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    fn check_read(&self) -> StoreResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected read failure".into()));
        }
        Ok(())
    }
}

impl PersistenceProvider for FlakyProvider {
    fn lookup(&self, kind: EntityKind, group: &str, row_id: &RowId) -> StoreResult<Option<Record>> {
        self.check_read()?;
        self.inner.lookup(kind, group, row_id)
    }

    fn lookup_by_name(&self, kind: EntityKind, group: &str, name: &str) -> StoreResult<Option<Record>> {
        self.check_read()?;
        self.inner.lookup_by_name(kind, group, name)
    }

    fn scan_group(&self, kind: EntityKind, group: &str) -> StoreResult<Vec<Record>> {
        self.check_read()?;
        self.inner.scan_group(kind, group)
    }

    fn scan_all(&self, kind: EntityKind) -> StoreResult<Vec<Record>> {
        self.check_read()?;
        self.inner.scan_all(kind)
    }

    fn commit(&self, batch: WriteBatch) -> StoreResult<u64> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected commit failure".into()));
        }
        if self.swallow_commits.load(Ordering::SeqCst) {
            return Ok(0);
        }
        self.inner.commit(batch)
    }
}

/// Provider that lets a competing writer commit right before the next batch
///
/// Models two reconciliations racing on the same (group, name): the
/// competitor lands between our reads and our commit.
pub struct RacingProvider {
    pub inner: MemoryStore,
    competitor: Mutex<Option<WriteBatch>>,
}

impl RacingProvider {
    pub fn new(unique_value_names: bool) -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryStore::ephemeral().with_unique_value_names(unique_value_names),
            competitor: Mutex::new(None),
        })
    }

    /// Commit `batch` just before the next commit we are asked to do
    pub fn race_with(&self, batch: WriteBatch) {
        *self.competitor.lock() = Some(batch);
    }
}

impl PersistenceProvider for RacingProvider {
    fn lookup(&self, kind: EntityKind, group: &str, row_id: &RowId) -> StoreResult<Option<Record>> {
        self.inner.lookup(kind, group, row_id)
    }

    fn lookup_by_name(&self, kind: EntityKind, group: &str, name: &str) -> StoreResult<Option<Record>> {
        self.inner.lookup_by_name(kind, group, name)
    }

    fn scan_group(&self, kind: EntityKind, group: &str) -> StoreResult<Vec<Record>> {
        self.inner.scan_group(kind, group)
    }

    fn scan_all(&self, kind: EntityKind) -> StoreResult<Vec<Record>> {
        self.inner.scan_all(kind)
    }

    fn commit(&self, batch: WriteBatch) -> StoreResult<u64> {
        if let Some(competing) = self.competitor.lock().take() {
            self.inner.commit(competing)?;
        }
        self.inner.commit(batch)
    }
}
