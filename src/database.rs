//! Main entry point for a master data store.
//!
//! This module provides the `MasterData` struct, which wires the registries
//! and the reconciler to one shared persistence provider.

use crate::config::{MasterDataConfig, ReconcileStrategy};
use crate::error::Result;
use crate::primitives::{MasterKeys, MasterValues, Reconciler};
use masterdata_core::PersistenceProvider;
use masterdata_storage::{Durability, MemoryStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// A master data store.
///
/// Create one with [`MasterData::open`], [`MasterData::ephemeral`] or
/// [`MasterData::builder`].
///
/// # Example
///
/// ```ignore
/// use masterdata::prelude::*;
///
/// let db = MasterData::open("./master.journal")?;
///
/// db.keys.insert(MasterKey::new("Priority", "admin"))?;
/// let high = db.values.find_by_name("Priority", "High")?;
///
/// let report = db.reconciler.reconcile_rows(rows)?;
/// db.flush()?;
/// ```
pub struct MasterData {
    /// The shared persistence provider
    pub(crate) inner: Arc<dyn PersistenceProvider>,

    config: Arc<MasterDataConfig>,

    /// Key-group operations
    pub keys: MasterKeys,

    /// Value operations
    pub values: MasterValues,

    /// Bulk reconciliation
    pub reconciler: Reconciler,
}

impl MasterData {
    /// Open a journal-backed store at the given file path.
    ///
    /// Uses default settings (buffered durability, per-row reconciliation).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::builder().path(path).open()
    }

    /// Create a store with no disk I/O.
    ///
    /// All data is gone when the store is dropped. Use this for tests and
    /// one-off imports.
    pub fn ephemeral() -> Result<Self> {
        Self::builder().open()
    }

    /// Create a builder for store configuration.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let db = MasterData::builder()
    ///     .path("./master.journal")
    ///     .strategy(ReconcileStrategy::Indexed)
    ///     .unique_names(true)
    ///     .strict()
    ///     .open()?;
    /// ```
    pub fn builder() -> MasterDataBuilder {
        MasterDataBuilder::new()
    }

    /// Force pending journal writes to disk.
    ///
    /// In buffered mode, commits reach the OS but are not fsynced.
    pub fn flush(&self) -> Result<()> {
        Ok(self.inner.flush()?)
    }

    /// The configuration this store was opened with
    pub fn config(&self) -> &MasterDataConfig {
        &self.config
    }

    /// The underlying persistence provider
    pub fn provider(&self) -> &Arc<dyn PersistenceProvider> {
        &self.inner
    }

    fn from_provider(provider: Arc<dyn PersistenceProvider>, config: MasterDataConfig) -> Self {
        let config = Arc::new(config);
        Self {
            keys: MasterKeys::new(provider.clone()),
            values: MasterValues::new(provider.clone()),
            reconciler: Reconciler::new(provider.clone(), config.clone()),
            inner: provider,
            config,
        }
    }
}

/// Builder for store configuration.
///
/// Without a path the store is ephemeral. A custom provider replaces the
/// built-in store entirely; `path`, `unique_names` and durability are then
/// ignored.
pub struct MasterDataBuilder {
    path: Option<PathBuf>,
    config: MasterDataConfig,
    provider: Option<Arc<dyn PersistenceProvider>>,
}

impl MasterDataBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            path: None,
            config: MasterDataConfig::default(),
            provider: None,
        }
    }

    /// Set the journal file path.
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: MasterDataConfig) -> Self {
        self.config = config;
        self
    }

    /// Actor stamped on rows the reconciler creates.
    pub fn system_actor(mut self, actor: impl Into<String>) -> Self {
        self.config.system_actor = actor.into();
        self
    }

    /// Existing-row lookup strategy for reconciliation.
    pub fn strategy(mut self, strategy: ReconcileStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// Reject a second value with the same (group, name) at commit time.
    pub fn unique_names(mut self, enabled: bool) -> Self {
        self.config.enforce_unique_names = enabled;
        self
    }

    /// Sync the journal on every commit.
    pub fn strict(mut self) -> Self {
        self.config.durability = Durability::Strict;
        self
    }

    /// Write the journal on every commit, sync on `flush` (default).
    pub fn buffered(mut self) -> Self {
        self.config.durability = Durability::Buffered;
        self
    }

    /// Use a custom persistence provider.
    pub fn provider(mut self, provider: Arc<dyn PersistenceProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Open the store.
    pub fn open(self) -> Result<MasterData> {
        let provider: Arc<dyn PersistenceProvider> = match (self.provider, self.path) {
            (Some(provider), _) => provider,
            (None, Some(path)) => {
                let store = MemoryStore::open(&path, self.config.durability)?
                    .with_unique_value_names(self.config.enforce_unique_names);
                info!(
                    path = %path.display(),
                    durability = self.config.durability.description(),
                    "Opened master data store"
                );
                Arc::new(store)
            }
            (None, None) => Arc::new(
                MemoryStore::ephemeral().with_unique_value_names(self.config.enforce_unique_names),
            ),
        };
        Ok(MasterData::from_provider(provider, self.config))
    }
}

impl Default for MasterDataBuilder {
    fn default() -> Self {
        Self::new()
    }
}
