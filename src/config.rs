//! Configuration for a master data store.
//!
//! Every field has a default, so an empty TOML document is a valid config:
//!
//! ```toml
//! system_actor = "System"
//! strategy = "per_row"          # or "indexed"
//! enforce_unique_names = false
//! conflict_retries = 1
//! durability = "buffered"       # or "strict"
//! ```

use crate::error::Result;
use masterdata_core::SYSTEM_ACTOR;
use masterdata_storage::Durability;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the reconciler finds existing rows.
///
/// Both strategies produce the same stored state for the same input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileStrategy {
    /// Re-query storage for every candidate. O(n²) scans; fine for
    /// configuration-sized batches.
    #[default]
    PerRow,

    /// Pre-fetch each referenced group once into an index keyed by
    /// (group, name).
    Indexed,
}

/// Store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MasterDataConfig {
    /// Actor stamped on rows created by reconciliation
    pub system_actor: String,

    /// Existing-row lookup strategy for reconciliation
    pub strategy: ReconcileStrategy,

    /// Reject a second value with the same (group, name) at commit time
    pub enforce_unique_names: bool,

    /// How often a reconciliation is re-run after a unique-name conflict
    pub conflict_retries: u32,

    /// Journal sync policy (ignored for ephemeral stores)
    pub durability: Durability,
}

impl Default for MasterDataConfig {
    fn default() -> Self {
        Self {
            system_actor: SYSTEM_ACTOR.to_string(),
            strategy: ReconcileStrategy::PerRow,
            enforce_unique_names: false,
            conflict_retries: 1,
            durability: Durability::Buffered,
        }
    }
}

impl MasterDataConfig {
    /// Parse a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Read and parse a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
