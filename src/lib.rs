//! # Master Data
//!
//! Embedded store for configuration-style reference data: key-groups
//! (`Priority`, `Status`, ...) and the values inside them (`High`, `Low`, ...).
//!
//! ## Quick Start
//!
//! ```ignore
//! use masterdata::prelude::*;
//!
//! let db = MasterData::open("./master.journal")?;
//!
//! // Registries
//! db.keys.insert(MasterKey::new("Priority", "admin").active(true))?;
//! db.values.insert(MasterValue::new("Priority", "High", "admin"))?;
//!
//! // Bulk import: missing key-groups are created, existing values merged
//! let rows = ImportFormat::Tsv.parse(std::io::BufReader::new(file))?;
//! let report = db.reconciler.reconcile_rows(rows)?;
//! ```
//!
//! ## Areas
//!
//! - [`MasterKeys`] - key-group queries and mutations
//! - [`MasterValues`] - value queries and mutations
//! - [`Reconciler`] - duplicate-free bulk merge
//!
//! Registry `insert`/`update` calls return `Ok(false)` on provider failure
//! instead of an error; see [`MasterKeys::insert`].

#![warn(missing_docs)]

mod config;
mod database;
mod error;
pub mod import;
mod primitives;
mod types;

pub mod prelude;

// Re-export main entry points
pub use config::{MasterDataConfig, ReconcileStrategy};
pub use database::{MasterData, MasterDataBuilder};
pub use error::{Error, Result};

// Re-export areas
pub use primitives::{MasterKeys, MasterValues, ReconcileReport, Reconciler};

// Re-export types
pub use types::*;
