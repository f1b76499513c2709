//! Convenient imports for master data.
//!
//! ```ignore
//! use masterdata::prelude::*;
//!
//! let db = MasterData::ephemeral()?;
//! db.keys.insert(MasterKey::new("Priority", "admin"))?;
//! ```

// Main entry point
pub use crate::database::{MasterData, MasterDataBuilder};

// Configuration
pub use crate::config::{MasterDataConfig, ReconcileStrategy};

// Error handling
pub use crate::error::{Error, Result};

// Areas
pub use crate::primitives::{MasterKeys, MasterValues, ReconcileReport, Reconciler};

// Import
pub use crate::import::{ImportFormat, ImportRow};

// Core types
pub use crate::types::{Audit, MasterKey, MasterValue, RowId};
