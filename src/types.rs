//! Public types re-exported from the internal crates.

// Entities
pub use masterdata_core::{Audit, MasterKey, MasterValue, RowId, SYSTEM_ACTOR};

// Provider seam, for custom backends
pub use masterdata_core::{
    Entity, EntityKind, Mutation, PersistenceProvider, Record, StoreError, StoreResult, WriteBatch,
};

// Built-in provider
pub use masterdata_storage::{Durability, MemoryStore};
