//! Core types for the master data store
//!
//! This crate defines the shared vocabulary of the system:
//! - [`MasterKey`] / [`MasterValue`]: the two entity types
//! - [`Record`] / [`EntityKind`]: the untyped envelope the persistence layer moves around
//! - [`WriteBatch`]: caller-owned staging area for inserts and updates
//! - [`PersistenceProvider`]: the contract every storage backend implements
//! - [`Repository`]: typed read access on top of a provider

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod entity;
pub mod error;
pub mod repository;
pub mod traits;
pub mod types;

pub use batch::{Mutation, WriteBatch};
pub use entity::{Entity, EntityKind, Record};
pub use error::{StoreError, StoreResult};
pub use repository::Repository;
pub use traits::PersistenceProvider;
pub use types::{Audit, MasterKey, MasterValue, RowId, SYSTEM_ACTOR};
