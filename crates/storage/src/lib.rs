//! Storage layer for master data
//!
//! This crate implements the bundled persistence provider:
//! - ShardedTable: DashMap-by-group tables with insertion-ordered scans
//! - MemoryStore: serialized validate-then-apply commits, optional unique
//!   (group, name) constraint for values
//! - Journal: append-only commit log replayed on open

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod sharded;
pub mod store;
pub mod wal;

pub use sharded::{Shard, ShardedTable};
pub use store::MemoryStore;
pub use wal::{Durability, Journal};
