//! Durability mode for journal writes.
//!
//! Defines when committed batches are forced to disk.

use serde::{Deserialize, Serialize};

/// Durability mode for journal writes.
///
/// | Mode | fsync | Use Case |
/// |------|-------|----------|
/// | Buffered | left to the OS | Default, interactive editing |
/// | Strict | every commit | Imports that must survive power loss |
///
/// An ephemeral store has no journal at all and ignores this setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Durability {
    /// Append without fsync; a crash may lose the most recent commits.
    #[default]
    Buffered,

    /// fsync after every commit.
    Strict,
}

impl Durability {
    /// Check if this mode requires immediate fsync on every commit.
    pub fn requires_immediate_fsync(&self) -> bool {
        matches!(self, Durability::Strict)
    }

    /// Human-readable description of the mode.
    pub fn description(&self) -> &'static str {
        match self {
            Durability::Buffered => "Buffered appends (OS decides when to sync)",
            Durability::Strict => "fsync on every commit (safest, slowest)",
        }
    }
}
