//! Core types for master data
//!
//! This module defines the fundamental types used throughout the system:
//! - [`RowId`]: Generated unique identifier for a stored row
//! - [`Audit`]: Created/updated metadata carried by every row
//! - [`MasterKey`]: A named key-group
//! - [`MasterValue`]: A named value scoped to a key-group

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Actor recorded on rows created by the system rather than a user.
pub const SYSTEM_ACTOR: &str = "System";

/// Unique identifier for a stored row
///
/// Row identifiers are opaque strings. Freshly generated ones are UUID v4
/// renderings, but rows loaded from elsewhere may carry any non-empty string,
/// so the type does not insist on UUID syntax.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(String);

impl RowId {
    /// Generate a new random RowId (UUID v4)
    ///
    /// # Examples
    ///
    /// ```
    /// use masterdata_core::RowId;
    ///
    /// let a = RowId::generate();
    /// let b = RowId::generate();
    /// assert_ne!(a, b);
    /// ```
    pub fn generate() -> Self {
        RowId(Uuid::new_v4().to_string())
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if the identifier is the empty string
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowId {
    fn from(s: &str) -> Self {
        RowId(s.to_string())
    }
}

impl From<String> for RowId {
    fn from(s: String) -> Self {
        RowId(s)
    }
}

impl AsRef<str> for RowId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Created/updated metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Audit {
    /// Who created the row
    pub created_by: String,
    /// Who last changed the row
    pub updated_by: String,
    /// When the row was created
    pub created_at: DateTime<Utc>,
    /// When the row was last changed
    pub updated_at: DateTime<Utc>,
}

impl Audit {
    /// Audit stamp for a row created now by `actor`
    pub fn created_by(actor: impl Into<String>) -> Self {
        let actor = actor.into();
        let now = Utc::now();
        Self {
            created_by: actor.clone(),
            updated_by: actor,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record a change made now by `actor`
    pub fn touch(&mut self, actor: impl Into<String>) {
        self.updated_by = actor.into();
        self.updated_at = Utc::now();
    }
}

/// A key-group
///
/// `group` is the identifier values point at; by convention it equals
/// `name` when the group is created, but `name` may be edited afterwards
/// while `group` never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterKey {
    /// Group identifier (first half of the composite identity)
    pub group: String,
    /// Row identifier (second half of the composite identity)
    pub row_id: RowId,
    /// Display name
    pub name: String,
    /// Soft lifecycle flag
    pub is_active: bool,
    /// Soft delete flag
    pub is_deleted: bool,
    /// Created/updated metadata
    pub audit: Audit,
}

impl MasterKey {
    /// New key-group whose group identifier is its own name
    ///
    /// # Examples
    ///
    /// ```
    /// use masterdata_core::MasterKey;
    ///
    /// let key = MasterKey::new("Priority", "admin");
    /// assert_eq!(key.group, "Priority");
    /// assert_eq!(key.name, "Priority");
    /// assert!(!key.is_active);
    /// ```
    pub fn new(name: impl Into<String>, actor: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            group: name.clone(),
            row_id: RowId::generate(),
            name,
            is_active: false,
            is_deleted: false,
            audit: Audit::created_by(actor),
        }
    }

    /// Set the active flag
    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }
}

/// A value scoped to a key-group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterValue {
    /// Owning group (not enforced; orphans are tolerated)
    pub group: String,
    /// Row identifier, unique per value
    pub row_id: RowId,
    /// Logical name, unique within a group only by reconciliation
    pub name: String,
    /// Soft lifecycle flag
    pub is_active: bool,
    /// Soft delete flag
    pub is_deleted: bool,
    /// Created/updated metadata
    pub audit: Audit,
}

impl MasterValue {
    /// New value in `group` with a freshly generated row id
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        actor: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            row_id: RowId::generate(),
            name: name.into(),
            is_active: false,
            is_deleted: false,
            audit: Audit::created_by(actor),
        }
    }

    /// Set the active flag
    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Set the deleted flag
    pub fn deleted(mut self, is_deleted: bool) -> Self {
        self.is_deleted = is_deleted;
        self
    }
}
