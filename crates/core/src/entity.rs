//! Entity envelope shared by the persistence layer
//!
//! Providers store and return [`Record`]s tagged with an [`EntityKind`];
//! the [`Entity`] trait converts between a record and its typed form.

use crate::types::{Audit, MasterKey, MasterValue, RowId};
use serde::{Deserialize, Serialize};

/// Which table a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Key-groups
    MasterKey,
    /// Values scoped to a key-group
    MasterValue,
}

impl EntityKind {
    /// Stable lowercase name, used in logs and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::MasterKey => "master_key",
            EntityKind::MasterValue => "master_value",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored row of either kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Record {
    /// A key-group row
    Key(MasterKey),
    /// A value row
    Value(MasterValue),
}

impl Record {
    /// Table this record lives in
    pub fn kind(&self) -> EntityKind {
        match self {
            Record::Key(_) => EntityKind::MasterKey,
            Record::Value(_) => EntityKind::MasterValue,
        }
    }

    /// Group half of the composite identity
    pub fn group(&self) -> &str {
        match self {
            Record::Key(k) => &k.group,
            Record::Value(v) => &v.group,
        }
    }

    /// Row half of the composite identity
    pub fn row_id(&self) -> &RowId {
        match self {
            Record::Key(k) => &k.row_id,
            Record::Value(v) => &v.row_id,
        }
    }

    /// Logical name
    pub fn name(&self) -> &str {
        match self {
            Record::Key(k) => &k.name,
            Record::Value(v) => &v.name,
        }
    }
}

/// A typed row that can travel through a [`Record`]
pub trait Entity: Clone + std::fmt::Debug + Send + Sync + 'static {
    /// Table for this type
    const KIND: EntityKind;

    /// Group half of the composite identity
    fn group(&self) -> &str;

    /// Row half of the composite identity
    fn row_id(&self) -> &RowId;

    /// Logical name
    fn name(&self) -> &str;

    /// Audit metadata
    fn audit(&self) -> &Audit;

    /// Mutable audit metadata
    fn audit_mut(&mut self) -> &mut Audit;

    /// Copy the mutable fields (`name`, `is_active`, `is_deleted`) from `other`.
    ///
    /// Identity (`group`, `row_id`) and audit metadata are left alone.
    fn merge_from(&mut self, other: &Self);

    /// Wrap into the untyped envelope
    fn into_record(self) -> Record;

    /// Unwrap from the envelope; `None` if the record is of another kind
    fn from_record(record: Record) -> Option<Self>;

    /// Borrow from the envelope; `None` if the record is of another kind
    fn from_record_ref(record: &Record) -> Option<&Self>;

    /// Mutably borrow from the envelope; `None` if the record is of another kind
    fn from_record_mut(record: &mut Record) -> Option<&mut Self>;
}

impl Entity for MasterKey {
    const KIND: EntityKind = EntityKind::MasterKey;

    fn group(&self) -> &str {
        &self.group
    }

    fn row_id(&self) -> &RowId {
        &self.row_id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn audit(&self) -> &Audit {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut Audit {
        &mut self.audit
    }

    fn merge_from(&mut self, other: &Self) {
        self.is_active = other.is_active;
        self.is_deleted = other.is_deleted;
        self.name = other.name.clone();
    }

    fn into_record(self) -> Record {
        Record::Key(self)
    }

    fn from_record(record: Record) -> Option<Self> {
        match record {
            Record::Key(k) => Some(k),
            Record::Value(_) => None,
        }
    }

    fn from_record_ref(record: &Record) -> Option<&Self> {
        match record {
            Record::Key(k) => Some(k),
            Record::Value(_) => None,
        }
    }

    fn from_record_mut(record: &mut Record) -> Option<&mut Self> {
        match record {
            Record::Key(k) => Some(k),
            Record::Value(_) => None,
        }
    }
}

impl Entity for MasterValue {
    const KIND: EntityKind = EntityKind::MasterValue;

    fn group(&self) -> &str {
        &self.group
    }

    fn row_id(&self) -> &RowId {
        &self.row_id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn audit(&self) -> &Audit {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut Audit {
        &mut self.audit
    }

    fn merge_from(&mut self, other: &Self) {
        self.is_active = other.is_active;
        self.is_deleted = other.is_deleted;
        self.name = other.name.clone();
    }

    fn into_record(self) -> Record {
        Record::Value(self)
    }

    fn from_record(record: Record) -> Option<Self> {
        match record {
            Record::Value(v) => Some(v),
            Record::Key(_) => None,
        }
    }

    fn from_record_ref(record: &Record) -> Option<&Self> {
        match record {
            Record::Value(v) => Some(v),
            Record::Key(_) => None,
        }
    }

    fn from_record_mut(record: &mut Record) -> Option<&mut Self> {
        match record {
            Record::Value(v) => Some(v),
            Record::Key(_) => None,
        }
    }
}
