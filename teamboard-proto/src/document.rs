//! Schemaless document representation used by the remote store.
//!
//! A [`Document`] is an identifier plus a flat map of named
//! [`FieldValue`]s. Task records are encoded into documents before they
//! reach a store, and decoded back when a snapshot arrives.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Named field values of one document.
pub type FieldMap = BTreeMap<String, FieldValue>;

/// A single typed value stored in a document field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Explicit null.
    Null,
    /// Boolean flag.
    Bool(bool),
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit float.
    Double(f64),
    /// UTF-8 string.
    String(String),
    /// Point in time, UTC.
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    /// Returns a short name for the value's type, used in decode errors.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Double(_) => "double",
            Self::String(_) => "string",
            Self::Timestamp(_) => "timestamp",
        }
    }

    /// Returns the string payload, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean payload, if this is a bool.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the numeric payload; integers widen to `f64`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(d) => Some(*d),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Returns the timestamp payload, if this is a timestamp.
    #[must_use]
    pub const fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Rank of the value's type in the cross-type sort order.
    const fn type_rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Integer(_) | Self::Double(_) => 2,
            Self::Timestamp(_) => 3,
            Self::String(_) => 4,
        }
    }

    /// Total order used when sorting query results.
    ///
    /// Values of different types order by type rank
    /// (`null < bool < number < timestamp < string`). Integers and doubles
    /// compare numerically with each other.
    #[must_use]
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Integer(a), Self::Integer(b)) => a.cmp(b),
            (Self::String(a), Self::String(b)) => a.cmp(b),
            (Self::Timestamp(a), Self::Timestamp(b)) => a.cmp(b),
            (a, b) if a.type_rank() == 2 && b.type_rank() == 2 => {
                let (x, y) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
                x.total_cmp(&y)
            }
            (a, b) => a.type_rank().cmp(&b.type_rank()),
        }
    }
}

/// A stored document: identifier plus fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Store-unique document identifier.
    pub id: String,
    /// Field values keyed by name.
    pub fields: FieldMap,
}

impl Document {
    /// Creates a document from an id and a field map.
    pub fn new(id: impl Into<String>, fields: FieldMap) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Returns the value of a field, if present.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Overwrites the named fields, leaving every other field untouched.
    pub fn merge_fields(&mut self, update: &FieldMap) {
        for (name, value) in update {
            self.fields.insert(name.clone(), value.clone());
        }
    }
}

/// Every document of a store at one point in time, for persistence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Snapshot format version.
    pub version: u32,
    /// All documents, in id order.
    pub documents: Vec<Document>,
}

/// Current [`StoreSnapshot`] format version.
pub const SNAPSHOT_VERSION: u32 = 1;
