//! Document-store abstraction.
//!
//! All persistence goes through the [`DocumentStore`] trait so the service
//! layer can be exercised against [`MemoryStore`] in tests and wired to the
//! managed store client at deployment time.

mod memory;
mod query;

pub use memory::MemoryStore;
pub use query::{Filter, OrderBy, Query, DOCUMENT_ID, MAX_DISJUNCTION};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::StoreError;

/// Collection names used by the application.
pub mod collections {
    pub const RECIPES: &str = "recipes";
    pub const CATEGORIES: &str = "categories";
    pub const DIFFICULTIES: &str = "difficulties";
    pub const TIMES: &str = "times";
    pub const UNITS: &str = "units";
    pub const FOOD_TYPES: &str = "foodTypes";
    pub const USERS: &str = "users";
}

/// Typed pointer to a document: collection plus identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocRef {
    pub collection: String,
    pub id: String,
}

impl DocRef {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for DocRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// A field value as stored in the document store.
///
/// References and timestamps are first-class values, distinguishable at
/// runtime from plain strings. Historical records sometimes hold a bare
/// identifier string where a reference is expected; [`Value::reference_in`]
/// normalizes both forms.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Double(f64),
    String(String),
    Array(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Reference(DocRef),
    Timestamp(DateTime<Utc>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Normalize a reference-shaped value into a canonical [`DocRef`].
    ///
    /// Accepts a typed reference or, for backward compatibility with older
    /// records, a bare non-empty identifier string interpreted against
    /// `default_collection`.
    pub fn reference_in(&self, default_collection: &str) -> Option<DocRef> {
        match self {
            Value::Reference(r) => Some(r.clone()),
            Value::String(id) if !id.trim().is_empty() => {
                Some(DocRef::new(default_collection, id.clone()))
            }
            _ => None,
        }
    }

    /// Identifier carried by a reference-shaped value, whichever form it has.
    pub fn reference_id(&self) -> Option<&str> {
        match self {
            Value::Reference(r) => Some(&r.id),
            Value::String(id) if !id.trim().is_empty() => Some(id),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<DocRef> for Value {
    fn from(r: DocRef) -> Self {
        Value::Reference(r)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Timestamp(t)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Option<Value>> for Value {
    fn from(v: Option<Value>) -> Self {
        v.unwrap_or(Value::Null)
    }
}

/// A document read from the store: its identifier plus raw fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: BTreeMap<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: BTreeMap<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    /// String field with a default for absent, null, or empty values.
    pub fn str_or(&self, field: &str, default: &str) -> String {
        match self.str_field(field) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => default.to_string(),
        }
    }

    /// String elements of an array field; non-string elements are dropped.
    pub fn string_array(&self, field: &str) -> Vec<String> {
        self.get(field)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Timestamp field as an ISO-8601 string. Absent or non-timestamp values
    /// map to `None`, never to the current time.
    pub fn timestamp_iso(&self, field: &str) -> Option<String> {
        self.get(field)
            .and_then(Value::as_timestamp)
            .map(|t| t.to_rfc3339())
    }

    /// Reference-shaped field normalized to a [`DocRef`].
    pub fn reference_in(&self, field: &str, default_collection: &str) -> Option<DocRef> {
        self.get(field)
            .and_then(|v| v.reference_in(default_collection))
    }

    /// Identifier of a reference-shaped field (shallow, no lookup).
    pub fn reference_id(&self, field: &str) -> Option<String> {
        self.get(field)
            .and_then(Value::reference_id)
            .map(str::to_string)
    }
}

/// A single field mutation within a write.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldWrite {
    /// Overwrite the field with a value.
    Set(Value),
    /// Stamp the field with the store's server-side time.
    ServerTimestamp,
    /// Add the given elements to an array field, skipping ones already
    /// present. Safe under concurrent toggles, unlike a raw array write.
    ArrayUnion(Vec<Value>),
    /// Remove all occurrences of the given elements from an array field.
    ArrayRemove(Vec<Value>),
}

/// Named field mutations applied together to one document.
pub type WriteBatch = Vec<(String, FieldWrite)>;

/// Client for the managed document store.
///
/// Mirrors the store's native surface: collection reads, limited compound
/// queries, document-level writes, and field-level atomic array operations.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read every document in a collection.
    async fn get_all(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    /// Read a single document. `Ok(None)` when it does not exist.
    async fn get(&self, doc: &DocRef) -> Result<Option<Document>, StoreError>;

    /// Execute a query. Result order is store-defined.
    async fn run_query(&self, query: &Query) -> Result<Vec<Document>, StoreError>;

    /// Create a document with a store-assigned identifier.
    async fn create(&self, collection: &str, fields: WriteBatch) -> Result<String, StoreError>;

    /// Patch fields of an existing document. Fails if the document is absent.
    async fn update(&self, doc: &DocRef, fields: WriteBatch) -> Result<(), StoreError>;

    /// Write a document at a known identifier. With `merge`, existing fields
    /// not named in the batch are kept; otherwise the document is replaced.
    async fn set(&self, doc: &DocRef, fields: WriteBatch, merge: bool) -> Result<(), StoreError>;

    /// Delete a document. Deleting an absent document is not an error.
    async fn delete(&self, doc: &DocRef) -> Result<(), StoreError>;
}
