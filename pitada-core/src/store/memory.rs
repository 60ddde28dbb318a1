//! In-memory document store.
//!
//! Backs the test suites and local development with the same predicate
//! semantics the managed store provides, including disjunctive clauses,
//! order-by range bounds, and field-level array union/remove.

use chrono::Utc;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{self, AtomicBool};
use std::sync::RwLock;
use uuid::Uuid;

use super::query::{Filter, Query, DOCUMENT_ID};
use super::{DocRef, Document, FieldWrite, Value, WriteBatch};
use crate::error::StoreError;
use crate::store::DocumentStore;
use async_trait::async_trait;

/// In-memory [`DocumentStore`] implementation.
///
/// Documents within a collection are kept in identifier order, which serves
/// as the store-defined result order for unordered queries.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Document>>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an unreachable backend: while set, every operation fails
    /// with [`StoreError::Backend`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable
            .store(unavailable, atomic::Ordering::SeqCst);
    }

    /// Seed a document at a known identifier.
    pub fn insert_with_id(&self, collection: &str, id: &str, fields: Vec<(&str, Value)>) {
        let fields = fields
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let mut collections = self.collections.write().expect("store lock poisoned");
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), Document::new(id, fields));
    }

    /// Seed a lookup document carrying only a `label` field.
    pub fn insert_label(&self, collection: &str, id: &str, label: &str) {
        self.insert_with_id(collection, id, vec![("label", Value::from(label))]);
    }

    fn guard(&self) -> Result<(), StoreError> {
        if self.unavailable.load(atomic::Ordering::SeqCst) {
            Err(StoreError::Backend("store unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

/// Field lookup with the document-id pseudo path resolved.
fn field_value(doc: &Document, field: &str) -> Option<Value> {
    if field == DOCUMENT_ID {
        Some(Value::String(doc.id.clone()))
    } else {
        doc.fields.get(field).cloned()
    }
}

fn matches(doc: &Document, filter: &Filter) -> bool {
    match filter {
        Filter::Eq { field, value } => field_value(doc, field).is_some_and(|v| v == *value),
        Filter::In { field, values } => field_value(doc, field).is_some_and(|v| values.contains(&v)),
        Filter::ArrayContainsAny { field, values } => match field_value(doc, field) {
            Some(Value::Array(items)) => items.iter().any(|item| values.contains(item)),
            _ => false,
        },
    }
}

/// Ordering between two values of the same kind; mixed kinds compare equal,
/// which leaves store order untouched.
fn value_cmp(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
        (Value::Double(a), Value::Double(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

fn apply_writes(fields: &mut BTreeMap<String, Value>, writes: WriteBatch) {
    for (name, write) in writes {
        match write {
            FieldWrite::Set(value) => {
                fields.insert(name, value);
            }
            FieldWrite::ServerTimestamp => {
                fields.insert(name, Value::Timestamp(Utc::now()));
            }
            FieldWrite::ArrayUnion(values) => {
                let entry = fields.entry(name).or_insert_with(|| Value::Array(Vec::new()));
                let items = match entry {
                    Value::Array(items) => items,
                    other => {
                        *other = Value::Array(Vec::new());
                        match other {
                            Value::Array(items) => items,
                            _ => unreachable!(),
                        }
                    }
                };
                for value in values {
                    if !items.contains(&value) {
                        items.push(value);
                    }
                }
            }
            FieldWrite::ArrayRemove(values) => {
                let entry = fields.entry(name).or_insert_with(|| Value::Array(Vec::new()));
                if let Value::Array(items) = entry {
                    items.retain(|item| !values.contains(item));
                } else {
                    *entry = Value::Array(Vec::new());
                }
            }
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        self.guard()?;
        let collections = self.collections.read().expect("store lock poisoned");
        Ok(collections
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn get(&self, doc: &DocRef) -> Result<Option<Document>, StoreError> {
        self.guard()?;
        let collections = self.collections.read().expect("store lock poisoned");
        Ok(collections
            .get(&doc.collection)
            .and_then(|docs| docs.get(&doc.id))
            .cloned())
    }

    async fn run_query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        self.guard()?;
        let collections = self.collections.read().expect("store lock poisoned");
        let mut results: Vec<Document> = collections
            .get(&query.collection)
            .map(|docs| {
                docs.values()
                    .filter(|doc| query.filters.iter().all(|f| matches(doc, f)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &query.order {
            // Documents without the ordered field fall out of the result.
            results.retain(|doc| field_value(doc, &order.field).is_some());
            results.sort_by(|a, b| {
                let av = field_value(a, &order.field).unwrap_or(Value::Null);
                let bv = field_value(b, &order.field).unwrap_or(Value::Null);
                value_cmp(&av, &bv)
            });
            if let Some(start) = &order.start_at {
                results.retain(|doc| {
                    field_value(doc, &order.field)
                        .is_some_and(|v| value_cmp(&v, start) != Ordering::Less)
                });
            }
            if let Some(end) = &order.end_at {
                results.retain(|doc| {
                    field_value(doc, &order.field)
                        .is_some_and(|v| value_cmp(&v, end) != Ordering::Greater)
                });
            }
        }

        Ok(results)
    }

    async fn create(&self, collection: &str, fields: WriteBatch) -> Result<String, StoreError> {
        self.guard()?;
        let id = Uuid::new_v4().to_string();
        let mut doc_fields = BTreeMap::new();
        apply_writes(&mut doc_fields, fields);
        let mut collections = self.collections.write().expect("store lock poisoned");
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), Document::new(id.clone(), doc_fields));
        Ok(id)
    }

    async fn update(&self, doc: &DocRef, fields: WriteBatch) -> Result<(), StoreError> {
        self.guard()?;
        let mut collections = self.collections.write().expect("store lock poisoned");
        let existing = collections
            .get_mut(&doc.collection)
            .and_then(|docs| docs.get_mut(&doc.id))
            .ok_or_else(|| StoreError::NotFound(doc.to_string()))?;
        apply_writes(&mut existing.fields, fields);
        Ok(())
    }

    async fn set(&self, doc: &DocRef, fields: WriteBatch, merge: bool) -> Result<(), StoreError> {
        self.guard()?;
        let mut collections = self.collections.write().expect("store lock poisoned");
        let docs = collections.entry(doc.collection.clone()).or_default();
        match docs.get_mut(&doc.id) {
            Some(existing) if merge => {
                apply_writes(&mut existing.fields, fields);
            }
            _ => {
                let mut doc_fields = BTreeMap::new();
                apply_writes(&mut doc_fields, fields);
                docs.insert(doc.id.clone(), Document::new(doc.id.clone(), doc_fields));
            }
        }
        Ok(())
    }

    async fn delete(&self, doc: &DocRef) -> Result<(), StoreError> {
        self.guard()?;
        let mut collections = self.collections.write().expect("store lock poisoned");
        if let Some(docs) = collections.get_mut(&doc.collection) {
            docs.remove(&doc.id);
        }
        Ok(())
    }
}
