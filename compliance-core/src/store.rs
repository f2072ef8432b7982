//! Record store port.
//!
//! The compliance engine never assumes a storage technology; collaborators
//! hand it an implementation of [`RecordStore`]. Records are JSON documents
//! keyed by a string id within a named collection.

use crate::error::ComplianceError;
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use uuid::Uuid;

/// A stored document: id plus JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub body: Value,
}

impl Record {
    pub fn new(id: impl Into<String>, body: Value) -> Self {
        Self {
            id: id.into(),
            body,
        }
    }
}

/// Comparison operator for a filter condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Gte,
    Lte,
}

/// A single field condition; conditions in a [`Filter`] are ANDed.
#[derive(Debug, Clone)]
pub struct Condition {
    pub field: String,
    pub op: Op,
    pub value: Value,
}

/// Conjunctive filter over top-level record fields.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition {
            field: field.into(),
            op: Op::Eq,
            value: value.into(),
        });
        self
    }

    pub fn gte(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition {
            field: field.into(),
            op: Op::Gte,
            value: value.into(),
        });
        self
    }

    pub fn lte(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition {
            field: field.into(),
            op: Op::Lte,
            value: value.into(),
        });
        self
    }
}

/// Sort specification for query results.
#[derive(Debug, Clone)]
pub struct Sort {
    pub field: String,
    pub ascending: bool,
}

/// Generic record store consumed by the compliance engine.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Record>, ComplianceError>;

    /// Create a record. An empty id is replaced with a generated one.
    async fn create(&self, collection: &str, record: Record) -> Result<Record, ComplianceError>;

    /// Merge `patch`'s top-level fields into an existing record.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Value,
    ) -> Result<Record, ComplianceError>;

    async fn query(
        &self,
        collection: &str,
        filter: Filter,
        sort: Option<Sort>,
    ) -> Result<Vec<Record>, ComplianceError>;

    /// Atomically add `by` to an integer field, creating the record with
    /// the field at `by` when absent, and return the new value. This is
    /// the primitive backing document numbering: two concurrent callers
    /// must never observe the same result.
    async fn increment(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        by: i64,
    ) -> Result<i64, ComplianceError>;
}

/// In-memory store for tests and single-process deployments.
///
/// `increment` relies on dashmap's entry-level locking: the closure runs
/// under the shard lock for the key, so increments never interleave.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: DashMap<String, DashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn collection(&self, name: &str) -> dashmap::mapref::one::Ref<'_, String, DashMap<String, Value>> {
        self.collections
            .entry(name.to_string())
            .or_default()
            .downgrade()
    }

    fn matches(body: &Value, filter: &Filter) -> bool {
        filter.conditions.iter().all(|cond| {
            let Some(actual) = body.get(&cond.field) else {
                return false;
            };
            match cond.op {
                Op::Eq => actual == &cond.value,
                Op::Gte => compare(actual, &cond.value).map_or(false, |o| o.is_ge()),
                Op::Lte => compare(actual, &cond.value).map_or(false, |o| o.is_le()),
            }
        })
    }
}

/// Order two JSON scalars: numbers numerically, strings lexicographically
/// (ISO dates compare correctly this way).
fn compare(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Record>, ComplianceError> {
        let coll = self.collection(collection);
        Ok(coll
            .get(id)
            .map(|entry| Record::new(id, entry.value().clone())))
    }

    async fn create(&self, collection: &str, record: Record) -> Result<Record, ComplianceError> {
        let id = if record.id.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            record.id
        };
        let coll = self.collection(collection);
        if coll.contains_key(&id) {
            return Err(ComplianceError::Store(anyhow::anyhow!(
                "record '{}' already exists in '{}'",
                id,
                collection
            )));
        }
        coll.insert(id.clone(), record.body.clone());
        Ok(Record::new(id, record.body))
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Value,
    ) -> Result<Record, ComplianceError> {
        let coll = self.collection(collection);
        let mut entry = coll.get_mut(id).ok_or_else(|| {
            ComplianceError::Store(anyhow::anyhow!("record '{}' not found in '{}'", id, collection))
        })?;
        if let (Value::Object(body), Value::Object(fields)) = (entry.value_mut(), patch) {
            for (k, v) in fields {
                body.insert(k, v);
            }
        }
        Ok(Record::new(id, entry.value().clone()))
    }

    async fn query(
        &self,
        collection: &str,
        filter: Filter,
        sort: Option<Sort>,
    ) -> Result<Vec<Record>, ComplianceError> {
        let coll = self.collection(collection);
        let mut records: Vec<Record> = coll
            .iter()
            .filter(|entry| Self::matches(entry.value(), &filter))
            .map(|entry| Record::new(entry.key().clone(), entry.value().clone()))
            .collect();
        if let Some(sort) = sort {
            records.sort_by(|a, b| {
                let ord = match (a.body.get(&sort.field), b.body.get(&sort.field)) {
                    (Some(x), Some(y)) => compare(x, y).unwrap_or(std::cmp::Ordering::Equal),
                    _ => std::cmp::Ordering::Equal,
                };
                if sort.ascending { ord } else { ord.reverse() }
            });
        }
        Ok(records)
    }

    async fn increment(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        by: i64,
    ) -> Result<i64, ComplianceError> {
        let coll = self.collection(collection);
        let mut entry = coll.entry(id.to_string()).or_insert_with(|| {
            serde_json::json!({})
        });
        let body = entry.value_mut();
        let current = body.get(field).and_then(Value::as_i64).unwrap_or(0);
        let next = current + by;
        if let Value::Object(map) = body {
            map.insert(field.to_string(), Value::from(next));
        }
        Ok(next)
    }
}
