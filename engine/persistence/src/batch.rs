//! Write operations and the document model they are applied to
//!
//! A batch is applied to a copy of the database. The copy only replaces the live
//! database when every operation in the batch succeeded, so a failing operation
//! anywhere in a batch leaves no trace.

use crate::error::{Result, StoreError};
use crate::snapshot::{Collection, CollectionSnapshot};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// A single write inside an atomic batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum WriteOp {
    /// Create or replace a document
    Set { collection: Collection, key: String, document: Value },

    /// Overwrite top-level fields of an existing document; fails if it is missing
    Update { collection: Collection, key: String, fields: Map<String, Value> },

    /// Overwrite top-level fields, creating the document if it is missing
    Merge { collection: Collection, key: String, fields: Map<String, Value> },

    /// Fail the batch unless a field currently holds `value` (absent reads as null)
    Expect { collection: Collection, key: String, field: String, value: Value },
}

impl WriteOp {
    pub fn set(collection: Collection, key: impl Into<String>, document: Value) -> Self {
        WriteOp::Set { collection, key: key.into(), document }
    }

    /// Build an update from a JSON object of fields
    pub fn update(collection: Collection, key: impl Into<String>, fields: Value) -> Result<Self> {
        Ok(WriteOp::Update { collection, key: key.into(), fields: into_fields(fields)? })
    }

    /// Build a merge from a JSON object of fields
    pub fn merge(collection: Collection, key: impl Into<String>, fields: Value) -> Result<Self> {
        Ok(WriteOp::Merge { collection, key: key.into(), fields: into_fields(fields)? })
    }

    pub fn expect(
        collection: Collection,
        key: impl Into<String>,
        field: impl Into<String>,
        value: Value,
    ) -> Self {
        WriteOp::Expect { collection, key: key.into(), field: field.into(), value }
    }

    /// Collection this operation touches
    pub fn collection(&self) -> Collection {
        match self {
            WriteOp::Set { collection, .. }
            | WriteOp::Update { collection, .. }
            | WriteOp::Merge { collection, .. }
            | WriteOp::Expect { collection, .. } => *collection,
        }
    }

    /// Whether the operation changes data (an `Expect` only reads)
    pub fn is_write(&self) -> bool {
        !matches!(self, WriteOp::Expect { .. })
    }
}

fn into_fields(fields: Value) -> Result<Map<String, Value>> {
    match fields {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::invalid_operation(format!(
            "update fields must be a JSON object, got {other}"
        ))),
    }
}

/// All collections and their documents
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Database {
    collections: BTreeMap<Collection, BTreeMap<String, Value>>,
}

/// On-disk form of the database
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct DatabaseFile {
    pub saved_at: chrono::DateTime<chrono::Utc>,
    pub collections: BTreeMap<String, BTreeMap<String, Value>>,
}

impl Database {
    /// Create an empty database
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of one collection
    pub fn snapshot(&self, collection: Collection) -> CollectionSnapshot {
        CollectionSnapshot {
            collection,
            documents: self.collections.get(&collection).cloned().unwrap_or_default(),
        }
    }

    pub fn get(&self, collection: Collection, key: &str) -> Option<&Value> {
        self.collections.get(&collection).and_then(|docs| docs.get(key))
    }

    /// Apply a batch to a copy of this database.
    ///
    /// Returns the new database and the collections that changed. `self` is untouched
    /// whether or not the batch succeeds.
    pub fn apply(&self, ops: &[WriteOp]) -> Result<(Database, BTreeSet<Collection>)> {
        let mut next = self.clone();
        let mut touched = BTreeSet::new();

        for op in ops {
            next.apply_one(op)?;
            if op.is_write() {
                touched.insert(op.collection());
            }
        }

        Ok((next, touched))
    }

    fn apply_one(&mut self, op: &WriteOp) -> Result<()> {
        match op {
            WriteOp::Set { collection, key, document } => {
                self.collections.entry(*collection).or_default().insert(key.clone(), document.clone());
            }
            WriteOp::Update { collection, key, fields } => {
                let doc = self
                    .collections
                    .get_mut(collection)
                    .and_then(|docs| docs.get_mut(key))
                    .ok_or_else(|| StoreError::NotFound { collection: *collection, key: key.clone() })?;
                merge_fields(doc, fields, *collection, key)?;
            }
            WriteOp::Merge { collection, key, fields } => {
                let doc = self
                    .collections
                    .entry(*collection)
                    .or_default()
                    .entry(key.clone())
                    .or_insert_with(|| Value::Object(Map::new()));
                merge_fields(doc, fields, *collection, key)?;
            }
            WriteOp::Expect { collection, key, field, value } => {
                let current = self
                    .get(*collection, key)
                    .and_then(|doc| doc.get(field))
                    .unwrap_or(&Value::Null);
                if current != value {
                    return Err(StoreError::PreconditionFailed(format!(
                        "{collection}/{key}.{field} is {current}, expected {value}"
                    )));
                }
            }
        }
        Ok(())
    }

    pub(crate) fn to_file(&self) -> DatabaseFile {
        DatabaseFile {
            saved_at: chrono::Utc::now(),
            collections: self
                .collections
                .iter()
                .map(|(collection, docs)| (collection.name().to_string(), docs.clone()))
                .collect(),
        }
    }

    pub(crate) fn from_file(file: DatabaseFile) -> Result<Self> {
        let mut collections = BTreeMap::new();
        for (name, docs) in file.collections {
            let collection = Collection::from_name(&name)
                .ok_or_else(|| StoreError::corruption(format!("unknown collection: {name}")))?;
            collections.insert(collection, docs);
        }
        Ok(Self { collections })
    }
}

fn merge_fields(
    doc: &mut Value,
    fields: &Map<String, Value>,
    collection: Collection,
    key: &str,
) -> Result<()> {
    let object = doc
        .as_object_mut()
        .ok_or_else(|| StoreError::corruption(format!("{collection}/{key} is not an object")))?;
    for (field, value) in fields {
        object.insert(field.clone(), value.clone());
    }
    Ok(())
}
