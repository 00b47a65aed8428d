//! Collections and the snapshots pushed to subscribers
//!
//! Subscribers never poll. Every successful commit pushes a fresh, complete snapshot
//! of each collection it touched, and consumers rebuild whatever they derive from it.

use crate::error::{Result, StoreError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// The document collections the league keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Collection {
    #[serde(rename = "drivers")]
    Drivers,
    #[serde(rename = "constructors")]
    Constructors,
    /// Entrants, keyed by team name
    #[serde(rename = "users")]
    Users,
    /// Settlements, keyed by settlement id
    #[serde(rename = "raceHistory")]
    RaceHistory,
    /// League settings, one document under [`Collection::CONFIG_KEY`]
    #[serde(rename = "config")]
    Config,
}

impl Collection {
    /// Every collection, in a fixed order
    pub const ALL: [Collection; 5] = [
        Collection::Drivers,
        Collection::Constructors,
        Collection::Users,
        Collection::RaceHistory,
        Collection::Config,
    ];

    /// Key of the singleton settings document
    pub const CONFIG_KEY: &'static str = "main";

    /// Collection name as stored
    pub fn name(self) -> &'static str {
        match self {
            Collection::Drivers => "drivers",
            Collection::Constructors => "constructors",
            Collection::Users => "users",
            Collection::RaceHistory => "raceHistory",
            Collection::Config => "config",
        }
    }

    /// Look a collection up by its stored name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Full contents of one collection at one point in time
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSnapshot {
    /// Which collection this is
    pub collection: Collection,

    /// Documents by key, in key order
    pub documents: BTreeMap<String, Value>,
}

impl CollectionSnapshot {
    /// An empty snapshot
    pub fn empty(collection: Collection) -> Self {
        Self { collection, documents: BTreeMap::new() }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.documents.get(key)
    }

    /// Decode every document, in key order
    pub fn decode<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        self.documents
            .iter()
            .map(|(key, doc)| {
                serde_json::from_value(doc.clone()).map_err(|e| {
                    StoreError::corruption(format!("{}/{}: {}", self.collection, key, e))
                })
            })
            .collect()
    }

    /// Decode a single document
    pub fn decode_one<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.documents
            .get(key)
            .map(|doc| {
                serde_json::from_value(doc.clone()).map_err(|e| {
                    StoreError::corruption(format!("{}/{}: {}", self.collection, key, e))
                })
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_collection_names_round_trip() {
        for collection in Collection::ALL {
            assert_eq!(Collection::from_name(collection.name()), Some(collection));
        }
        assert_eq!(Collection::from_name("accounts"), None);
        assert_eq!(Collection::RaceHistory.to_string(), "raceHistory");
    }

    #[test]
    fn test_decode_in_key_order() {
        let mut snapshot = CollectionSnapshot::empty(Collection::Drivers);
        snapshot.documents.insert("b".into(), json!(2));
        snapshot.documents.insert("a".into(), json!(1));

        let values: Vec<u32> = snapshot.decode().unwrap();
        assert_eq!(values, vec![1, 2]);
    }

    #[test]
    fn test_decode_reports_bad_document() {
        let mut snapshot = CollectionSnapshot::empty(Collection::Users);
        snapshot.documents.insert("Bad".into(), json!("not a number"));

        let err = snapshot.decode::<u32>().unwrap_err();
        assert!(err.to_string().contains("users/Bad"));
        assert!(snapshot.decode_one::<u32>("missing").unwrap().is_none());
    }
}
