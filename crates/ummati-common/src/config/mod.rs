//! Flat key/value configuration and typed, validated access to it
//!
//! A [`ConfigStore`] hands out raw strings: either a scalar or a JSON array of
//! strings. [`Config`] turns those into integers, doubles, enums and
//! collections, checking bounds and patterns on every read.
//!
//! Stores are read-only. Values come from a Pulumi-style stack file
//! ([`stack_file`]), from the `UMMATI_CONFIG` environment variable
//! ([`MemoryStore::from_env`]), or are built in memory for tests.

mod accessor;
pub mod stack_file;

pub use accessor::{Bounds, Config};

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{Error, Result};

/// Environment variable holding a JSON object of configuration values
pub const CONFIG_ENV_VAR: &str = "UMMATI_CONFIG";

/// Read-only source of raw configuration strings
pub trait ConfigStore: Send + Sync {
    /// Return the raw value for `key`, or `None` if the key is absent
    fn get(&self, key: &str) -> Option<String>;
}

impl<T: ConfigStore + ?Sized> ConfigStore for &T {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
}

impl<T: ConfigStore + ?Sized> ConfigStore for Box<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
}

impl<T: ConfigStore + ?Sized> ConfigStore for Arc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
}

/// In-memory configuration store
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a scalar value
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set a collection value, stored as a JSON array of strings
    pub fn with_list<I, V>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        let encoded = serde_json::Value::from(values).to_string();
        self.insert(key, encoded);
        self
    }

    /// Insert or replace a raw value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Remove a key, returning its previous raw value
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    /// Number of keys in the store
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the store has no keys
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Build a store from a JSON object
    ///
    /// Strings are kept as-is, other scalars use their JSON text, and arrays
    /// of scalars are re-encoded as JSON string arrays. Nested arrays and
    /// objects are rejected.
    pub fn from_json(json: &str) -> Result<Self> {
        let object: BTreeMap<String, serde_json::Value> = serde_json::from_str(json)
            .map_err(|e| Error::serialization(format!("configuration is not a JSON object: {e}")))?;

        let mut store = Self::new();
        for (key, value) in object {
            let raw = match value {
                serde_json::Value::Array(items) => {
                    let elements = items
                        .into_iter()
                        .map(|item| json_scalar(&key, item))
                        .collect::<Result<Vec<_>>>()?;
                    serde_json::Value::from(elements).to_string()
                }
                other => json_scalar(&key, other)?,
            };
            store.insert(key, raw);
        }
        Ok(store)
    }

    /// Build a store from the JSON object in [`CONFIG_ENV_VAR`]
    pub fn from_env() -> Result<Self> {
        let json = std::env::var(CONFIG_ENV_VAR)
            .map_err(|_| Error::missing(CONFIG_ENV_VAR))?;
        Self::from_json(&json)
    }
}

fn json_scalar(key: &str, value: serde_json::Value) -> Result<String> {
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Null => Ok(String::new()),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => Err(
            Error::serialization_for_kind(key, "nested collections are not supported"),
        ),
        other => Ok(other.to_string()),
    }
}

impl ConfigStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut store = Self::new();
        for (key, value) in iter {
            store.insert(key, value);
        }
        store
    }
}
