use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

use crate::entity::TokenRecord;

/// Id → record mapping that remembers insertion order.
///
/// Serialized as a plain JSON object whose keys appear in insertion order, so
/// the default display order survives a save/load cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenMap {
    order: Vec<String>,
    records: HashMap<String, TokenRecord>,
}

impl TokenMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites. An overwritten id keeps its original position.
    pub fn insert(&mut self, record: TokenRecord) -> Option<TokenRecord> {
        let id = record.id.clone();
        let previous = self.records.insert(id.clone(), record);
        if previous.is_none() {
            self.order.push(id);
        }
        previous
    }

    pub fn remove(&mut self, id: &str) -> Option<TokenRecord> {
        let removed = self.records.remove(id)?;
        self.order.retain(|existing| existing != id);
        Some(removed)
    }

    pub fn get(&self, id: &str) -> Option<&TokenRecord> {
        self.records.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut TokenRecord> {
        self.records.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &String> {
        self.order.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &TokenRecord> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut TokenRecord> {
        self.records.values_mut()
    }
}

impl Serialize for TokenMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for record in self.values() {
            map.serialize_entry(&record.id, record)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TokenMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TokenMapVisitor;

        impl<'de> Visitor<'de> for TokenMapVisitor {
            type Value = TokenMap;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of token id to token record")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut tokens = TokenMap::new();
                while let Some((key, mut record)) = access.next_entry::<String, TokenRecord>()? {
                    // The key is authoritative for the mapping
                    record.id = key;
                    tokens.insert(record);
                }
                Ok(tokens)
            }
        }

        deserializer.deserialize_map(TokenMapVisitor)
    }
}
