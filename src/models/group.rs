use indexmap::IndexMap;

use super::LeafRecord;
use crate::codec::{Codec, Node};
use crate::error::{Error, Result};

/// A named set of records, such as a faction owning several ships.
///
/// Record names are unique within the group and keep their insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedGroup {
    pub records: IndexMap<String, LeafRecord>,
}

impl NamedGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records<K>(records: impl IntoIterator<Item = (K, LeafRecord)>) -> Self
    where
        K: Into<String>,
    {
        Self {
            records: records.into_iter().map(|(k, r)| (k.into(), r)).collect(),
        }
    }

    /// Build a group from children that may be raw YAML mappings or records
    /// that already exist. Raw mappings are turned into records; anything
    /// else is rejected as malformed.
    pub fn from_children<K, N>(
        codec: &Codec,
        children: impl IntoIterator<Item = (K, N)>,
    ) -> Result<Self>
    where
        K: Into<String>,
        N: Into<Node>,
    {
        let mut group = Self::new();
        for (name, child) in children {
            let name = name.into();
            let record = codec.ensure(child.into(), &name)?;
            group.records.insert(name, record);
        }
        Ok(group)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn record(&self, name: &str) -> Result<&LeafRecord> {
        self.records
            .get(name)
            .ok_or_else(|| Error::not_found("record", name))
    }

    pub fn record_mut(&mut self, name: &str) -> Result<&mut LeafRecord> {
        self.records
            .get_mut(name)
            .ok_or_else(|| Error::not_found("record", name))
    }

    /// Insert or replace a record. A new name goes to the end; a replaced
    /// record keeps its position.
    pub fn insert_record(
        &mut self,
        name: impl Into<String>,
        record: LeafRecord,
    ) -> Option<LeafRecord> {
        self.records.insert(name.into(), record)
    }

    pub fn remove_record(&mut self, name: &str) -> Result<LeafRecord> {
        self.records
            .shift_remove(name)
            .ok_or_else(|| Error::not_found("record", name))
    }
}
