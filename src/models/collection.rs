use indexmap::IndexMap;

use super::NamedGroup;
use crate::codec::{Codec, Node};
use crate::error::{Error, Result};

/// The root of a document: every group, keyed by group name.
///
/// Exactly one collection exists per loaded document, and nothing in the
/// tree lives outside it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    pub groups: IndexMap<String, NamedGroup>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_groups<K>(groups: impl IntoIterator<Item = (K, NamedGroup)>) -> Self
    where
        K: Into<String>,
    {
        Self {
            groups: groups.into_iter().map(|(k, g)| (k.into(), g)).collect(),
        }
    }

    /// Build a collection from children that may be raw YAML mappings or
    /// groups that already exist.
    pub fn from_children<K, N>(
        codec: &Codec,
        children: impl IntoIterator<Item = (K, N)>,
    ) -> Result<Self>
    where
        K: Into<String>,
        N: Into<Node>,
    {
        let mut collection = Self::new();
        for (name, child) in children {
            let name = name.into();
            let group = codec.ensure(child.into(), &name)?;
            collection.groups.insert(name, group);
        }
        Ok(collection)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of records across all groups.
    pub fn record_count(&self) -> usize {
        self.groups.values().map(NamedGroup::len).sum()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    pub fn group(&self, name: &str) -> Result<&NamedGroup> {
        self.groups
            .get(name)
            .ok_or_else(|| Error::not_found("group", name))
    }

    pub fn group_mut(&mut self, name: &str) -> Result<&mut NamedGroup> {
        self.groups
            .get_mut(name)
            .ok_or_else(|| Error::not_found("group", name))
    }

    pub fn insert_group(
        &mut self,
        name: impl Into<String>,
        group: NamedGroup,
    ) -> Option<NamedGroup> {
        self.groups.insert(name.into(), group)
    }

    /// Remove a group and its whole subtree.
    pub fn remove_group(&mut self, name: &str) -> Result<NamedGroup> {
        self.groups
            .shift_remove(name)
            .ok_or_else(|| Error::not_found("group", name))
    }
}
