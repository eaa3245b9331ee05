//! Tag-driven conversion between YAML documents and the entity tree.
//!
//! A [`Codec`] owns a [`TagTable`] naming the tag of each entity kind. Decoding
//! walks the document top-down: the root must be tagged as a collection, each
//! collection child becomes a group, and each group child becomes a record.
//! Record fields are kept as opaque YAML values.
//!
//! Every level goes through [`Codec::ensure`], which accepts either a raw
//! YAML value or an entity that was already built. Built entities of the
//! right kind pass through unchanged, raw mappings are constructed from their
//! keys, and every other shape is a [`Error::MalformedDocument`].

use std::io::{Read, Write};

use serde_yaml::value::{Tag, TaggedValue};
use serde_yaml::{Mapping, Value};

use crate::error::{Error, Result};
use crate::models::{Collection, Kind, LeafRecord, NamedGroup};

/// Location used in errors for the document root.
pub const ROOT: &str = "<root>";

/// The closed set of tags a codec recognizes, one per entity kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagTable {
    collection: String,
    group: String,
    record: String,
}

impl TagTable {
    /// Tags may be given with or without the leading `!`.
    ///
    /// # Panics
    ///
    /// Panics if a tag is empty or two kinds share a tag.
    pub fn new(
        collection: impl Into<String>,
        group: impl Into<String>,
        record: impl Into<String>,
    ) -> Self {
        let table = Self {
            collection: bare(collection.into()),
            group: bare(group.into()),
            record: bare(record.into()),
        };
        let tags = [&table.collection, &table.group, &table.record];
        assert!(tags.iter().all(|t| !t.is_empty()), "entity tags must not be empty");
        assert!(
            tags[0] != tags[1] && tags[1] != tags[2] && tags[0] != tags[2],
            "entity tags must be distinct"
        );
        table
    }

    /// The tag for `kind`, without the leading `!`.
    pub fn tag(&self, kind: Kind) -> &str {
        match kind {
            Kind::Collection => &self.collection,
            Kind::Group => &self.group,
            Kind::Record => &self.record,
        }
    }

    /// Which kind a tag names, if any. The leading `!` is optional.
    pub fn kind_of(&self, tag: &str) -> Option<Kind> {
        let tag = tag.strip_prefix('!').unwrap_or(tag);
        [Kind::Collection, Kind::Group, Kind::Record]
            .into_iter()
            .find(|kind| self.tag(*kind) == tag)
    }
}

impl Default for TagTable {
    fn default() -> Self {
        Self::new("EntityList", "EntityName", "EntityShip")
    }
}

fn bare(tag: String) -> String {
    match tag.strip_prefix('!') {
        Some(rest) => rest.to_string(),
        None => tag,
    }
}

/// Codec input at any tree level: raw YAML, or an entity that already exists.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Raw(Value),
    Collection(Collection),
    Group(NamedGroup),
    Record(LeafRecord),
}

impl Node {
    /// The entity kind of a built node; `None` for raw YAML.
    pub fn kind(&self) -> Option<Kind> {
        match self {
            Self::Raw(_) => None,
            Self::Collection(_) => Some(Kind::Collection),
            Self::Group(_) => Some(Kind::Group),
            Self::Record(_) => Some(Kind::Record),
        }
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        Self::Raw(value)
    }
}

impl From<Mapping> for Node {
    fn from(mapping: Mapping) -> Self {
        Self::Raw(Value::Mapping(mapping))
    }
}

impl From<Collection> for Node {
    fn from(collection: Collection) -> Self {
        Self::Collection(collection)
    }
}

impl From<NamedGroup> for Node {
    fn from(group: NamedGroup) -> Self {
        Self::Group(group)
    }
}

impl From<LeafRecord> for Node {
    fn from(record: LeafRecord) -> Self {
        Self::Record(record)
    }
}

/// An entity kind the codec can build and emit.
pub trait Entity: Sized {
    const KIND: Kind;

    /// Take the entity out of a node of the same kind, or hand the node back.
    fn try_from_node(node: Node) -> std::result::Result<Self, Node>;

    /// Build the entity from the entries of a raw mapping found at `at`.
    fn construct(codec: &Codec, entries: Mapping, at: &str) -> Result<Self>;

    /// The children or fields to emit under this entity's tag.
    fn to_mapping(&self, codec: &Codec) -> Mapping;
}

impl Entity for Collection {
    const KIND: Kind = Kind::Collection;

    fn try_from_node(node: Node) -> std::result::Result<Self, Node> {
        match node {
            Node::Collection(collection) => Ok(collection),
            other => Err(other),
        }
    }

    fn construct(codec: &Codec, entries: Mapping, at: &str) -> Result<Self> {
        let mut collection = Collection::new();
        for (key, value) in entries {
            let name = key_name(key, at)?;
            let group = codec.ensure(Node::Raw(value), &child_path(at, &name))?;
            collection.groups.insert(name, group);
        }
        Ok(collection)
    }

    fn to_mapping(&self, codec: &Codec) -> Mapping {
        self.groups
            .iter()
            .map(|(name, group)| (Value::String(name.clone()), codec.encode(group)))
            .collect()
    }
}

impl Entity for NamedGroup {
    const KIND: Kind = Kind::Group;

    fn try_from_node(node: Node) -> std::result::Result<Self, Node> {
        match node {
            Node::Group(group) => Ok(group),
            other => Err(other),
        }
    }

    fn construct(codec: &Codec, entries: Mapping, at: &str) -> Result<Self> {
        let mut group = NamedGroup::new();
        for (key, value) in entries {
            let name = key_name(key, at)?;
            let record = codec.ensure(Node::Raw(value), &child_path(at, &name))?;
            group.records.insert(name, record);
        }
        Ok(group)
    }

    fn to_mapping(&self, codec: &Codec) -> Mapping {
        self.records
            .iter()
            .map(|(name, record)| (Value::String(name.clone()), codec.encode(record)))
            .collect()
    }
}

impl Entity for LeafRecord {
    const KIND: Kind = Kind::Record;

    fn try_from_node(node: Node) -> std::result::Result<Self, Node> {
        match node {
            Node::Record(record) => Ok(record),
            other => Err(other),
        }
    }

    // Field values are terminal: nested tags stay as they are.
    fn construct(_codec: &Codec, entries: Mapping, at: &str) -> Result<Self> {
        let mut record = LeafRecord::new();
        for (key, value) in entries {
            let name = key_name(key, at)?;
            record.fields.insert(name, value);
        }
        Ok(record)
    }

    fn to_mapping(&self, _codec: &Codec) -> Mapping {
        self.fields
            .iter()
            .map(|(name, value)| (Value::String(name.clone()), value.clone()))
            .collect()
    }
}

/// Converts between YAML and [`Collection`] trees using one [`TagTable`].
///
/// A codec holds no state besides its table, so one instance can serve any
/// number of independent documents.
#[derive(Debug, Clone, Default)]
pub struct Codec {
    tags: TagTable,
}

impl Codec {
    pub fn new(tags: TagTable) -> Self {
        Self { tags }
    }

    pub fn tags(&self) -> &TagTable {
        &self.tags
    }

    /// Decode a document root into a collection.
    ///
    /// Raw input must carry the collection tag. A collection that was already
    /// built is returned unchanged.
    pub fn decode(&self, root: impl Into<Node>) -> Result<Collection> {
        let root = root.into();
        if let Node::Raw(value) = &root {
            if !matches!(value, Value::Tagged(_)) {
                return Err(Error::malformed(
                    ROOT,
                    format!(
                        "document root must be tagged !{}, found untagged {}",
                        self.tags.tag(Kind::Collection),
                        describe(value)
                    ),
                ));
            }
        }
        let collection: Collection = self.ensure(root, ROOT)?;
        tracing::debug!(
            groups = collection.len(),
            records = collection.record_count(),
            "decoded collection"
        );
        Ok(collection)
    }

    pub fn decode_str(&self, text: &str) -> Result<Collection> {
        let value: Value = serde_yaml::from_str(text).map_err(Error::Parse)?;
        self.decode(value)
    }

    pub fn decode_reader<R: Read>(&self, reader: R) -> Result<Collection> {
        let value: Value = serde_yaml::from_reader(reader).map_err(Error::Parse)?;
        self.decode(value)
    }

    /// Normalize `node` into an entity of kind `T`.
    ///
    /// - A built entity of kind `T` is returned as-is.
    /// - A raw mapping, untagged or tagged with `T`'s tag, is constructed
    ///   entry by entry.
    /// - Anything else fails with [`Error::MalformedDocument`] at `at`.
    pub fn ensure<T: Entity>(&self, node: Node, at: &str) -> Result<T> {
        match node {
            Node::Raw(value) => {
                let entries = self.entity_entries(value, T::KIND, at)?;
                T::construct(self, entries, at)
            }
            built => T::try_from_node(built).map_err(|other| {
                let found = other
                    .kind()
                    .map(|kind| format!("!{}", self.tags.tag(kind)))
                    .unwrap_or_else(|| "raw value".to_string());
                Error::malformed(
                    at,
                    format!("expected !{}, found {}", self.tags.tag(T::KIND), found),
                )
            }),
        }
    }

    /// Unwrap the mapping that should hold an entity of `expected` kind.
    fn entity_entries(&self, value: Value, expected: Kind, at: &str) -> Result<Mapping> {
        let value = match value {
            Value::Tagged(tagged) => {
                let TaggedValue { tag, value } = *tagged;
                let tag = tag.to_string();
                match self.tags.kind_of(&tag) {
                    Some(kind) if kind == expected => value,
                    Some(kind) => {
                        return Err(Error::malformed(
                            at,
                            format!(
                                "{tag} marks a {kind} (depth {}), but a {expected} belongs at depth {}",
                                kind.depth(),
                                expected.depth()
                            ),
                        ))
                    }
                    None => return Err(Error::malformed(at, format!("unknown tag {tag}"))),
                }
            }
            other => other,
        };

        match value {
            Value::Mapping(entries) => Ok(entries),
            other => Err(Error::malformed(
                at,
                format!(
                    "expected a mapping for !{}, found {}",
                    self.tags.tag(expected),
                    describe(&other)
                ),
            )),
        }
    }

    /// Encode any entity as a mapping carrying its kind's tag.
    pub fn encode<T: Entity>(&self, entity: &T) -> Value {
        Value::Tagged(Box::new(TaggedValue {
            tag: Tag::new(self.tags.tag(T::KIND)),
            value: Value::Mapping(entity.to_mapping(self)),
        }))
    }

    pub fn encode_string<T: Entity>(&self, entity: &T) -> Result<String> {
        serde_yaml::to_string(&self.encode(entity)).map_err(Error::Encode)
    }

    pub fn encode_writer<T: Entity, W: Write>(&self, writer: W, entity: &T) -> Result<()> {
        serde_yaml::to_writer(writer, &self.encode(entity)).map_err(Error::Encode)
    }
}

fn key_name(key: Value, at: &str) -> Result<String> {
    match key {
        Value::String(name) => Ok(name),
        other => Err(Error::malformed(
            at,
            format!("names must be strings, found {}", describe(&other)),
        )),
    }
}

fn child_path(at: &str, name: &str) -> String {
    if at == ROOT {
        name.to_string()
    } else {
        format!("{at}/{name}")
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
