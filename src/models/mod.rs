//! Domain models for entity documents.
//!
//! # Core Concepts
//!
//! A document holds a strict three-level ownership tree:
//!
//! - [`Collection`]: The root container, tagged `!EntityList`. Maps group names
//!   (e.g. factions) to [`NamedGroup`]s.
//! - [`NamedGroup`]: Tagged `!EntityName`. Maps record names (e.g. ships) to
//!   [`LeafRecord`]s.
//! - [`LeafRecord`]: Tagged `!EntityShip`. An open bag of fields whose values
//!   are kept as raw YAML so anything round-trips.
//!
//! Every mapping is ordered; names keep their document order through
//! load, mutation and save.

mod collection;
mod group;
mod record;

pub use collection::*;
pub use group::*;
pub use record::*;

/// The kind of an entity node, one per tree level.
///
/// - `Collection`: Depth 0, the document root
/// - `Group`: Depth 1, a child of the collection
/// - `Record`: Depth 2, a child of a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Collection,
    Group,
    Record,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Collection => "collection",
            Self::Group => "group",
            Self::Record => "record",
        }
    }

    /// Nesting depth at which this kind is allowed to appear.
    pub fn depth(&self) -> usize {
        match self {
            Self::Collection => 0,
            Self::Group => 1,
            Self::Record => 2,
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
