//! Tagged YAML entity documents loaded into typed collections and saved back.
//!
//! A document is a `!EntityList` collection of `!EntityName` groups, each
//! holding `!EntityShip` records with open fields. [`Codec`] converts between
//! YAML and the [`Collection`] tree, [`document`] reads and writes files, and
//! [`flat`] offers a row-per-record view for searching and sorting.

pub mod codec;
pub mod document;
pub mod error;
pub mod flat;
pub mod models;
pub mod tour;
pub mod tree_render;

pub use codec::{Codec, Entity, Node, TagTable};
pub use error::{Error, Result};
pub use models::*;
