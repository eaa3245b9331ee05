use indexmap::IndexMap;
use serde::Serialize;
use serde_yaml::Value;

use crate::error::{Error, Result};

/// A single modeled object, such as one ship.
///
/// The schema is open: fields are stored exactly as they appear in the
/// document, in document order, without checking names or value types.
/// Typed accessors exist for the handful of fields callers read directly;
/// everything else passes through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LeafRecord {
    pub fields: IndexMap<String, Value>,
}

impl LeafRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from any set of named values. Never fails.
    pub fn from_fields<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Look up a field whose absence is expected and handled by the caller.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn field(&self, name: &str) -> Result<&Value> {
        self.fields
            .get(name)
            .ok_or_else(|| Error::not_found("field", name))
    }

    pub fn field_mut(&mut self, name: &str) -> Result<&mut Value> {
        self.fields
            .get_mut(name)
            .ok_or_else(|| Error::not_found("field", name))
    }

    /// Insert or overwrite a field. A new field goes to the end.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Result<Value> {
        self.fields
            .shift_remove(name)
            .ok_or_else(|| Error::not_found("field", name))
    }

    pub fn ship_class(&self) -> Option<&str> {
        self.get("ship_class").and_then(Value::as_str)
    }

    pub fn manufacturer(&self) -> Option<&str> {
        self.get("manufacturer").and_then(Value::as_str)
    }

    /// Length in meters. Integer and float lengths both read as `f64`.
    pub fn length_meters(&self) -> Option<f64> {
        self.get("length_meters").and_then(Value::as_f64)
    }

    pub fn armament(&self) -> Option<&[Value]> {
        self.get("armament")
            .and_then(Value::as_sequence)
            .map(|seq| seq.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x_wing() -> LeafRecord {
        LeafRecord::from_fields([
            ("ship_class", Value::from("Starfighter")),
            ("length_meters", Value::from(12.5)),
            ("manufacturer", Value::from("Incom Corporation")),
            (
                "armament",
                Value::from(vec!["Laser cannons", "Proton torpedoes"]),
            ),
        ])
    }

    #[test]
    fn test_typed_accessors() {
        let ship = x_wing();
        assert_eq!(ship.ship_class(), Some("Starfighter"));
        assert_eq!(ship.manufacturer(), Some("Incom Corporation"));
        assert_eq!(ship.length_meters(), Some(12.5));
        assert_eq!(ship.armament().map(|a| a.len()), Some(2));
    }

    #[test]
    fn test_integer_length_reads_as_float() {
        let ship = LeafRecord::from_fields([("length_meters", 19000)]);
        assert_eq!(ship.length_meters(), Some(19000.0));
    }

    #[test]
    fn test_open_schema_accepts_unknown_fields() {
        let mut ship = LeafRecord::from_fields([("a", Value::from(1)), ("b", Value::from("x"))]);
        assert!(ship.set("hyperdrive_class", 1.0).is_none());
        assert_eq!(ship.field("a").unwrap(), &Value::from(1));
        assert_eq!(ship.field("b").unwrap(), &Value::from("x"));
        assert_eq!(ship.len(), 3);
    }

    #[test]
    fn test_set_overwrites_in_place() {
        let mut ship = x_wing();
        let previous = ship.set("length_meters", 13.0);
        assert_eq!(previous, Some(Value::from(12.5)));
        let keys: Vec<_> = ship.fields.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            ["ship_class", "length_meters", "manufacturer", "armament"]
        );
    }

    #[test]
    fn test_missing_field_is_key_not_found() {
        let ship = x_wing();
        let err = ship.field("shields").unwrap_err();
        assert!(matches!(err, Error::KeyNotFound { scope: "field", .. }));
        assert!(ship.get("shields").is_none());
    }

    #[test]
    fn test_remove_keeps_order_of_the_rest() {
        let mut ship = x_wing();
        ship.remove("length_meters").unwrap();
        let keys: Vec<_> = ship.fields.keys().map(String::as_str).collect();
        assert_eq!(keys, ["ship_class", "manufacturer", "armament"]);
        assert!(ship.remove("length_meters").is_err());
    }

    #[test]
    fn test_wrong_typed_field_reads_as_none() {
        let ship = LeafRecord::from_fields([("manufacturer", 42)]);
        assert!(ship.manufacturer().is_none());
        assert!(ship.armament().is_none());
    }
}
