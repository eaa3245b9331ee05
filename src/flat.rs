//! Flat, row-per-record view of a collection.
//!
//! The tree is the model; the flat list is for one-pass work on top of it:
//! filtering, searching, sorting, indexing and summary statistics. Rows
//! borrow from the collection, so building them copies nothing.

use std::collections::HashMap;

use serde::Serialize;
use serde_yaml::Value;

use crate::models::{Collection, LeafRecord};

/// One record together with the names that locate it in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlatRecord<'a> {
    pub group: &'a str,
    pub name: &'a str,
    #[serde(rename = "specs")]
    pub record: &'a LeafRecord,
}

impl Collection {
    /// Every record as a row, in group order and then record order.
    pub fn flatten(&self) -> Vec<FlatRecord<'_>> {
        self.groups
            .iter()
            .flat_map(|(group, g)| {
                g.records.iter().map(move |(name, record)| FlatRecord {
                    group: group.as_str(),
                    name: name.as_str(),
                    record,
                })
            })
            .collect()
    }
}

/// Rows whose `ship_class` contains `needle`.
pub fn filter_class<'a>(rows: &[FlatRecord<'a>], needle: &str) -> Vec<FlatRecord<'a>> {
    rows.iter()
        .filter(|row| row.record.ship_class().is_some_and(|c| c.contains(needle)))
        .copied()
        .collect()
}

/// Rows whose name contains `query`, ignoring case.
pub fn search_names<'a>(rows: &[FlatRecord<'a>], query: &str) -> Vec<FlatRecord<'a>> {
    let query = query.to_lowercase();
    rows.iter()
        .filter(|row| row.name.to_lowercase().contains(&query))
        .copied()
        .collect()
}

/// Longest first. Rows without a length go last; ties keep their order.
pub fn sort_by_length_desc(rows: &mut [FlatRecord<'_>]) {
    rows.sort_by(|a, b| {
        match (a.record.length_meters(), b.record.length_meters()) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }
    });
}

/// Rows keyed by record name. When two groups share a record name, the later
/// row wins.
pub fn index_by_name<'a>(rows: &[FlatRecord<'a>]) -> HashMap<&'a str, FlatRecord<'a>> {
    rows.iter().map(|row| (row.name, *row)).collect()
}

/// Rows where `field` is absent or blank: null, `false`, zero, or an empty
/// string, sequence or mapping.
pub fn missing_field<'a>(rows: &[FlatRecord<'a>], field: &str) -> Vec<FlatRecord<'a>> {
    rows.iter()
        .filter(|row| is_blank(row.record.get(field)))
        .copied()
        .collect()
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => !b,
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Sequence(seq)) => seq.is_empty(),
        Some(Value::Mapping(map)) => map.is_empty(),
        Some(Value::Tagged(_)) => false,
    }
}

/// Summary of `length_meters` across rows that have one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LengthStats {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` for a single row.
    pub std: Option<f64>,
    pub min: f64,
    /// 25th percentile.
    pub q1: f64,
    pub median: f64,
    /// 75th percentile.
    pub q3: f64,
    pub max: f64,
}

impl LengthStats {
    pub fn describe(rows: &[FlatRecord<'_>]) -> Option<Self> {
        let mut lengths: Vec<f64> = rows
            .iter()
            .filter_map(|row| row.record.length_meters())
            .collect();
        if lengths.is_empty() {
            return None;
        }
        lengths.sort_by(f64::total_cmp);

        let count = lengths.len();
        let mean = lengths.iter().sum::<f64>() / count as f64;
        let std = (count > 1).then(|| {
            let variance = lengths.iter().map(|l| (l - mean).powi(2)).sum::<f64>()
                / (count - 1) as f64;
            variance.sqrt()
        });

        Some(Self {
            count,
            mean,
            std,
            min: lengths[0],
            q1: quantile(&lengths, 0.25),
            median: quantile(&lengths, 0.5),
            q3: quantile(&lengths, 0.75),
            max: lengths[count - 1],
        })
    }
}

/// Linear interpolation between the closest ranks of a sorted, non-empty
/// slice.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NamedGroup;

    fn ship(class: &str, length: f64, manufacturer: &str) -> LeafRecord {
        LeafRecord::from_fields([
            ("ship_class", Value::from(class)),
            ("length_meters", Value::from(length)),
            ("manufacturer", Value::from(manufacturer)),
        ])
    }

    fn fleet() -> Collection {
        Collection::from_groups([
            (
                "Rebel Alliance",
                NamedGroup::from_records([
                    ("X-Wing (T-65B)", ship("Starfighter", 12.5, "Incom Corporation")),
                    ("YT-1300 Light Freighter", ship("Light Freighter", 34.75, "")),
                ]),
            ),
            (
                "Galactic Empire",
                NamedGroup::from_records([
                    ("TIE Fighter", ship("Starfighter", 6.3, "Sienar Fleet Systems")),
                    ("Executor-class Star Dreadnought", ship("Star Dreadnought", 19000.0, "Kuat Drive Yards")),
                    ("Mystery Hull", LeafRecord::new()),
                ]),
            ),
        ])
    }

    #[test]
    fn test_flatten_keeps_tree_order() {
        let collection = fleet();
        let rows = collection.flatten();
        let names: Vec<_> = rows.iter().map(|r| (r.group, r.name)).collect();
        assert_eq!(
            names,
            [
                ("Rebel Alliance", "X-Wing (T-65B)"),
                ("Rebel Alliance", "YT-1300 Light Freighter"),
                ("Galactic Empire", "TIE Fighter"),
                ("Galactic Empire", "Executor-class Star Dreadnought"),
                ("Galactic Empire", "Mystery Hull"),
            ]
        );
    }

    #[test]
    fn test_filter_and_search() {
        let collection = fleet();
        let rows = collection.flatten();

        let fighters: Vec<_> = filter_class(&rows, "Starfighter").iter().map(|r| r.name).collect();
        assert_eq!(fighters, ["X-Wing (T-65B)", "TIE Fighter"]);

        let freighters: Vec<_> = search_names(&rows, "FREIGHTER").iter().map(|r| r.name).collect();
        assert_eq!(freighters, ["YT-1300 Light Freighter"]);
    }

    #[test]
    fn test_sort_by_length_puts_unknown_last() {
        let collection = fleet();
        let mut rows = collection.flatten();
        sort_by_length_desc(&mut rows);
        let names: Vec<_> = rows.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            [
                "Executor-class Star Dreadnought",
                "YT-1300 Light Freighter",
                "X-Wing (T-65B)",
                "TIE Fighter",
                "Mystery Hull",
            ]
        );
    }

    #[test]
    fn test_missing_field_treats_empty_as_missing() {
        let collection = fleet();
        let rows = collection.flatten();
        let missing: Vec<_> = missing_field(&rows, "manufacturer").iter().map(|r| r.name).collect();
        assert_eq!(missing, ["YT-1300 Light Freighter", "Mystery Hull"]);
    }

    #[test]
    fn test_missing_field_treats_zero_and_empty_collections_as_missing() {
        let collection = Collection::from_groups([(
            "Salvage",
            NamedGroup::from_records([
                ("Zeroed", LeafRecord::from_fields([("manufacturer", 0)])),
                ("No Crew", LeafRecord::from_fields([("manufacturer", Value::Sequence(Vec::new()))])),
                ("No Specs", LeafRecord::from_fields([("manufacturer", Value::Mapping(Default::default()))])),
                ("Off", LeafRecord::from_fields([("manufacturer", false)])),
                ("Kuat", LeafRecord::from_fields([("manufacturer", "Kuat Drive Yards")])),
                ("Serial", LeafRecord::from_fields([("manufacturer", 7)])),
            ]),
        )]);
        let rows = collection.flatten();
        let missing: Vec<_> = missing_field(&rows, "manufacturer").iter().map(|r| r.name).collect();
        assert_eq!(missing, ["Zeroed", "No Crew", "No Specs", "Off"]);
    }

    #[test]
    fn test_index_by_name() {
        let collection = fleet();
        let rows = collection.flatten();
        let index = index_by_name(&rows);
        assert_eq!(index["X-Wing (T-65B)"].record.ship_class(), Some("Starfighter"));
        assert_eq!(index["TIE Fighter"].group, "Galactic Empire");
        assert!(!index.contains_key("Millennium Falcon"));
    }

    #[test]
    fn test_length_stats() {
        let collection = fleet();
        let stats = LengthStats::describe(&collection.flatten()).unwrap();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.min, 6.3);
        assert_eq!(stats.max, 19000.0);
        assert_eq!(stats.median, (12.5 + 34.75) / 2.0);
        assert!((stats.q1 - 10.95).abs() < 1e-9, "q1 = {}", stats.q1);
        assert!((stats.q3 - 4776.0625).abs() < 1e-9, "q3 = {}", stats.q3);
        assert!(stats.std.is_some());
    }

    #[test]
    fn test_length_stats_odd_count_quartiles() {
        let odd = Collection::from_groups([(
            "Squadron",
            NamedGroup::from_records(
                [10.0, 50.0, 20.0, 40.0, 30.0]
                    .into_iter()
                    .enumerate()
                    .map(|(i, length)| (format!("Ship {i}"), ship("Starfighter", length, "Incom"))),
            ),
        )]);
        let stats = LengthStats::describe(&odd.flatten()).unwrap();
        assert_eq!(stats.count, 5);
        assert_eq!(stats.q1, 20.0);
        assert_eq!(stats.median, 30.0);
        assert_eq!(stats.q3, 40.0);
    }

    #[test]
    fn test_length_stats_edge_cases() {
        assert!(LengthStats::describe(&[]).is_none());

        let single = Collection::from_groups([(
            "Solo",
            NamedGroup::from_records([("Falcon", ship("Light Freighter", 34.75, "CEC"))]),
        )]);
        let stats = LengthStats::describe(&single.flatten()).unwrap();
        assert_eq!(stats.count, 1);
        assert!(stats.std.is_none());
        assert_eq!(stats.q1, 34.75);
        assert_eq!(stats.median, 34.75);
        assert_eq!(stats.q3, 34.75);
    }

    #[test]
    fn test_rows_serialize_with_specs() {
        let collection = fleet();
        let rows = collection.flatten();
        let json = serde_json::to_value(rows[0]).unwrap();
        assert_eq!(json["group"], "Rebel Alliance");
        assert_eq!(json["specs"]["length_meters"], 12.5);
        assert_eq!(json["specs"]["ship_class"], "Starfighter");
    }
}
