//! Scripted walk through the bundled fleet document.
//!
//! Each step returns the lines it wants printed so the binary decides where
//! they go. Every lookup is checked: a missing faction or ship aborts the
//! step with [`Error::KeyNotFound`].

use serde_yaml::Value;

use crate::error::{Error, Result};
use crate::flat::{self, LengthStats};
use crate::models::{Collection, LeafRecord};
use crate::tree_render::format_value;

pub const REPUBLIC: &str = "Galactic Republic";
pub const REBELS: &str = "Rebel Alliance";
pub const EMPIRE: &str = "Galactic Empire";
pub const TRADE_FEDERATION: &str = "Trade Federation";

pub const VENATOR: &str = "Venator-class Star Destroyer";
pub const X_WING: &str = "X-Wing (T-65B)";
pub const YT_1300: &str = "YT-1300 Light Freighter";
pub const EXECUTOR: &str = "Executor-class Star Dreadnought";
pub const LANDING_CRAFT: &str = "C-9979 Landing Craft";

/// Ships longer than this are called out by [`inspect`].
pub const CAPITAL_SHIP_METERS: f64 = 1000.0;

/// Read-only tour: factions, one faction's ships, one ship's details and the
/// capital ships.
pub fn inspect(collection: &Collection) -> Result<Vec<String>> {
    let mut lines: Vec<String> = collection
        .names()
        .map(|name| format!("Faction: {name}"))
        .collect();

    let republic = collection.group(REPUBLIC)?;
    lines.push(format!("Ships in {REPUBLIC}:"));
    lines.extend(republic.names().map(|name| format!("  -{name}")));

    let venator = republic.record(VENATOR)?;
    lines.push(format!("Manufacturer: {}", format_value(venator.field("manufacturer")?)));
    lines.push(format!("Class: {}", format_value(venator.field("ship_class")?)));
    lines.push(format!("Armament: {}", format_value(venator.field("armament")?)));

    for row in collection.flatten() {
        if let Some(length) = row.record.length_meters() {
            if length > CAPITAL_SHIP_METERS {
                lines.push(format!("{} ({}) is {}m long", row.name, row.group, length));
            }
        }
    }
    Ok(lines)
}

/// The freighter added to the Rebel Alliance by [`apply_edits`].
pub fn light_freighter() -> LeafRecord {
    LeafRecord::from_fields([
        ("ship_class", Value::from("Light Freighter")),
        ("length_meters", Value::from(34.75)),
        ("manufacturer", Value::from("Corellian Engineering Corporation")),
        ("armament", Value::from(vec!["Laser cannons"])),
    ])
}

/// Mutating tour: add a ship, override and extend another, then remove a
/// ship and a whole faction.
pub fn apply_edits(collection: &mut Collection) -> Result<Vec<String>> {
    let mut lines = Vec::new();

    let rebels = collection.group_mut(REBELS)?;
    rebels.insert_record(YT_1300, light_freighter());
    if !rebels.contains(YT_1300) {
        return Err(Error::not_found("record", YT_1300));
    }
    lines.push(format!("Added {YT_1300} to {REBELS}"));

    let executor = collection.group_mut(EMPIRE)?.record_mut(EXECUTOR)?;
    executor.set("length_meters", 20000);
    lines.push(format_value(executor.field("length_meters")?));

    match executor.field_mut("armament")? {
        Value::Sequence(armament) => armament.push(Value::from("Death beam")),
        _ => {
            return Err(Error::malformed(
                &format!("{EMPIRE}/{EXECUTOR}/armament"),
                "expected a sequence",
            ))
        }
    }
    lines.push(format_value(executor.field("armament")?));

    match collection.group(REBELS) {
        Ok(faction) if faction.contains(X_WING) => {
            lines.push(format!("X-Wing found in {REBELS}"));
        }
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, "skipping X-Wing check"),
    }

    collection
        .group_mut(TRADE_FEDERATION)?
        .remove_record(LANDING_CRAFT)?;
    lines.push(format!("Removed {LANDING_CRAFT} from {TRADE_FEDERATION}"));

    let empire = collection.remove_group(EMPIRE)?;
    lines.push(format!("Removed {EMPIRE} and its {} ships", empire.len()));

    Ok(lines)
}

/// Analysis over the flat view: class filter, length ranking, name search,
/// statistics, data-quality check and indexed lookup.
pub fn analyze(collection: &Collection) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    let rows = collection.flatten();

    for row in flat::filter_class(&rows, "Starfighter") {
        lines.push(format!("{} ({}) is a starfighter", row.name, row.group));
    }

    let mut ranked = rows.clone();
    flat::sort_by_length_desc(&mut ranked);
    for row in &ranked {
        match row.record.length_meters() {
            Some(length) => lines.push(format!("{}: {}m", row.name, length)),
            None => lines.push(format!("{}: unknown length", row.name)),
        }
    }

    for row in flat::search_names(&rows, "freighter") {
        lines.push(format!("{} (Faction: {})", row.name, row.group));
    }

    if let Some(stats) = LengthStats::describe(&rows) {
        lines.push(format!(
            "length: count {} mean {:.2} min {} q1 {} median {} q3 {} max {}",
            stats.count, stats.mean, stats.min, stats.q1, stats.median, stats.q3, stats.max
        ));
    }

    for row in flat::missing_field(&rows, "manufacturer") {
        lines.push(format!("Missing manufacturer: {} ({})", row.name, row.group));
    }

    let index = flat::index_by_name(&rows);
    let x_wing = index
        .get(X_WING)
        .ok_or_else(|| Error::not_found("record", X_WING))?;
    lines.push(format!(
        "{X_WING} class: {}",
        x_wing.record.ship_class().unwrap_or("unknown")
    ));

    Ok(lines)
}
