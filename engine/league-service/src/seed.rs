//! Default season catalogs and first-run seeding

use crate::Result;
use persistence::{Collection, Value, WriteOp};
use roster_core::{CatalogItem, Decimal};
use serde_json::json;

const DRIVERS: [(&str, i64); 20] = [
    ("Max Verstappen", 300),
    ("Sergio Pérez", 180),
    ("Charles Leclerc", 210),
    ("Carlos Sainz", 200),
    ("Lando Norris", 220),
    ("Oscar Piastri", 190),
    ("Lewis Hamilton", 250),
    ("George Russell", 230),
    ("Fernando Alonso", 150),
    ("Lance Stroll", 90),
    ("Pierre Gasly", 80),
    ("Esteban Ocon", 80),
    ("Yuki Tsunoda", 75),
    ("Daniel Ricciardo", 70),
    ("Valtteri Bottas", 60),
    ("Zhou Guanyu", 55),
    ("Alexander Albon", 85),
    ("Logan Sargeant", 50),
    ("Kevin Magnussen", 65),
    ("Nico Hülkenberg", 70),
];

const CONSTRUCTORS: [(&str, i64); 10] = [
    ("Red Bull Racing", 280),
    ("Ferrari", 240),
    ("McLaren", 250),
    ("Mercedes", 260),
    ("Aston Martin", 140),
    ("Alpine", 90),
    ("RB", 80),
    ("Sauber", 60),
    ("Williams", 70),
    ("Haas", 65),
];

fn items(table: &[(&str, i64)]) -> Vec<CatalogItem> {
    table
        .iter()
        .zip(1..)
        .map(|((name, tenths), id)| CatalogItem::new(id, *name, Decimal::new(*tenths, 1)))
        .collect()
}

/// The default driver catalog, ids 1..=20
pub fn default_drivers() -> Vec<CatalogItem> {
    items(&DRIVERS)
}

/// The default constructor catalog, ids 1..=10
pub fn default_constructors() -> Vec<CatalogItem> {
    items(&CONSTRUCTORS)
}

/// Batch that writes both default catalogs and, with `with_config`, an unlocked
/// league config.
///
/// Guarded so it only commits into a store without driver 1. The config write is
/// further guarded on `deadline` and `settlementVersion` still being unset, so an
/// existing config is never reset.
pub fn seed_batch(with_config: bool) -> Result<Vec<WriteOp>> {
    let mut ops = vec![WriteOp::expect(Collection::Drivers, "1", "id", Value::Null)];
    if with_config {
        for field in ["deadline", "settlementVersion"] {
            ops.push(WriteOp::expect(Collection::Config, Collection::CONFIG_KEY, field, Value::Null));
        }
    }

    for item in default_drivers() {
        ops.push(WriteOp::set(Collection::Drivers, item.id.to_string(), serde_json::to_value(&item)?));
    }
    for item in default_constructors() {
        ops.push(WriteOp::set(Collection::Constructors, item.id.to_string(), serde_json::to_value(&item)?));
    }
    if with_config {
        ops.push(WriteOp::merge(
            Collection::Config,
            Collection::CONFIG_KEY,
            json!({"deadline": null, "settlementVersion": 0}),
        )?);
    }

    Ok(ops)
}
