//! Driver and constructor catalogs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Catalog item id, unique within one kind
pub type CatalogId = u32;

/// Highest price an item can carry; committed prices are clamped to it
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_000, 0, 0, false, 0);

/// Decimal places a committed price keeps
pub const PRICE_SCALE: u32 = 2;

/// The two disjoint catalogs an entrant picks from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Driver,
    Constructor,
}

impl ItemKind {
    /// Number of roster slots for this kind
    pub fn slots(self) -> usize {
        match self {
            ItemKind::Driver => crate::roster::DRIVER_SLOTS,
            ItemKind::Constructor => crate::roster::CONSTRUCTOR_SLOTS,
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Driver => write!(f, "driver"),
            ItemKind::Constructor => write!(f, "constructor"),
        }
    }
}

/// A driver or constructor with its price and points for the current round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: CatalogId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub points: i64,
}

impl CatalogItem {
    /// Create a new item with zero points
    pub fn new(id: CatalogId, name: impl Into<String>, price: Decimal) -> Self {
        Self { id, name: name.into(), price, points: 0 }
    }

    /// Change the price. Points always go back to 0 with a price change so a stale
    /// score never leaks into the next settlement.
    pub fn reprice(&mut self, price: Decimal) {
        self.price = price;
        self.points = 0;
    }
}

/// One kind's catalog, keyed by id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    kind: ItemKind,
    items: BTreeMap<CatalogId, CatalogItem>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new(kind: ItemKind) -> Self {
        Self { kind, items: BTreeMap::new() }
    }

    /// Build a catalog from items. A later item with a repeated id replaces the earlier one.
    pub fn from_items(kind: ItemKind, items: impl IntoIterator<Item = CatalogItem>) -> Self {
        let items = items.into_iter().map(|item| (item.id, item)).collect();
        Self { kind, items }
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn get(&self, id: CatalogId) -> Option<&CatalogItem> {
        self.items.get(&id)
    }

    pub fn get_mut(&mut self, id: CatalogId) -> Option<&mut CatalogItem> {
        self.items.get_mut(&id)
    }

    pub fn contains(&self, id: CatalogId) -> bool {
        self.items.contains_key(&id)
    }

    /// Price of an item, if it exists
    pub fn price(&self, id: CatalogId) -> Option<Decimal> {
        self.items.get(&id).map(|item| item.price)
    }

    /// Points of an item; ids with no entry contribute 0
    pub fn points(&self, id: CatalogId) -> i64 {
        self.items.get(&id).map_or(0, |item| item.points)
    }

    /// Items in id order
    pub fn iter(&self) -> impl Iterator<Item = &CatalogItem> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Both catalogs together, as the roster rules need them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeagueCatalog {
    pub drivers: Catalog,
    pub constructors: Catalog,
}

impl LeagueCatalog {
    pub fn new(drivers: Catalog, constructors: Catalog) -> Self {
        Self { drivers, constructors }
    }

    /// The catalog for a kind
    pub fn of(&self, kind: ItemKind) -> &Catalog {
        match kind {
            ItemKind::Driver => &self.drivers,
            ItemKind::Constructor => &self.constructors,
        }
    }
}
