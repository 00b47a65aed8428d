//! Roster composition rules
//!
//! A roster is built up one pick at a time. In-progress rosters may be short of the
//! required slot counts, but no sequence of `try_add` / `remove` calls can ever produce
//! a roster that costs more than [`BUDGET`]. Only a full roster (5 drivers, 2
//! constructors) may be saved.

use crate::catalog::{CatalogId, ItemKind, LeagueCatalog};
use crate::error::{Result, ValidationError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Spending cap for one roster
pub const BUDGET: Decimal = Decimal::from_parts(110, 0, 0, false, 0);

/// Driver slots on a roster
pub const DRIVER_SLOTS: usize = 5;

/// Constructor slots on a roster
pub const CONSTRUCTOR_SLOTS: usize = 2;

/// The drivers and constructors an entrant has picked
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    pub drivers: BTreeSet<CatalogId>,
    pub constructors: BTreeSet<CatalogId>,
}

impl Roster {
    /// Create an empty roster
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids picked for a kind
    pub fn ids(&self, kind: ItemKind) -> &BTreeSet<CatalogId> {
        match kind {
            ItemKind::Driver => &self.drivers,
            ItemKind::Constructor => &self.constructors,
        }
    }

    fn ids_mut(&mut self, kind: ItemKind) -> &mut BTreeSet<CatalogId> {
        match kind {
            ItemKind::Driver => &mut self.drivers,
            ItemKind::Constructor => &mut self.constructors,
        }
    }

    pub fn contains(&self, id: CatalogId, kind: ItemKind) -> bool {
        self.ids(kind).contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty() && self.constructors.is_empty()
    }

    /// Total price of the current picks. Ids missing from the catalog cost nothing.
    ///
    /// The budget check in [`Roster::try_add`] uses this same sum, so the displayed cost
    /// and the enforced cost cannot drift apart.
    pub fn cost(&self, catalog: &LeagueCatalog) -> Decimal {
        let drivers = self.drivers.iter().filter_map(|id| catalog.drivers.price(*id));
        let constructors =
            self.constructors.iter().filter_map(|id| catalog.constructors.price(*id));
        drivers.chain(constructors).sum()
    }

    /// Budget left before hitting the cap
    pub fn remaining_budget(&self, catalog: &LeagueCatalog) -> Decimal {
        BUDGET - self.cost(catalog)
    }

    /// Add a pick, returning the new roster.
    ///
    /// Picking an id that is already on the roster is a no-op. Otherwise the slot quota
    /// is checked before the budget.
    pub fn try_add(&self, id: CatalogId, kind: ItemKind, catalog: &LeagueCatalog) -> Result<Roster> {
        if self.contains(id, kind) {
            return Ok(self.clone());
        }

        let price = catalog.of(kind).price(id).ok_or(ValidationError::UnknownItem { kind, id })?;

        let limit = kind.slots();
        if self.ids(kind).len() >= limit {
            return Err(ValidationError::QuotaExceeded { kind, limit });
        }

        let cost = self.cost(catalog);
        if cost + price > BUDGET {
            return Err(ValidationError::BudgetExceeded { cost, price, budget: BUDGET });
        }

        let mut next = self.clone();
        next.ids_mut(kind).insert(id);
        Ok(next)
    }

    /// Drop a pick. Removing an id that isn't there changes nothing.
    pub fn remove(&self, id: CatalogId, kind: ItemKind) -> Roster {
        let mut next = self.clone();
        next.ids_mut(kind).remove(&id);
        next
    }

    /// Exactly 5 drivers and exactly 2 constructors
    pub fn is_saveable(&self) -> bool {
        self.drivers.len() == DRIVER_SLOTS && self.constructors.len() == CONSTRUCTOR_SLOTS
    }

    /// Full check before a roster may cross into shared state
    pub fn validate_for_save(&self, catalog: &LeagueCatalog) -> Result<()> {
        if !self.is_saveable() {
            return Err(ValidationError::IncompleteRoster {
                drivers: self.drivers.len(),
                constructors: self.constructors.len(),
            });
        }

        for kind in [ItemKind::Driver, ItemKind::Constructor] {
            if let Some(id) = self.ids(kind).iter().find(|id| !catalog.of(kind).contains(**id)) {
                return Err(ValidationError::UnknownItem { kind, id: *id });
            }
        }

        let cost = self.cost(catalog);
        if cost > BUDGET {
            return Err(ValidationError::BudgetExceeded { cost, price: Decimal::ZERO, budget: BUDGET });
        }

        Ok(())
    }
}
