use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(
    /// Identifier of a tracked apparatus.
    VehicleId
);
record_id!(CompartmentId);
record_id!(ItemId);
record_id!(InspectionId);
record_id!(
    /// Account that performed an inspection, when known.
    UserId
);

/// Outcome recorded for a single item during an inspection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCheck {
    #[serde(alias = "si")]
    Pass,
    #[serde(alias = "no")]
    Fail,
    #[default]
    #[serde(alias = "pendiente")]
    Unchecked,
}

impl ItemCheck {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pass => "Present",
            Self::Fail => "Missing",
            Self::Unchecked => "Unchecked",
        }
    }
}

/// Fire truck (or other apparatus) with its storage compartments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub compartments: Vec<Compartment>,
}

impl Vehicle {
    /// Number of active items held in active compartments.
    pub fn expected_item_total(&self) -> usize {
        self.compartments
            .iter()
            .filter(|compartment| compartment.active)
            .map(|compartment| compartment.items.iter().filter(|item| item.active).count())
            .sum()
    }

    /// Active compartments sorted by display order, then name.
    pub fn active_compartments(&self) -> Vec<&Compartment> {
        let mut compartments: Vec<&Compartment> = self
            .compartments
            .iter()
            .filter(|compartment| compartment.active)
            .collect();
        compartments.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.name.cmp(&b.name))
        });
        compartments
    }

    /// Compartment holding `item`, whether or not either is still active.
    pub fn compartment_of(&self, item: ItemId) -> Option<&Compartment> {
        self.compartments
            .iter()
            .find(|compartment| compartment.items.iter().any(|candidate| candidate.id == item))
    }

    pub fn find_item(&self, item: ItemId) -> Option<&Item> {
        self.compartments
            .iter()
            .flat_map(|compartment| compartment.items.iter())
            .find(|candidate| candidate.id == item)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compartment {
    pub id: CompartmentId,
    pub vehicle_id: VehicleId,
    pub name: String,
    #[serde(default)]
    pub display_order: u32,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Compartment {
    pub fn active_items(&self) -> Vec<&Item> {
        let mut items: Vec<&Item> = self.items.iter().filter(|item| item.active).collect();
        items.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.name.cmp(&b.name))
        });
        items
    }
}

/// Piece of equipment expected inside a compartment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub compartment_id: CompartmentId,
    pub name: String,
    #[serde(default = "default_quantity")]
    pub expected_quantity: u32,
    #[serde(default)]
    pub display_order: u32,
    #[serde(default = "default_active")]
    pub active: bool,
}

/// Timestamped check of a vehicle's equipment by a responsible party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inspection {
    pub id: InspectionId,
    pub vehicle_id: VehicleId,
    pub responsible: String,
    pub performed_at: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub performed_by: Option<UserId>,
    #[serde(default)]
    pub results: Vec<ItemResult>,
}

impl Inspection {
    pub fn checks(&self) -> impl Iterator<Item = ItemCheck> + '_ {
        self.results.iter().map(|result| result.check)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemResult {
    pub item_id: ItemId,
    #[serde(default)]
    pub check: ItemCheck,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_active() -> bool {
    true
}

pub(crate) fn default_quantity() -> u32 {
    1
}
