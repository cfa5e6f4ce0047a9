use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    default_quantity, Compartment, CompartmentId, Inspection, InspectionId, Item, ItemId,
    ItemResult, UserId, Vehicle, VehicleId,
};

/// Vehicle registration before an identifier has been assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVehicle {
    pub code: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCompartment {
    pub vehicle_id: VehicleId,
    pub name: String,
    #[serde(default)]
    pub display_order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub compartment_id: CompartmentId,
    pub name: String,
    #[serde(default = "default_quantity")]
    pub expected_quantity: u32,
    #[serde(default)]
    pub display_order: u32,
}

/// Inspection and all of its results, written as one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInspection {
    pub vehicle_id: VehicleId,
    pub responsible: String,
    pub performed_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub performed_by: Option<UserId>,
    pub results: Vec<ItemResult>,
}

/// Storage abstraction so the service module can be exercised in isolation.
///
/// Reads hand back owned snapshots. `insert_inspection` must make the inspection and its
/// results visible together; readers never observe a partially written inspection.
pub trait InventoryRepository: Send + Sync {
    fn vehicles(&self) -> Result<Vec<Vehicle>, RepositoryError>;
    fn vehicle(&self, id: VehicleId) -> Result<Option<Vehicle>, RepositoryError>;
    fn insert_vehicle(&self, vehicle: NewVehicle) -> Result<Vehicle, RepositoryError>;

    fn compartment(&self, id: CompartmentId) -> Result<Option<Compartment>, RepositoryError>;
    fn insert_compartment(
        &self,
        compartment: NewCompartment,
    ) -> Result<Compartment, RepositoryError>;
    /// Replace name, order and active flag; the compartment's items are left untouched.
    fn update_compartment(&self, compartment: Compartment)
        -> Result<Compartment, RepositoryError>;

    fn item(&self, id: ItemId) -> Result<Option<Item>, RepositoryError>;
    fn insert_item(&self, item: NewItem) -> Result<Item, RepositoryError>;
    fn update_item(&self, item: Item) -> Result<Item, RepositoryError>;

    fn inspections(&self, vehicle: Option<VehicleId>) -> Result<Vec<Inspection>, RepositoryError>;
    fn inspection(&self, id: InspectionId) -> Result<Option<Inspection>, RepositoryError>;
    fn insert_inspection(&self, inspection: NewInspection) -> Result<Inspection, RepositoryError>;
    /// Set the performer of an inspection that has none yet; `Conflict` when one is recorded.
    /// The check and the write happen as one step.
    fn assign_performer(
        &self,
        id: InspectionId,
        user: UserId,
    ) -> Result<Inspection, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
