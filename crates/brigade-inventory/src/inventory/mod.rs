//! Vehicle equipment catalog, inspections, and status resolution.
//!
//! `status` is the pure aggregation engine. The service and router wrap it with storage
//! access and an HTTP surface.

pub mod domain;
pub mod memory;
pub mod repository;
pub mod router;
pub mod service;
pub mod snapshot;
pub mod status;
pub mod views;

#[cfg(test)]
mod tests;

pub use domain::{
    Compartment, CompartmentId, Inspection, InspectionId, Item, ItemCheck, ItemId, ItemResult,
    UserId, Vehicle, VehicleId,
};
pub use memory::MemoryInventoryRepository;
pub use repository::{
    InventoryRepository, NewCompartment, NewInspection, NewItem, NewVehicle, RepositoryError,
};
pub use router::inventory_router;
pub use service::{
    CompartmentUpdate, InspectionFilter, InspectionSubmission, InventoryService,
    InventoryServiceError, ItemFilter, ItemUpdate, ValidationError,
};
pub use snapshot::{CatalogError, FleetSnapshot, SnapshotError};
pub use status::{
    classify, resolve_fleet, resolve_status, CheckTally, InspectionStatus, InvalidInput,
    StatusSummary, VehicleHistory,
};
pub use views::{InspectionView, ItemResultView};
