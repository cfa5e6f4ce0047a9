use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;

use crate::inventory::domain::{
    Compartment, CompartmentId, Inspection, InspectionId, Item, ItemCheck, ItemId, ItemResult,
    UserId, Vehicle, VehicleId,
};
use crate::inventory::memory::MemoryInventoryRepository;
use crate::inventory::repository::{
    InventoryRepository, NewCompartment, NewInspection, NewItem, NewVehicle, RepositoryError,
};
use crate::inventory::service::{InspectionSubmission, InventoryService};

/// Catalog with one pumper: two compartments, three active items and one retired item.
pub(super) struct Station {
    pub(super) repository: Arc<MemoryInventoryRepository>,
    pub(super) service: InventoryService<MemoryInventoryRepository>,
    pub(super) pumper: Vehicle,
    pub(super) items: Vec<Item>,
    pub(super) retired: Item,
}

pub(super) fn station() -> Station {
    let repository = Arc::new(MemoryInventoryRepository::default());
    let service = InventoryService::new(repository.clone());

    let pumper = service
        .register_vehicle(NewVehicle {
            code: "ABI-02".to_string(),
            name: "Autobomba ABI-02".to_string(),
        })
        .expect("vehicle registers");
    let left = service
        .add_compartment(NewCompartment {
            vehicle_id: pumper.id,
            name: "Lateral izquierdo".to_string(),
            display_order: 1,
        })
        .expect("compartment added");
    let rear = service
        .add_compartment(NewCompartment {
            vehicle_id: pumper.id,
            name: "Trasero".to_string(),
            display_order: 2,
        })
        .expect("compartment added");

    let mut items = Vec::new();
    for (compartment, name) in [
        (left.id, "Manguera 50mm"),
        (left.id, "Pitón"),
        (rear.id, "Hacha"),
    ] {
        items.push(
            service
                .add_item(new_item(compartment, name))
                .expect("item added"),
        );
    }
    let retired = service
        .add_item(new_item(rear.id, "Linterna antigua"))
        .expect("item added");
    service.retire_item(retired.id).expect("item retired");

    let pumper = service.vehicle(pumper.id).expect("vehicle present");

    Station {
        repository,
        service,
        pumper,
        items,
        retired,
    }
}

pub(super) fn new_item(compartment_id: CompartmentId, name: &str) -> NewItem {
    NewItem {
        compartment_id,
        name: name.to_string(),
        expected_quantity: 1,
        display_order: 0,
    }
}

pub(super) fn submission(
    vehicle_id: VehicleId,
    responsible: &str,
    results: &[(ItemId, ItemCheck)],
) -> InspectionSubmission {
    InspectionSubmission {
        vehicle_id,
        responsible: responsible.to_string(),
        notes: None,
        results: results
            .iter()
            .map(|(item_id, check)| ItemResult {
                item_id: *item_id,
                check: *check,
                notes: None,
            })
            .collect(),
    }
}

pub(super) struct UnavailableRepository;

impl InventoryRepository for UnavailableRepository {
    fn vehicles(&self) -> Result<Vec<Vehicle>, RepositoryError> {
        Err(offline())
    }

    fn vehicle(&self, _id: VehicleId) -> Result<Option<Vehicle>, RepositoryError> {
        Err(offline())
    }

    fn insert_vehicle(&self, _vehicle: NewVehicle) -> Result<Vehicle, RepositoryError> {
        Err(offline())
    }

    fn compartment(&self, _id: CompartmentId) -> Result<Option<Compartment>, RepositoryError> {
        Err(offline())
    }

    fn insert_compartment(
        &self,
        _compartment: NewCompartment,
    ) -> Result<Compartment, RepositoryError> {
        Err(offline())
    }

    fn update_compartment(
        &self,
        _compartment: Compartment,
    ) -> Result<Compartment, RepositoryError> {
        Err(offline())
    }

    fn item(&self, _id: ItemId) -> Result<Option<Item>, RepositoryError> {
        Err(offline())
    }

    fn insert_item(&self, _item: NewItem) -> Result<Item, RepositoryError> {
        Err(offline())
    }

    fn update_item(&self, _item: Item) -> Result<Item, RepositoryError> {
        Err(offline())
    }

    fn inspections(
        &self,
        _vehicle: Option<VehicleId>,
    ) -> Result<Vec<Inspection>, RepositoryError> {
        Err(offline())
    }

    fn inspection(&self, _id: InspectionId) -> Result<Option<Inspection>, RepositoryError> {
        Err(offline())
    }

    fn insert_inspection(
        &self,
        _inspection: NewInspection,
    ) -> Result<Inspection, RepositoryError> {
        Err(offline())
    }

    fn assign_performer(
        &self,
        _id: InspectionId,
        _user: UserId,
    ) -> Result<Inspection, RepositoryError> {
        Err(offline())
    }
}

fn offline() -> RepositoryError {
    RepositoryError::Unavailable("database offline".to_string())
}

pub(super) fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(response.status(), expected);
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
