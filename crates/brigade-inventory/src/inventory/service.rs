use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use super::domain::{
    Compartment, CompartmentId, Inspection, InspectionId, Item, ItemId, ItemResult, UserId,
    Vehicle, VehicleId,
};
use super::repository::{
    InventoryRepository, NewCompartment, NewInspection, NewItem, NewVehicle, RepositoryError,
};
use super::status::{resolve_fleet, resolve_status, InvalidInput, StatusSummary, VehicleHistory};
use super::views::InspectionView;

const VEHICLE_CODE_MAX: usize = 20;
const NAME_MAX: usize = 100;
const ITEM_NAME_MAX: usize = 200;
const RESPONSIBLE_MAX: usize = 100;

/// Partial update for a compartment; absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CompartmentUpdate {
    pub name: Option<String>,
    pub display_order: Option<u32>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ItemUpdate {
    pub compartment_id: Option<CompartmentId>,
    pub name: Option<String>,
    pub expected_quantity: Option<u32>,
    pub display_order: Option<u32>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ItemFilter {
    pub compartment: Option<CompartmentId>,
    pub vehicle: Option<VehicleId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InspectionFilter {
    pub vehicle: Option<VehicleId>,
    pub responsible: Option<String>,
}

/// Inspection payload captured on the truck.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InspectionSubmission {
    pub vehicle_id: VehicleId,
    pub responsible: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub results: Vec<ItemResult>,
}

/// Service composing the repository with the status engine.
pub struct InventoryService<R> {
    repository: Arc<R>,
}

impl<R> InventoryService<R>
where
    R: InventoryRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn register_vehicle(&self, vehicle: NewVehicle) -> Result<Vehicle, InventoryServiceError> {
        require_text("code", &vehicle.code, VEHICLE_CODE_MAX)?;
        limit_text("name", &vehicle.name, NAME_MAX)?;

        let stored = self.repository.insert_vehicle(vehicle)?;
        info!(vehicle = %stored.code, "vehicle registered");
        Ok(stored)
    }

    /// Active vehicles ordered by code.
    pub fn vehicles(&self) -> Result<Vec<Vehicle>, InventoryServiceError> {
        let mut vehicles: Vec<Vehicle> = self
            .repository
            .vehicles()?
            .into_iter()
            .filter(|vehicle| vehicle.active)
            .collect();
        vehicles.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(vehicles)
    }

    pub fn vehicle(&self, id: VehicleId) -> Result<Vehicle, InventoryServiceError> {
        let vehicle = self
            .repository
            .vehicle(id)?
            .filter(|vehicle| vehicle.active)
            .ok_or(RepositoryError::NotFound)?;
        Ok(vehicle)
    }

    pub fn vehicle_status(
        &self,
        id: VehicleId,
        responsible: Option<&str>,
    ) -> Result<StatusSummary, InventoryServiceError> {
        let vehicle = self.vehicle(id)?;
        let inspections = self.repository.inspections(Some(id))?;
        Ok(resolve_status(&vehicle, &inspections, responsible)?)
    }

    pub fn fleet_status(
        &self,
        responsible: Option<&str>,
    ) -> Result<Vec<StatusSummary>, InventoryServiceError> {
        let mut by_vehicle: HashMap<VehicleId, Vec<Inspection>> = HashMap::new();
        for inspection in self.repository.inspections(None)? {
            by_vehicle
                .entry(inspection.vehicle_id)
                .or_default()
                .push(inspection);
        }

        let histories: Vec<VehicleHistory> = self
            .repository
            .vehicles()?
            .into_iter()
            .map(|vehicle| VehicleHistory {
                inspections: by_vehicle.remove(&vehicle.id).unwrap_or_default(),
                vehicle,
            })
            .collect();

        Ok(resolve_fleet(&histories, responsible)?)
    }

    /// Active compartments, each carrying only its active items.
    pub fn compartments(
        &self,
        vehicle: Option<VehicleId>,
    ) -> Result<Vec<Compartment>, InventoryServiceError> {
        let mut compartments: Vec<Compartment> = self
            .repository
            .vehicles()?
            .into_iter()
            .filter(|candidate| vehicle.map_or(true, |id| candidate.id == id))
            .flat_map(|candidate| candidate.compartments)
            .filter(|compartment| compartment.active)
            .map(without_retired_items)
            .collect();
        compartments.sort_by(|a, b| {
            a.vehicle_id
                .cmp(&b.vehicle_id)
                .then_with(|| a.display_order.cmp(&b.display_order))
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(compartments)
    }

    pub fn compartment(&self, id: CompartmentId) -> Result<Compartment, InventoryServiceError> {
        let compartment = self
            .repository
            .compartment(id)?
            .filter(|compartment| compartment.active)
            .ok_or(RepositoryError::NotFound)?;
        Ok(without_retired_items(compartment))
    }

    pub fn add_compartment(
        &self,
        compartment: NewCompartment,
    ) -> Result<Compartment, InventoryServiceError> {
        require_text("name", &compartment.name, NAME_MAX)?;

        let stored = self.repository.insert_compartment(compartment)?;
        info!(compartment = %stored.id, vehicle = %stored.vehicle_id, "compartment added");
        Ok(stored)
    }

    pub fn update_compartment(
        &self,
        id: CompartmentId,
        update: CompartmentUpdate,
    ) -> Result<Compartment, InventoryServiceError> {
        // Retired compartments stay addressable here so they can be reactivated.
        let mut compartment = self
            .repository
            .compartment(id)?
            .ok_or(RepositoryError::NotFound)?;
        if let Some(name) = update.name {
            require_text("name", &name, NAME_MAX)?;
            compartment.name = name;
        }
        if let Some(display_order) = update.display_order {
            compartment.display_order = display_order;
        }
        if let Some(active) = update.active {
            compartment.active = active;
        }

        let stored = self.repository.update_compartment(compartment)?;
        info!(compartment = %stored.id, active = stored.active, "compartment updated");
        Ok(without_retired_items(stored))
    }

    /// Remove a compartment from the active catalog. Past inspection results are kept.
    pub fn retire_compartment(&self, id: CompartmentId) -> Result<(), InventoryServiceError> {
        let mut compartment = self.compartment(id)?;
        compartment.active = false;
        self.repository.update_compartment(compartment)?;
        info!(compartment = %id, "compartment retired");
        Ok(())
    }

    pub fn items(&self, filter: &ItemFilter) -> Result<Vec<Item>, InventoryServiceError> {
        let mut items: Vec<Item> = self
            .repository
            .vehicles()?
            .into_iter()
            .filter(|vehicle| filter.vehicle.map_or(true, |id| vehicle.id == id))
            .flat_map(|vehicle| vehicle.compartments)
            .filter(|compartment| filter.compartment.map_or(true, |id| compartment.id == id))
            .flat_map(|compartment| compartment.items)
            .filter(|item| item.active)
            .collect();
        items.sort_by(|a, b| {
            a.compartment_id
                .cmp(&b.compartment_id)
                .then_with(|| a.display_order.cmp(&b.display_order))
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(items)
    }

    pub fn item(&self, id: ItemId) -> Result<Item, InventoryServiceError> {
        let item = self
            .repository
            .item(id)?
            .filter(|item| item.active)
            .ok_or(RepositoryError::NotFound)?;
        Ok(item)
    }

    pub fn add_item(&self, item: NewItem) -> Result<Item, InventoryServiceError> {
        require_text("name", &item.name, ITEM_NAME_MAX)?;
        if item.expected_quantity == 0 {
            return Err(ValidationError::ZeroQuantity.into());
        }

        let stored = self.repository.insert_item(item)?;
        info!(item = %stored.id, compartment = %stored.compartment_id, "item added");
        Ok(stored)
    }

    pub fn update_item(
        &self,
        id: ItemId,
        update: ItemUpdate,
    ) -> Result<Item, InventoryServiceError> {
        let mut item = self
            .repository
            .item(id)?
            .ok_or(RepositoryError::NotFound)?;
        if let Some(target) = update.compartment_id.filter(|target| *target != item.compartment_id)
        {
            self.ensure_same_vehicle(item.compartment_id, target)?;
            item.compartment_id = target;
        }
        if let Some(name) = update.name {
            require_text("name", &name, ITEM_NAME_MAX)?;
            item.name = name;
        }
        if let Some(quantity) = update.expected_quantity {
            if quantity == 0 {
                return Err(ValidationError::ZeroQuantity.into());
            }
            item.expected_quantity = quantity;
        }
        if let Some(display_order) = update.display_order {
            item.display_order = display_order;
        }
        if let Some(active) = update.active {
            item.active = active;
        }

        let stored = self.repository.update_item(item)?;
        info!(item = %stored.id, active = stored.active, "item updated");
        Ok(stored)
    }

    /// Remove an item from the active catalog. Past inspection results are kept.
    pub fn retire_item(&self, id: ItemId) -> Result<(), InventoryServiceError> {
        let mut item = self.item(id)?;
        item.active = false;
        self.repository.update_item(item)?;
        info!(item = %id, "item retired");
        Ok(())
    }

    /// Validate and store an inspection together with all of its item results.
    pub fn record_inspection(
        &self,
        submission: InspectionSubmission,
        performer: Option<UserId>,
    ) -> Result<InspectionView, InventoryServiceError> {
        require_text("responsible", &submission.responsible, RESPONSIBLE_MAX)?;

        let vehicle = self
            .repository
            .vehicle(submission.vehicle_id)?
            .filter(|vehicle| vehicle.active)
            .ok_or(RepositoryError::NotFound)?;

        let mut seen = HashSet::with_capacity(submission.results.len());
        for result in &submission.results {
            if vehicle.find_item(result.item_id).is_none() {
                return Err(ValidationError::ItemNotOnVehicle {
                    item: result.item_id,
                    vehicle: vehicle.id,
                }
                .into());
            }
            if !seen.insert(result.item_id) {
                return Err(ValidationError::DuplicateItem {
                    item: result.item_id,
                }
                .into());
            }
        }

        let stored = self.repository.insert_inspection(NewInspection {
            vehicle_id: vehicle.id,
            responsible: submission.responsible,
            performed_at: Utc::now(),
            notes: submission.notes.filter(|notes| !notes.trim().is_empty()),
            performed_by: performer,
            results: submission.results,
        })?;

        let view = InspectionView::build(&stored, Some(&vehicle));
        info!(
            inspection = %view.id,
            vehicle = %view.vehicle_code,
            responsible = %view.responsible,
            status = view.status.label(),
            reviewed = view.reviewed,
            "inspection recorded"
        );
        Ok(view)
    }

    /// Inspections newest first, optionally scoped by vehicle and responsible party.
    pub fn inspections(
        &self,
        filter: &InspectionFilter,
    ) -> Result<Vec<InspectionView>, InventoryServiceError> {
        let responsible = filter
            .responsible
            .as_deref()
            .filter(|party| !party.is_empty());

        let mut inspections: Vec<Inspection> = self
            .repository
            .inspections(filter.vehicle)?
            .into_iter()
            .filter(|inspection| responsible.map_or(true, |party| inspection.responsible == party))
            .collect();
        inspections.sort_by(|a, b| {
            b.performed_at
                .cmp(&a.performed_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let vehicles: HashMap<VehicleId, Vehicle> = self
            .repository
            .vehicles()?
            .into_iter()
            .map(|vehicle| (vehicle.id, vehicle))
            .collect();

        Ok(inspections
            .iter()
            .map(|inspection| InspectionView::build(inspection, vehicles.get(&inspection.vehicle_id)))
            .collect())
    }

    pub fn inspection(&self, id: InspectionId) -> Result<InspectionView, InventoryServiceError> {
        let inspection = self
            .repository
            .inspection(id)?
            .ok_or(RepositoryError::NotFound)?;
        let vehicle = self.repository.vehicle(inspection.vehicle_id)?;
        Ok(InspectionView::build(&inspection, vehicle.as_ref()))
    }

    /// Record who performed an inspection. Only allowed while no performer is set.
    pub fn assign_performer(
        &self,
        id: InspectionId,
        user: UserId,
    ) -> Result<InspectionView, InventoryServiceError> {
        let updated = self
            .repository
            .assign_performer(id, user)
            .map_err(|err| match err {
                RepositoryError::Conflict => {
                    InventoryServiceError::from(ValidationError::PerformerAlreadyAssigned {
                        inspection: id,
                    })
                }
                other => other.into(),
            })?;
        let vehicle = self.repository.vehicle(updated.vehicle_id)?;
        info!(inspection = %id, user = %user, "inspection performer assigned");
        Ok(InspectionView::build(&updated, vehicle.as_ref()))
    }

    fn ensure_same_vehicle(
        &self,
        current: CompartmentId,
        target: CompartmentId,
    ) -> Result<(), InventoryServiceError> {
        let current = self
            .repository
            .compartment(current)?
            .ok_or(RepositoryError::NotFound)?;
        let target = self
            .repository
            .compartment(target)?
            .ok_or(RepositoryError::NotFound)?;
        if current.vehicle_id != target.vehicle_id {
            return Err(ValidationError::CompartmentOnOtherVehicle {
                compartment: target.id,
                vehicle: current.vehicle_id,
            }
            .into());
        }
        Ok(())
    }
}

fn without_retired_items(mut compartment: Compartment) -> Compartment {
    compartment.items.retain(|item| item.active);
    compartment
}

fn require_text(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField { field });
    }
    limit_text(field, value, max)
}

fn limit_text(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

/// Rejected catalog or inspection input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must not be blank")]
    BlankField { field: &'static str },
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("expected quantity must be at least 1")]
    ZeroQuantity,
    #[error("item {item} does not belong to vehicle {vehicle}")]
    ItemNotOnVehicle { item: ItemId, vehicle: VehicleId },
    #[error("item {item} is recorded more than once")]
    DuplicateItem { item: ItemId },
    #[error("compartment {compartment} is not on vehicle {vehicle}")]
    CompartmentOnOtherVehicle {
        compartment: CompartmentId,
        vehicle: VehicleId,
    },
    #[error("inspection {inspection} already has a performer")]
    PerformerAlreadyAssigned { inspection: InspectionId },
}

/// Error raised by the inventory service.
#[derive(Debug, thiserror::Error)]
pub enum InventoryServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
