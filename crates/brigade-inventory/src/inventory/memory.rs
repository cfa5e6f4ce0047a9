use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{
    Compartment, CompartmentId, Inspection, InspectionId, Item, ItemId, UserId, Vehicle,
    VehicleId,
};
use super::repository::{
    InventoryRepository, NewCompartment, NewInspection, NewItem, NewVehicle, RepositoryError,
};
use super::status::VehicleHistory;

#[derive(Debug, Default)]
struct MemoryState {
    vehicles: BTreeMap<VehicleId, Vehicle>,
    inspections: BTreeMap<InspectionId, Inspection>,
    last_vehicle: u64,
    last_compartment: u64,
    last_item: u64,
    last_inspection: u64,
}

impl MemoryState {
    fn find_compartment(&self, id: CompartmentId) -> Option<&Compartment> {
        self.vehicles
            .values()
            .flat_map(|vehicle| vehicle.compartments.iter())
            .find(|compartment| compartment.id == id)
    }

    fn find_compartment_mut(&mut self, id: CompartmentId) -> Option<&mut Compartment> {
        self.vehicles
            .values_mut()
            .flat_map(|vehicle| vehicle.compartments.iter_mut())
            .find(|compartment| compartment.id == id)
    }

    fn find_item(&self, id: ItemId) -> Option<&Item> {
        self.vehicles
            .values()
            .flat_map(|vehicle| vehicle.compartments.iter())
            .flat_map(|compartment| compartment.items.iter())
            .find(|item| item.id == id)
    }
}

/// Process-local repository guarded by a single mutex.
#[derive(Debug, Default, Clone)]
pub struct MemoryInventoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryInventoryRepository {
    /// Hydrate from imported histories. New identifiers continue after the highest imported one.
    ///
    /// Histories are expected to have passed [`FleetSnapshot::validate`]; records sharing an
    /// identifier replace one another.
    ///
    /// [`FleetSnapshot::validate`]: crate::inventory::FleetSnapshot::validate
    pub fn from_histories(histories: Vec<VehicleHistory>) -> Self {
        let mut state = MemoryState::default();

        for VehicleHistory {
            vehicle,
            inspections,
        } in histories
        {
            state.last_vehicle = state.last_vehicle.max(vehicle.id.0);
            for compartment in &vehicle.compartments {
                state.last_compartment = state.last_compartment.max(compartment.id.0);
                for item in &compartment.items {
                    state.last_item = state.last_item.max(item.id.0);
                }
            }
            for inspection in inspections {
                state.last_inspection = state.last_inspection.max(inspection.id.0);
                state.inspections.insert(inspection.id, inspection);
            }
            state.vehicles.insert(vehicle.id, vehicle);
        }

        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

impl InventoryRepository for MemoryInventoryRepository {
    fn vehicles(&self) -> Result<Vec<Vehicle>, RepositoryError> {
        let guard = self.state()?;
        Ok(guard.vehicles.values().cloned().collect())
    }

    fn vehicle(&self, id: VehicleId) -> Result<Option<Vehicle>, RepositoryError> {
        let guard = self.state()?;
        Ok(guard.vehicles.get(&id).cloned())
    }

    fn insert_vehicle(&self, vehicle: NewVehicle) -> Result<Vehicle, RepositoryError> {
        let mut guard = self.state()?;
        if guard
            .vehicles
            .values()
            .any(|existing| existing.code == vehicle.code)
        {
            return Err(RepositoryError::Conflict);
        }

        guard.last_vehicle += 1;
        let record = Vehicle {
            id: VehicleId(guard.last_vehicle),
            code: vehicle.code,
            name: vehicle.name,
            active: true,
            compartments: Vec::new(),
        };
        guard.vehicles.insert(record.id, record.clone());
        Ok(record)
    }

    fn compartment(&self, id: CompartmentId) -> Result<Option<Compartment>, RepositoryError> {
        let guard = self.state()?;
        Ok(guard.find_compartment(id).cloned())
    }

    fn insert_compartment(
        &self,
        compartment: NewCompartment,
    ) -> Result<Compartment, RepositoryError> {
        let mut guard = self.state()?;
        let next_id = CompartmentId(guard.last_compartment + 1);
        let vehicle = guard
            .vehicles
            .get_mut(&compartment.vehicle_id)
            .ok_or(RepositoryError::NotFound)?;
        if vehicle
            .compartments
            .iter()
            .any(|existing| existing.name == compartment.name)
        {
            return Err(RepositoryError::Conflict);
        }

        let record = Compartment {
            id: next_id,
            vehicle_id: compartment.vehicle_id,
            name: compartment.name,
            display_order: compartment.display_order,
            active: true,
            items: Vec::new(),
        };
        vehicle.compartments.push(record.clone());
        guard.last_compartment = next_id.0;
        Ok(record)
    }

    fn update_compartment(
        &self,
        compartment: Compartment,
    ) -> Result<Compartment, RepositoryError> {
        let mut guard = self.state()?;
        let vehicle = guard
            .vehicles
            .values_mut()
            .find(|vehicle| {
                vehicle
                    .compartments
                    .iter()
                    .any(|existing| existing.id == compartment.id)
            })
            .ok_or(RepositoryError::NotFound)?;
        if vehicle
            .compartments
            .iter()
            .any(|existing| existing.id != compartment.id && existing.name == compartment.name)
        {
            return Err(RepositoryError::Conflict);
        }

        let stored = vehicle
            .compartments
            .iter_mut()
            .find(|existing| existing.id == compartment.id)
            .ok_or(RepositoryError::NotFound)?;
        stored.name = compartment.name;
        stored.display_order = compartment.display_order;
        stored.active = compartment.active;
        Ok(stored.clone())
    }

    fn item(&self, id: ItemId) -> Result<Option<Item>, RepositoryError> {
        let guard = self.state()?;
        Ok(guard.find_item(id).cloned())
    }

    fn insert_item(&self, item: NewItem) -> Result<Item, RepositoryError> {
        let mut guard = self.state()?;
        let next_id = ItemId(guard.last_item + 1);
        let compartment = guard
            .find_compartment_mut(item.compartment_id)
            .ok_or(RepositoryError::NotFound)?;

        let record = Item {
            id: next_id,
            compartment_id: item.compartment_id,
            name: item.name,
            expected_quantity: item.expected_quantity,
            display_order: item.display_order,
            active: true,
        };
        compartment.items.push(record.clone());
        guard.last_item = next_id.0;
        Ok(record)
    }

    fn update_item(&self, item: Item) -> Result<Item, RepositoryError> {
        let mut guard = self.state()?;
        let current = guard.find_item(item.id).ok_or(RepositoryError::NotFound)?;
        let source = current.compartment_id;
        if guard.find_compartment(item.compartment_id).is_none() {
            return Err(RepositoryError::NotFound);
        }

        if let Some(compartment) = guard.find_compartment_mut(source) {
            compartment.items.retain(|existing| existing.id != item.id);
        }
        let target = guard
            .find_compartment_mut(item.compartment_id)
            .ok_or(RepositoryError::NotFound)?;
        target.items.push(item.clone());
        Ok(item)
    }

    fn inspections(&self, vehicle: Option<VehicleId>) -> Result<Vec<Inspection>, RepositoryError> {
        let guard = self.state()?;
        Ok(guard
            .inspections
            .values()
            .filter(|inspection| vehicle.map_or(true, |id| inspection.vehicle_id == id))
            .cloned()
            .collect())
    }

    fn inspection(&self, id: InspectionId) -> Result<Option<Inspection>, RepositoryError> {
        let guard = self.state()?;
        Ok(guard.inspections.get(&id).cloned())
    }

    fn insert_inspection(&self, inspection: NewInspection) -> Result<Inspection, RepositoryError> {
        let mut guard = self.state()?;
        if !guard.vehicles.contains_key(&inspection.vehicle_id) {
            return Err(RepositoryError::NotFound);
        }

        guard.last_inspection += 1;
        let record = Inspection {
            id: InspectionId(guard.last_inspection),
            vehicle_id: inspection.vehicle_id,
            responsible: inspection.responsible,
            performed_at: inspection.performed_at,
            notes: inspection.notes,
            performed_by: inspection.performed_by,
            results: inspection.results,
        };
        guard.inspections.insert(record.id, record.clone());
        Ok(record)
    }

    fn assign_performer(
        &self,
        id: InspectionId,
        user: UserId,
    ) -> Result<Inspection, RepositoryError> {
        let mut guard = self.state()?;
        let inspection = guard
            .inspections
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        if inspection.performed_by.is_some() {
            return Err(RepositoryError::Conflict);
        }
        inspection.performed_by = Some(user);
        Ok(inspection.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::domain::{ItemCheck, ItemResult};
    use chrono::Utc;

    fn seeded() -> (MemoryInventoryRepository, Vehicle, Compartment) {
        let repository = MemoryInventoryRepository::default();
        let vehicle = repository
            .insert_vehicle(NewVehicle {
                code: "PMH-01".to_string(),
                name: "Ambulancia PMH-01".to_string(),
            })
            .expect("vehicle inserts");
        let compartment = repository
            .insert_compartment(NewCompartment {
                vehicle_id: vehicle.id,
                name: "Compartimento Izquierdo".to_string(),
                display_order: 1,
            })
            .expect("compartment inserts");
        (repository, vehicle, compartment)
    }

    #[test]
    fn vehicle_codes_are_unique() {
        let (repository, _, _) = seeded();
        let duplicate = repository.insert_vehicle(NewVehicle {
            code: "PMH-01".to_string(),
            name: String::new(),
        });
        assert!(matches!(duplicate, Err(RepositoryError::Conflict)));
    }

    #[test]
    fn compartment_names_are_unique_per_vehicle() {
        let (repository, vehicle, _) = seeded();
        let duplicate = repository.insert_compartment(NewCompartment {
            vehicle_id: vehicle.id,
            name: "Compartimento Izquierdo".to_string(),
            display_order: 2,
        });
        assert!(matches!(duplicate, Err(RepositoryError::Conflict)));

        let other = repository
            .insert_vehicle(NewVehicle {
                code: "PMH-02".to_string(),
                name: String::new(),
            })
            .expect("vehicle inserts");
        repository
            .insert_compartment(NewCompartment {
                vehicle_id: other.id,
                name: "Compartimento Izquierdo".to_string(),
                display_order: 1,
            })
            .expect("same name allowed on another vehicle");
    }

    #[test]
    fn items_nest_under_their_compartment() {
        let (repository, vehicle, compartment) = seeded();
        let item = repository
            .insert_item(NewItem {
                compartment_id: compartment.id,
                name: "Tabla espinal".to_string(),
                expected_quantity: 1,
                display_order: 1,
            })
            .expect("item inserts");

        let stored = repository
            .vehicle(vehicle.id)
            .expect("read succeeds")
            .expect("vehicle present");
        assert_eq!(stored.expected_item_total(), 1);
        assert_eq!(stored.find_item(item.id), Some(&item));
    }

    #[test]
    fn update_item_moves_between_compartments() {
        let (repository, vehicle, compartment) = seeded();
        let second = repository
            .insert_compartment(NewCompartment {
                vehicle_id: vehicle.id,
                name: "Compartimento Interior".to_string(),
                display_order: 2,
            })
            .expect("compartment inserts");
        let item = repository
            .insert_item(NewItem {
                compartment_id: compartment.id,
                name: "Oxímetro".to_string(),
                expected_quantity: 1,
                display_order: 1,
            })
            .expect("item inserts");

        repository
            .update_item(Item {
                compartment_id: second.id,
                ..item.clone()
            })
            .expect("item moves");

        let stored = repository
            .vehicle(vehicle.id)
            .expect("read succeeds")
            .expect("vehicle present");
        assert_eq!(
            stored.compartment_of(item.id).map(|c| c.id),
            Some(second.id)
        );
        assert_eq!(stored.expected_item_total(), 1);
    }

    #[test]
    fn inspections_are_stored_with_all_results() {
        let (repository, vehicle, _) = seeded();
        let stored = repository
            .insert_inspection(NewInspection {
                vehicle_id: vehicle.id,
                responsible: "Guardia 1".to_string(),
                performed_at: Utc::now(),
                notes: None,
                performed_by: None,
                results: vec![ItemResult {
                    item_id: ItemId(1),
                    check: ItemCheck::Pass,
                    notes: None,
                }],
            })
            .expect("inspection inserts");

        let fetched = repository
            .inspection(stored.id)
            .expect("read succeeds")
            .expect("inspection present");
        assert_eq!(fetched.results.len(), 1);

        let updated = repository
            .assign_performer(stored.id, UserId(9))
            .expect("performer assigned");
        assert_eq!(updated.performed_by, Some(UserId(9)));
    }

    #[test]
    fn hydrated_repository_continues_identifiers() {
        let (source, vehicle, _) = seeded();
        let snapshot = source
            .vehicle(vehicle.id)
            .expect("read succeeds")
            .expect("vehicle present");

        let repository = MemoryInventoryRepository::from_histories(vec![VehicleHistory {
            vehicle: snapshot,
            inspections: Vec::new(),
        }]);
        let next = repository
            .insert_vehicle(NewVehicle {
                code: "ABI-02".to_string(),
                name: String::new(),
            })
            .expect("vehicle inserts");
        assert_eq!(next.id, VehicleId(vehicle.id.0 + 1));
    }

    #[test]
    fn performer_is_only_written_once() {
        let (repository, vehicle, _) = seeded();
        let inspection = repository
            .insert_inspection(NewInspection {
                vehicle_id: vehicle.id,
                responsible: "Guardia 1".to_string(),
                performed_at: Utc::now(),
                notes: None,
                performed_by: None,
                results: Vec::new(),
            })
            .expect("inspection inserts");

        let first = repository
            .assign_performer(inspection.id, UserId(1))
            .expect("first assignment");
        assert_eq!(first.performed_by, Some(UserId(1)));

        let second = repository.assign_performer(inspection.id, UserId(2));
        assert!(matches!(second, Err(RepositoryError::Conflict)));
        assert_eq!(
            repository
                .inspection(inspection.id)
                .expect("read succeeds")
                .expect("inspection present")
                .performed_by,
            Some(UserId(1))
        );
    }
}
