use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::inventory::domain::{CompartmentId, InspectionId, ItemId, VehicleId};
use crate::inventory::status::{validate_history, InvalidInput, VehicleHistory};

/// Fleet catalog and inspection history exported from the station records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetSnapshot {
    #[serde(default)]
    pub vehicles: Vec<VehicleHistory>,
}

impl FleetSnapshot {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotError> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_reader(reader)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Check the catalog and history before they reach a repository.
    ///
    /// Identifiers and vehicle codes are unique across the whole fleet, every record points at
    /// the parent it is nested under, quantities are positive, and every inspection is filed
    /// under its own vehicle and records each of that vehicle's items at most once.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let mut vehicle_ids = HashSet::new();
        let mut codes = HashSet::new();
        let mut compartment_ids = HashSet::new();
        let mut item_ids = HashSet::new();
        let mut inspection_ids = HashSet::new();

        for VehicleHistory {
            vehicle,
            inspections,
        } in &self.vehicles
        {
            if !vehicle_ids.insert(vehicle.id) {
                return Err(CatalogError::DuplicateVehicle { vehicle: vehicle.id }.into());
            }
            if !codes.insert(vehicle.code.as_str()) {
                return Err(CatalogError::DuplicateCode {
                    code: vehicle.code.clone(),
                }
                .into());
            }

            for compartment in &vehicle.compartments {
                if compartment.vehicle_id != vehicle.id {
                    return Err(CatalogError::MisplacedCompartment {
                        compartment: compartment.id,
                        expected: vehicle.id,
                        found: compartment.vehicle_id,
                    }
                    .into());
                }
                if !compartment_ids.insert(compartment.id) {
                    return Err(CatalogError::DuplicateCompartment {
                        compartment: compartment.id,
                    }
                    .into());
                }

                for item in &compartment.items {
                    if item.compartment_id != compartment.id {
                        return Err(CatalogError::MisplacedItem {
                            item: item.id,
                            expected: compartment.id,
                            found: item.compartment_id,
                        }
                        .into());
                    }
                    if !item_ids.insert(item.id) {
                        return Err(CatalogError::DuplicateItem { item: item.id }.into());
                    }
                    if item.expected_quantity == 0 {
                        return Err(CatalogError::ZeroQuantity { item: item.id }.into());
                    }
                }
            }

            validate_history(vehicle, inspections)?;

            for inspection in inspections {
                if !inspection_ids.insert(inspection.id) {
                    return Err(CatalogError::DuplicateInspection {
                        inspection: inspection.id,
                    }
                    .into());
                }
                if let Some(result) = inspection
                    .results
                    .iter()
                    .find(|result| vehicle.find_item(result.item_id).is_none())
                {
                    return Err(CatalogError::UnknownItem {
                        inspection: inspection.id,
                        item: result.item_id,
                    }
                    .into());
                }
            }
        }
        Ok(())
    }

    pub fn find_by_code(&self, code: &str) -> Option<&VehicleHistory> {
        self.vehicles
            .iter()
            .find(|history| history.vehicle.code.eq_ignore_ascii_case(code))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse snapshot: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("inconsistent snapshot: {0}")]
    Inconsistent(#[from] InvalidInput),
    #[error("invalid catalog: {0}")]
    Catalog(#[from] CatalogError),
}

/// Catalog records that cannot be stored as given.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("vehicle {vehicle} appears more than once")]
    DuplicateVehicle { vehicle: VehicleId },
    #[error("vehicle code {code} is used more than once")]
    DuplicateCode { code: String },
    #[error("compartment {compartment} appears more than once")]
    DuplicateCompartment { compartment: CompartmentId },
    #[error("item {item} appears more than once")]
    DuplicateItem { item: ItemId },
    #[error("inspection {inspection} appears more than once")]
    DuplicateInspection { inspection: InspectionId },
    #[error("compartment {compartment} names vehicle {found} but is listed under vehicle {expected}")]
    MisplacedCompartment {
        compartment: CompartmentId,
        expected: VehicleId,
        found: VehicleId,
    },
    #[error("item {item} names compartment {found} but is listed under compartment {expected}")]
    MisplacedItem {
        item: ItemId,
        expected: CompartmentId,
        found: CompartmentId,
    },
    #[error("item {item} must expect a quantity of at least 1")]
    ZeroQuantity { item: ItemId },
    #[error("inspection {inspection} records item {item}, which is not on its vehicle")]
    UnknownItem { inspection: InspectionId, item: ItemId },
}
