use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{Inspection, InspectionId, ItemCheck, ItemId, UserId, Vehicle, VehicleId};
use super::status::{CheckTally, InspectionStatus};

/// Inspection as exposed to API clients, with its computed status and counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectionView {
    pub id: InspectionId,
    pub vehicle_id: VehicleId,
    pub vehicle_code: String,
    pub vehicle_name: String,
    pub responsible: String,
    pub performed_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub performed_by: Option<UserId>,
    pub results: Vec<ItemResultView>,
    pub status: InspectionStatus,
    pub reviewed: usize,
    pub passed: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemResultView {
    pub item_id: ItemId,
    pub item_name: Option<String>,
    pub compartment_name: Option<String>,
    pub check: ItemCheck,
    pub check_label: &'static str,
    pub notes: Option<String>,
}

impl InspectionView {
    /// `vehicle` supplies item and compartment names; results whose item is unknown keep
    /// their id only.
    pub fn build(inspection: &Inspection, vehicle: Option<&Vehicle>) -> Self {
        let tally = CheckTally::from_checks(inspection.checks());

        let results = inspection
            .results
            .iter()
            .map(|result| ItemResultView {
                item_id: result.item_id,
                item_name: vehicle
                    .and_then(|vehicle| vehicle.find_item(result.item_id))
                    .map(|item| item.name.clone()),
                compartment_name: vehicle
                    .and_then(|vehicle| vehicle.compartment_of(result.item_id))
                    .map(|compartment| compartment.name.clone()),
                check: result.check,
                check_label: result.check.label(),
                notes: result.notes.clone(),
            })
            .collect();

        Self {
            id: inspection.id,
            vehicle_id: inspection.vehicle_id,
            vehicle_code: vehicle.map(|v| v.code.clone()).unwrap_or_default(),
            vehicle_name: vehicle.map(|v| v.name.clone()).unwrap_or_default(),
            responsible: inspection.responsible.clone(),
            performed_at: inspection.performed_at,
            notes: inspection.notes.clone(),
            performed_by: inspection.performed_by,
            results,
            status: tally.status(),
            reviewed: tally.reviewed,
            passed: tally.passed,
            failed: tally.failed,
        }
    }
}
