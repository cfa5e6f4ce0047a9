use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::inventory::domain::{Inspection, Vehicle, VehicleId};
use super::evaluator::{CheckTally, InspectionStatus};
use super::InvalidInput;

/// A vehicle together with its full inspection history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleHistory {
    pub vehicle: Vehicle,
    #[serde(default)]
    pub inspections: Vec<Inspection>,
}

/// Current status of a vehicle plus the counters shown on the fleet dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub vehicle_id: VehicleId,
    pub code: String,
    pub name: String,
    pub status: InspectionStatus,
    pub last_inspection_at: Option<DateTime<Utc>>,
    pub last_inspection_responsible: Option<String>,
    pub expected_total: usize,
    pub reviewed: usize,
    pub passed: usize,
    pub failed: usize,
}

/// Check that every inspection belongs to `vehicle` and records each item at most once.
pub fn validate_history(vehicle: &Vehicle, inspections: &[Inspection]) -> Result<(), InvalidInput> {
    for inspection in inspections {
        if inspection.vehicle_id != vehicle.id {
            return Err(InvalidInput::ForeignInspection {
                inspection: inspection.id,
                expected: vehicle.id,
                found: inspection.vehicle_id,
            });
        }

        let mut seen = HashSet::with_capacity(inspection.results.len());
        for result in &inspection.results {
            if !seen.insert(result.item_id) {
                return Err(InvalidInput::DuplicateItemResult {
                    inspection: inspection.id,
                    item: result.item_id,
                });
            }
        }
    }
    Ok(())
}

/// Resolve the current status of `vehicle` from its inspection history.
///
/// The latest inspection wins, optionally restricted to one responsible party (an empty
/// filter means no restriction). Inspections sharing a timestamp are ordered by id, so the
/// most recently inserted one is selected. `inspections` may be given in any order.
pub fn resolve_status(
    vehicle: &Vehicle,
    inspections: &[Inspection],
    responsible: Option<&str>,
) -> Result<StatusSummary, InvalidInput> {
    validate_history(vehicle, inspections)?;

    let responsible = responsible.filter(|party| !party.is_empty());
    let latest = inspections
        .iter()
        .filter(|inspection| responsible.map_or(true, |party| inspection.responsible == party))
        .max_by(|a, b| {
            a.performed_at
                .cmp(&b.performed_at)
                .then_with(|| a.id.cmp(&b.id))
        });

    let tally = latest
        .map(|inspection| CheckTally::from_checks(inspection.checks()))
        .unwrap_or_default();

    Ok(StatusSummary {
        vehicle_id: vehicle.id,
        code: vehicle.code.clone(),
        name: vehicle.name.clone(),
        status: tally.status(),
        last_inspection_at: latest.map(|inspection| inspection.performed_at),
        last_inspection_responsible: latest.map(|inspection| inspection.responsible.clone()),
        expected_total: vehicle.expected_item_total(),
        reviewed: tally.reviewed,
        passed: tally.passed,
        failed: tally.failed,
    })
}

/// Resolve every active vehicle independently, ordered by vehicle code.
pub fn resolve_fleet(
    histories: &[VehicleHistory],
    responsible: Option<&str>,
) -> Result<Vec<StatusSummary>, InvalidInput> {
    let mut active: Vec<&VehicleHistory> = histories
        .iter()
        .filter(|history| history.vehicle.active)
        .collect();
    active.sort_by(|a, b| a.vehicle.code.cmp(&b.vehicle.code));

    active
        .into_iter()
        .map(|history| resolve_status(&history.vehicle, &history.inspections, responsible))
        .collect()
}
