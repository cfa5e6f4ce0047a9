//! Status aggregation for inspections and vehicles.
//!
//! Everything in here is a pure function over caller-supplied snapshots. Storage access,
//! logging and retries belong to the service layer.

mod evaluator;
mod resolver;

pub use evaluator::{classify, CheckTally, InspectionStatus};
pub use resolver::{resolve_fleet, resolve_status, validate_history, StatusSummary, VehicleHistory};

use super::domain::{InspectionId, ItemId, VehicleId};

/// Contract violation by the caller of the status engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidInput {
    #[error("inspection {inspection} belongs to vehicle {found}, not vehicle {expected}")]
    ForeignInspection {
        inspection: InspectionId,
        expected: VehicleId,
        found: VehicleId,
    },
    #[error("inspection {inspection} records item {item} more than once")]
    DuplicateItemResult {
        inspection: InspectionId,
        item: ItemId,
    },
}
