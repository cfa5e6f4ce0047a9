use brigade_inventory::error::AppError;
use brigade_inventory::inventory::{
    FleetSnapshot, InventoryService, InventoryServiceError, MemoryInventoryRepository,
    RepositoryError, StatusSummary,
};
use clap::Args;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct StatusReportArgs {
    /// Fleet snapshot (JSON) holding vehicles, compartments, items and inspections
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Only consider inspections performed by this responsible party
    #[arg(long)]
    pub(crate) responsible: Option<String>,
    /// Restrict the report to one vehicle code (e.g. ABI-02)
    #[arg(long)]
    pub(crate) vehicle: Option<String>,
}

pub(crate) fn run_status_report(args: StatusReportArgs) -> Result<(), AppError> {
    let StatusReportArgs {
        snapshot,
        responsible,
        vehicle,
    } = args;

    let snapshot = FleetSnapshot::from_path(snapshot)?;
    let selected = match vehicle.as_deref() {
        Some(code) => Some(
            snapshot
                .find_by_code(code)
                .map(|history| history.vehicle.id)
                .ok_or(InventoryServiceError::Repository(RepositoryError::NotFound))?,
        ),
        None => None,
    };

    let service = InventoryService::new(Arc::new(MemoryInventoryRepository::from_histories(
        snapshot.vehicles,
    )));
    let summaries = match selected {
        Some(id) => vec![service.vehicle_status(id, responsible.as_deref())?],
        None => service.fleet_status(responsible.as_deref())?,
    };

    print!("{}", render_status_table(&summaries, responsible.as_deref()));
    Ok(())
}

pub(crate) fn render_status_table(summaries: &[StatusSummary], responsible: Option<&str>) -> String {
    let mut out = String::new();
    let scope = responsible
        .filter(|party| !party.is_empty())
        .unwrap_or("all responsible parties");
    let _ = writeln!(out, "Vehicle status ({scope})");

    if summaries.is_empty() {
        let _ = writeln!(out, "No active vehicles");
        return out;
    }

    for summary in summaries {
        let last = match (&summary.last_inspection_at, &summary.last_inspection_responsible) {
            (Some(at), Some(party)) => format!("{} by {}", at.format("%Y-%m-%d %H:%M"), party),
            _ => "never inspected".to_string(),
        };
        let name = if summary.name.is_empty() {
            String::new()
        } else {
            format!(" {}", summary.name)
        };
        let _ = writeln!(
            out,
            "- {}{}: {} | {}/{} reviewed, {} present, {} missing | last {}",
            summary.code,
            name,
            summary.status.label(),
            summary.reviewed,
            summary.expected_total,
            summary.passed,
            summary.failed,
            last
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use brigade_inventory::inventory::{InspectionStatus, VehicleId};
    use chrono::{TimeZone, Utc};

    fn summary(code: &str, status: InspectionStatus, inspected: bool) -> StatusSummary {
        StatusSummary {
            vehicle_id: VehicleId(1),
            code: code.to_string(),
            name: String::new(),
            status,
            last_inspection_at: inspected.then(|| {
                Utc.with_ymd_and_hms(2025, 4, 3, 7, 45, 0)
                    .single()
                    .expect("valid timestamp")
            }),
            last_inspection_responsible: inspected.then(|| "Guardia 1".to_string()),
            expected_total: 12,
            reviewed: if inspected { 12 } else { 0 },
            passed: if inspected { 11 } else { 0 },
            failed: if inspected { 1 } else { 0 },
        }
    }

    #[test]
    fn renders_one_line_per_vehicle() {
        let table = render_status_table(
            &[
                summary("ABI-02", InspectionStatus::Critical, true),
                summary("PMH-01", InspectionStatus::Pending, false),
            ],
            None,
        );

        assert!(table.starts_with("Vehicle status (all responsible parties)"));
        assert!(table.contains(
            "- ABI-02: Critical | 12/12 reviewed, 11 present, 1 missing | last 2025-04-03 07:45 by Guardia 1"
        ));
        assert!(table.contains("- PMH-01: Pending | 0/12 reviewed"));
        assert!(table.contains("never inspected"));
    }

    #[test]
    fn renders_empty_fleet() {
        let table = render_status_table(&[], Some("Guardia 2"));
        assert!(table.contains("Vehicle status (Guardia 2)"));
        assert!(table.contains("No active vehicles"));
    }
}
