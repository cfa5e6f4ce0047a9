use brigade_inventory::error::AppError;
use brigade_inventory::inventory::{FleetSnapshot, MemoryInventoryRepository};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Builds the in-memory inventory, hydrated from a fleet snapshot when one is configured.
pub(crate) fn load_repository(
    snapshot: Option<&Path>,
) -> Result<MemoryInventoryRepository, AppError> {
    let Some(path) = snapshot else {
        return Ok(MemoryInventoryRepository::default());
    };

    let snapshot = FleetSnapshot::from_path(path)?;
    let inspections: usize = snapshot
        .vehicles
        .iter()
        .map(|history| history.inspections.len())
        .sum();
    info!(
        path = %path.display(),
        vehicles = snapshot.vehicles.len(),
        inspections,
        "fleet snapshot loaded"
    );

    Ok(MemoryInventoryRepository::from_histories(snapshot.vehicles))
}

#[cfg(test)]
mod tests {
    use super::*;
    use brigade_inventory::inventory::{InventoryRepository, SnapshotError};
    use std::io::Write;

    #[test]
    fn empty_repository_without_snapshot() {
        let repository = load_repository(None).expect("repository builds");
        assert!(repository.vehicles().expect("read succeeds").is_empty());
    }

    #[test]
    fn hydrates_repository_from_snapshot_file() {
        let path = std::env::temp_dir().join(format!(
            "brigade-inventory-infra-{}.json",
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).expect("temp file");
        write!(
            file,
            r#"{{"vehicles":[{{"vehicle":{{"id":3,"code":"PMH-01","name":"Primera Multiuso"}}}}]}}"#
        )
        .expect("snapshot written");
        drop(file);

        let repository = load_repository(Some(path.as_path())).expect("snapshot loads");
        let _ = std::fs::remove_file(&path);

        let vehicles = repository.vehicles().expect("read succeeds");
        assert_eq!(vehicles.len(), 1);
        assert_eq!(vehicles[0].code, "PMH-01");
    }

    #[test]
    fn missing_snapshot_is_an_error() {
        let err = load_repository(Some(Path::new("/nonexistent/brigade/fleet.json")))
            .expect_err("missing file");
        assert!(matches!(err, AppError::Snapshot(SnapshotError::Io(_))));
    }
}
