use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use brigade_inventory::error::AppError;
use brigade_inventory::inventory::{
    inventory_router, resolve_fleet, FleetSnapshot, InventoryRepository, InventoryService,
    SnapshotError, StatusSummary,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Ad-hoc status request over a fleet that is not loaded into the service.
#[derive(Debug, Deserialize)]
pub(crate) struct SnapshotStatusRequest {
    pub(crate) snapshot: FleetSnapshot,
    #[serde(default)]
    pub(crate) responsible: Option<String>,
}

pub(crate) fn with_inventory_routes<R>(service: Arc<InventoryService<R>>) -> axum::Router
where
    R: InventoryRepository + 'static,
{
    inventory_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/snapshot/status",
            axum::routing::post(snapshot_status_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn snapshot_status_endpoint(
    Json(payload): Json<SnapshotStatusRequest>,
) -> Result<Json<Vec<StatusSummary>>, AppError> {
    let SnapshotStatusRequest {
        snapshot,
        responsible,
    } = payload;

    snapshot.validate()?;
    let summaries = resolve_fleet(&snapshot.vehicles, responsible.as_deref())
        .map_err(SnapshotError::from)?;

    Ok(Json(summaries))
}
