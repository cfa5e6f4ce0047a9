use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use super::domain::{CompartmentId, InspectionId, ItemId, UserId, VehicleId};
use super::repository::{
    InventoryRepository, NewCompartment, NewItem, NewVehicle, RepositoryError,
};
use super::service::{
    CompartmentUpdate, InspectionFilter, InspectionSubmission, InventoryService,
    InventoryServiceError, ItemFilter, ItemUpdate, ValidationError,
};

type SharedService<R> = State<Arc<InventoryService<R>>>;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StatusQuery {
    #[serde(default)]
    pub(crate) responsible: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CompartmentQuery {
    #[serde(default)]
    pub(crate) vehicle: Option<VehicleId>,
}

#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct PerformerPayload {
    pub(crate) user_id: UserId,
}

/// Router builder exposing catalog, inspection and status endpoints.
pub fn inventory_router<R>(service: Arc<InventoryService<R>>) -> Router
where
    R: InventoryRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/vehicles",
            get(vehicles_handler::<R>).post(register_vehicle_handler::<R>),
        )
        .route("/api/v1/vehicles/:vehicle_id", get(vehicle_handler::<R>))
        .route(
            "/api/v1/vehicles/:vehicle_id/status",
            get(vehicle_status_handler::<R>),
        )
        .route("/api/v1/fleet/status", get(fleet_status_handler::<R>))
        .route(
            "/api/v1/compartments",
            get(compartments_handler::<R>).post(add_compartment_handler::<R>),
        )
        .route(
            "/api/v1/compartments/:compartment_id",
            get(compartment_handler::<R>)
                .put(update_compartment_handler::<R>)
                .delete(retire_compartment_handler::<R>),
        )
        .route(
            "/api/v1/items",
            get(items_handler::<R>).post(add_item_handler::<R>),
        )
        .route(
            "/api/v1/items/:item_id",
            get(item_handler::<R>)
                .put(update_item_handler::<R>)
                .delete(retire_item_handler::<R>),
        )
        .route(
            "/api/v1/inspections",
            get(inspections_handler::<R>).post(record_inspection_handler::<R>),
        )
        .route(
            "/api/v1/inspections/:inspection_id",
            get(inspection_handler::<R>),
        )
        .route(
            "/api/v1/inspections/:inspection_id/performer",
            put(assign_performer_handler::<R>),
        )
        .with_state(service)
}

fn respond<T: Serialize>(status: StatusCode, result: Result<T, InventoryServiceError>) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) fn error_response(err: InventoryServiceError) -> Response {
    let status = match &err {
        InventoryServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        InventoryServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        InventoryServiceError::Validation(ValidationError::PerformerAlreadyAssigned { .. }) => {
            StatusCode::CONFLICT
        }
        InventoryServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        InventoryServiceError::Repository(RepositoryError::Unavailable(_))
        | InventoryServiceError::InvalidInput(_) => {
            error!(error = %err, "inventory request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": err.to_string() });
    (status, Json(payload)).into_response()
}

pub(crate) async fn vehicles_handler<R>(State(service): SharedService<R>) -> Response
where
    R: InventoryRepository + 'static,
{
    respond(StatusCode::OK, service.vehicles())
}

pub(crate) async fn register_vehicle_handler<R>(
    State(service): SharedService<R>,
    Json(vehicle): Json<NewVehicle>,
) -> Response
where
    R: InventoryRepository + 'static,
{
    respond(StatusCode::CREATED, service.register_vehicle(vehicle))
}

pub(crate) async fn vehicle_handler<R>(
    State(service): SharedService<R>,
    Path(vehicle_id): Path<u64>,
) -> Response
where
    R: InventoryRepository + 'static,
{
    respond(StatusCode::OK, service.vehicle(VehicleId(vehicle_id)))
}

pub(crate) async fn vehicle_status_handler<R>(
    State(service): SharedService<R>,
    Path(vehicle_id): Path<u64>,
    Query(query): Query<StatusQuery>,
) -> Response
where
    R: InventoryRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.vehicle_status(VehicleId(vehicle_id), query.responsible.as_deref()),
    )
}

pub(crate) async fn fleet_status_handler<R>(
    State(service): SharedService<R>,
    Query(query): Query<StatusQuery>,
) -> Response
where
    R: InventoryRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.fleet_status(query.responsible.as_deref()),
    )
}

pub(crate) async fn compartments_handler<R>(
    State(service): SharedService<R>,
    Query(query): Query<CompartmentQuery>,
) -> Response
where
    R: InventoryRepository + 'static,
{
    respond(StatusCode::OK, service.compartments(query.vehicle))
}

pub(crate) async fn compartment_handler<R>(
    State(service): SharedService<R>,
    Path(compartment_id): Path<u64>,
) -> Response
where
    R: InventoryRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.compartment(CompartmentId(compartment_id)),
    )
}

pub(crate) async fn add_compartment_handler<R>(
    State(service): SharedService<R>,
    Json(compartment): Json<NewCompartment>,
) -> Response
where
    R: InventoryRepository + 'static,
{
    respond(StatusCode::CREATED, service.add_compartment(compartment))
}

pub(crate) async fn update_compartment_handler<R>(
    State(service): SharedService<R>,
    Path(compartment_id): Path<u64>,
    Json(update): Json<CompartmentUpdate>,
) -> Response
where
    R: InventoryRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.update_compartment(CompartmentId(compartment_id), update),
    )
}

pub(crate) async fn retire_compartment_handler<R>(
    State(service): SharedService<R>,
    Path(compartment_id): Path<u64>,
) -> Response
where
    R: InventoryRepository + 'static,
{
    match service.retire_compartment(CompartmentId(compartment_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn items_handler<R>(
    State(service): SharedService<R>,
    Query(filter): Query<ItemFilter>,
) -> Response
where
    R: InventoryRepository + 'static,
{
    respond(StatusCode::OK, service.items(&filter))
}

pub(crate) async fn item_handler<R>(
    State(service): SharedService<R>,
    Path(item_id): Path<u64>,
) -> Response
where
    R: InventoryRepository + 'static,
{
    respond(StatusCode::OK, service.item(ItemId(item_id)))
}

pub(crate) async fn add_item_handler<R>(
    State(service): SharedService<R>,
    Json(item): Json<NewItem>,
) -> Response
where
    R: InventoryRepository + 'static,
{
    respond(StatusCode::CREATED, service.add_item(item))
}

pub(crate) async fn update_item_handler<R>(
    State(service): SharedService<R>,
    Path(item_id): Path<u64>,
    Json(update): Json<ItemUpdate>,
) -> Response
where
    R: InventoryRepository + 'static,
{
    respond(StatusCode::OK, service.update_item(ItemId(item_id), update))
}

pub(crate) async fn retire_item_handler<R>(
    State(service): SharedService<R>,
    Path(item_id): Path<u64>,
) -> Response
where
    R: InventoryRepository + 'static,
{
    match service.retire_item(ItemId(item_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn inspections_handler<R>(
    State(service): SharedService<R>,
    Query(filter): Query<InspectionFilter>,
) -> Response
where
    R: InventoryRepository + 'static,
{
    respond(StatusCode::OK, service.inspections(&filter))
}

pub(crate) async fn inspection_handler<R>(
    State(service): SharedService<R>,
    Path(inspection_id): Path<u64>,
) -> Response
where
    R: InventoryRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.inspection(InspectionId(inspection_id)),
    )
}

pub(crate) async fn record_inspection_handler<R>(
    State(service): SharedService<R>,
    Json(submission): Json<InspectionSubmission>,
) -> Response
where
    R: InventoryRepository + 'static,
{
    respond(
        StatusCode::CREATED,
        service.record_inspection(submission, None),
    )
}

pub(crate) async fn assign_performer_handler<R>(
    State(service): SharedService<R>,
    Path(inspection_id): Path<u64>,
    Json(payload): Json<PerformerPayload>,
) -> Response
where
    R: InventoryRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.assign_performer(InspectionId(inspection_id), payload.user_id),
    )
}
