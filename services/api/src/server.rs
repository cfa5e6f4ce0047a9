use crate::cli::ServeArgs;
use crate::infra::{load_repository, AppState};
use crate::routes::with_inventory_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use brigade_inventory::config::AppConfig;
use brigade_inventory::error::AppError;
use brigade_inventory::inventory::InventoryService;
use brigade_inventory::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(snapshot) = args.snapshot.take() {
        config.inventory.snapshot_path = Some(snapshot);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(load_repository(
        config.inventory.snapshot_path.as_deref(),
    )?);
    let inventory_service = Arc::new(InventoryService::new(repository));

    let app = with_inventory_routes(inventory_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "brigade inventory service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
