use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryCardStore, InMemoryPointsSystemStore};
use crate::routes::{with_service_routes, AdminContext};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use hk_card_compare::config::AppConfig;
use hk_card_compare::error::AppError;
use hk_card_compare::rewards::{RewardsService, TransactionRegistry};
use hk_card_compare::telemetry;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let cards = Arc::new(InMemoryCardStore::default());
    let systems = Arc::new(InMemoryPointsSystemStore::default());
    let service = Arc::new(RewardsService::new(
        Arc::clone(&cards),
        Arc::clone(&systems),
        TransactionRegistry::builtin(),
    ));
    let context = AdminContext {
        cards,
        systems,
        service,
    };

    let app = with_service_routes(context)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "card comparison service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
