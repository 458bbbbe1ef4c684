use crate::infra::{deserialize_optional_date, AppState, InMemoryCardStore, InMemoryPointsSystemStore};
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

use hk_card_compare::rewards::{
    rewards_router, CardId, Conversion, MetaValue, PointsSystemRepository, RepositoryError,
    RewardsService, SystemStatus,
};

/// Everything the authoring endpoints need: the concrete stores plus the
/// service facade that recomputes cards after a save.
#[derive(Clone)]
pub(crate) struct AdminContext {
    pub(crate) cards: Arc<InMemoryCardStore>,
    pub(crate) systems: Arc<InMemoryPointsSystemStore>,
    pub(crate) service: Arc<RewardsService<InMemoryCardStore, InMemoryPointsSystemStore>>,
}

/// The full route table: the library's listing/display/recalculate surface
/// plus health probes and the points-system authoring endpoints.
pub(crate) fn with_service_routes(context: AdminContext) -> Router {
    rewards_router(Arc::clone(&context.service))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/points-systems", post(create_system_endpoint))
        .route(
            "/api/v1/points-systems/:system_id",
            get(get_system_endpoint)
                .put(update_system_endpoint)
                .delete(delete_system_endpoint),
        )
        .route(
            "/api/v1/points-systems/:system_id/conversions",
            put(replace_conversions_endpoint),
        )
        .route("/api/v1/cards/:card_id/meta", put(upsert_card_endpoint))
        .layer(Extension(context))
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

/// One conversion row as the authoring form posts it.
#[derive(Debug, Deserialize)]
pub(crate) struct ConversionPayload {
    reward_type: String,
    points_required: i64,
    reward_value: f64,
    #[serde(default = "default_currency")]
    reward_currency: String,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    effective_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    expiry_date: Option<NaiveDate>,
}

fn default_currency() -> String {
    "HKD".to_string()
}

impl From<ConversionPayload> for Conversion {
    fn from(payload: ConversionPayload) -> Self {
        Conversion {
            reward_type: payload.reward_type,
            points_required: payload.points_required,
            reward_value: payload.reward_value,
            reward_currency: payload.reward_currency,
            effective_date: payload.effective_date,
            expiry_date: payload.expiry_date,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateSystemRequest {
    name: String,
    #[serde(default)]
    name_en: String,
    #[serde(default)]
    conversions: Vec<ConversionPayload>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpdateSystemRequest {
    name: String,
    #[serde(default)]
    name_en: String,
    #[serde(default = "default_status")]
    status: SystemStatus,
}

fn default_status() -> SystemStatus {
    SystemStatus::Active
}

pub(crate) async fn create_system_endpoint(
    Extension(context): Extension<AdminContext>,
    Json(payload): Json<CreateSystemRequest>,
) -> Response {
    let id = context.systems.create_system(payload.name, payload.name_en);
    let rows: Vec<Conversion> = payload.conversions.into_iter().map(Into::into).collect();
    if let Err(error) = context.systems.replace_conversions(id, rows) {
        return repository_error_response(error);
    }

    (StatusCode::CREATED, Json(json!({ "id": id }))).into_response()
}

pub(crate) async fn get_system_endpoint(
    Extension(context): Extension<AdminContext>,
    Path(system_id): Path<u64>,
) -> Response {
    let system = match context.systems.get_system(system_id) {
        Ok(Some(system)) => system,
        Ok(None) => return repository_error_response(RepositoryError::NotFound),
        Err(error) => return repository_error_response(error),
    };
    let conversions = match context.systems.list_conversions(system_id) {
        Ok(rows) => rows,
        Err(error) => return repository_error_response(error),
    };

    let payload = json!({
        "system": system,
        "conversions": conversions,
    });
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) async fn update_system_endpoint(
    Extension(context): Extension<AdminContext>,
    Path(system_id): Path<u64>,
    Json(payload): Json<UpdateSystemRequest>,
) -> Response {
    match context
        .systems
        .update_system(system_id, payload.name, payload.name_en, payload.status)
    {
        Ok(()) => (StatusCode::OK, Json(json!({ "id": system_id }))).into_response(),
        Err(error) => repository_error_response(error),
    }
}

pub(crate) async fn delete_system_endpoint(
    Extension(context): Extension<AdminContext>,
    Path(system_id): Path<u64>,
) -> Response {
    match context.systems.delete_system(system_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => repository_error_response(error),
    }
}

pub(crate) async fn replace_conversions_endpoint(
    Extension(context): Extension<AdminContext>,
    Path(system_id): Path<u64>,
    Json(payload): Json<Vec<ConversionPayload>>,
) -> Response {
    let rows: Vec<Conversion> = payload.into_iter().map(Into::into).collect();
    match context.systems.replace_conversions(system_id, rows) {
        Ok(()) => (StatusCode::OK, Json(json!({ "id": system_id }))).into_response(),
        Err(error) => repository_error_response(error),
    }
}

/// Card save: store the posted attributes, then run the same write-through
/// recalculation the admin save hook runs.
pub(crate) async fn upsert_card_endpoint(
    Extension(context): Extension<AdminContext>,
    Path(card_id): Path<u64>,
    Json(meta): Json<BTreeMap<String, MetaValue>>,
) -> Response {
    let card = CardId(card_id);
    context.cards.upsert(card, meta);

    match context.service.recalculate(card) {
        Ok(computed) => {
            let payload = json!({
                "card_id": card_id,
                "fields": computed.fields,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

fn repository_error_response(error: RepositoryError) -> Response {
    match error {
        RepositoryError::NotFound => {
            let payload = json!({ "error": "points system not found" });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        other => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
