use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::ranking::{RankRequest, SortOrder};

use super::domain::{CardId, ViewMode};
use super::repository::{CardRepository, PointsSystemRepository, RepositoryError};
use super::service::{RewardsService, RewardsServiceError};

/// Router builder exposing the engine to the listing and admin-save layers.
pub fn rewards_router<C, P>(service: Arc<RewardsService<C, P>>) -> Router
where
    C: CardRepository + 'static,
    P: PointsSystemRepository + 'static,
{
    Router::new()
        .route("/api/v1/cards/listing", post(listing_handler::<C, P>))
        .route(
            "/api/v1/cards/:card_id/recalculate",
            post(recalculate_handler::<C, P>),
        )
        .route(
            "/api/v1/cards/:card_id/rewards/:transaction_type",
            get(display_handler::<C, P>),
        )
        .with_state(service)
}

/// Listing request mirroring the front-end filter widget: optional explicit
/// sort, otherwise the recommendation heuristic.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListingPayload {
    #[serde(default)]
    sort: Option<String>,
    #[serde(default)]
    order: SortOrder,
    #[serde(default)]
    view: ViewMode,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DisplayQuery {
    #[serde(default)]
    view: ViewMode,
}

pub(crate) async fn listing_handler<C, P>(
    State(service): State<Arc<RewardsService<C, P>>>,
    Json(payload): Json<ListingPayload>,
) -> Response
where
    C: CardRepository + 'static,
    P: PointsSystemRepository + 'static,
{
    let request = RankRequest {
        sort_field: payload.sort,
        order: payload.order,
    };

    match service.ranked_listing(&request, payload.view) {
        Ok(listing) => (StatusCode::OK, Json(listing)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn recalculate_handler<C, P>(
    State(service): State<Arc<RewardsService<C, P>>>,
    Path(card_id): Path<u64>,
) -> Response
where
    C: CardRepository + 'static,
    P: PointsSystemRepository + 'static,
{
    match service.recalculate(CardId(card_id)) {
        Ok(computed) => {
            let payload = json!({
                "card_id": card_id,
                "fields": computed.fields,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn display_handler<C, P>(
    State(service): State<Arc<RewardsService<C, P>>>,
    Path((card_id, transaction_type)): Path<(u64, String)>,
    Query(query): Query<DisplayQuery>,
) -> Response
where
    C: CardRepository + 'static,
    P: PointsSystemRepository + 'static,
{
    match service.display(CardId(card_id), &transaction_type, query.view) {
        Ok(value) => {
            let payload = json!({
                "card_id": card_id,
                "transaction_type": transaction_type,
                "view": query.view.as_str(),
                "value": value,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

fn error_response(error: RewardsServiceError) -> Response {
    match error {
        RewardsServiceError::Repository(RepositoryError::NotFound) => {
            let payload = json!({ "error": "card not found" });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        other => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
