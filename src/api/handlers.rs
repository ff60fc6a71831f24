use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{CustomerId, Recommendations},
};

use super::AppState;

// Request/Response types

/// Query parameters of the recommendations endpoint
///
/// Both fields are optional at the extractor level so that missing values
/// are reported as `InvalidRequest` by the service instead of a rejection.
#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub customer_id: Option<String>,
    pub delivery_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub generation: u64,
    pub loaded_at: DateTime<Utc>,
}

fn parse_delivery_date(raw: Option<&str>) -> AppResult<Option<NaiveDate>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|e| {
                AppError::InvalidRequest(format!(
                    "delivery_date must be YYYY-MM-DD, got {:?}: {}",
                    s, e
                ))
            }),
    }
}

// Handlers

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let generation = state.snapshots().generation().await;
    (
        StatusCode::OK,
        Json(json!({ "status": "healthy", "generation": generation })),
    )
}

/// Known customer ids for the dashboard selector
pub async fn list_customers(State(state): State<AppState>) -> AppResult<Json<Vec<CustomerId>>> {
    let ids = state.recommendations.list_customer_ids().await?;
    Ok(Json(ids))
}

/// Popular, personalized and similar-customer lists for one customer
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<RecommendationQuery>,
) -> AppResult<Json<Recommendations>> {
    tracing::info!(
        request_id = %request_id,
        customer_id = ?query.customer_id,
        delivery_date = ?query.delivery_date,
        "Processing recommendation request"
    );

    let delivery_date = parse_delivery_date(query.delivery_date.as_deref())?;
    let recommendations = state
        .recommendations
        .recommend(query.customer_id.as_deref(), delivery_date)
        .await?;

    tracing::info!(
        request_id = %request_id,
        generation = recommendations.generation,
        personalized_cold_start = recommendations.personalized_source.is_cold_start(),
        similar_cold_start = recommendations.similar_source.is_cold_start(),
        "Recommendations served"
    );

    Ok(Json(recommendations))
}

/// Reloads the catalog snapshot
pub async fn refresh_snapshot(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<RefreshResponse>> {
    tracing::info!(request_id = %request_id, "Snapshot refresh requested");

    let snapshot = state.loader.refresh().await?;

    Ok(Json(RefreshResponse {
        generation: snapshot.generation(),
        loaded_at: snapshot.loaded_at(),
    }))
}
