// HTTP request handlers
use crate::application::plot_service::PlotRequest;
use crate::application::snapshot_service::MeasureInput;
use crate::domain::measures::{InterpolationOption, MeasureSpec, ParamName};
use crate::domain::snapshot::Snapshot;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use crate::presentation::error::AppError;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Deserialize)]
pub struct InterpolationQuery {
    pub param: ParamName,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSnapshotRequest {
    pub user_id: String,
    #[serde(default)]
    pub measures: BTreeMap<String, MeasureInput>,
}

/// JSON body, Brotli-compressed when the client accepts it
async fn encoded<T: Serialize>(data: &T, headers: &HeaderMap) -> Response {
    match json_response(data, accepts_brotli(headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// List all measures, or those matching `?q=`
pub async fn list_measures(
    Query(query): Query<SearchQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let measures = state.measure_service.list_measures(query.q.as_deref());
    tracing::debug!("Listing {} measures for query {:?}", measures.len(), query.q);
    encoded(&measures, &headers).await
}

pub async fn get_measure(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<MeasureSpec>, AppError> {
    Ok(Json(state.measure_service.get_measure(&id)?))
}

/// Sibling measures that can stand in for `id` along one parameter
pub async fn list_interpolation_options(
    Path(id): Path<String>,
    Query(query): Query<InterpolationQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<InterpolationOption>>, AppError> {
    Ok(Json(
        state
            .measure_service
            .interpolation_options(&id, query.param)?,
    ))
}

pub async fn create_snapshot(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateSnapshotRequest>,
) -> Result<(StatusCode, Json<Snapshot>), AppError> {
    let snapshot = state
        .snapshot_service
        .create_snapshot(request.user_id, request.measures.into_iter().collect())
        .await?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

pub async fn get_snapshot(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Snapshot>, AppError> {
    Ok(Json(state.snapshot_service.get_snapshot(&id).await?))
}

pub async fn put_measure(
    Path((id, measure_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    Json(input): Json<MeasureInput>,
) -> Result<Json<Snapshot>, AppError> {
    Ok(Json(
        state
            .snapshot_service
            .update_measure(&id, &measure_id, input)
            .await?,
    ))
}

pub async fn delete_measure(
    Path((id, measure_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Snapshot>, AppError> {
    Ok(Json(
        state
            .snapshot_service
            .delete_measure(&id, &measure_id)
            .await?,
    ))
}

/// Dotplot or heatmap for the filtered population
pub async fn create_plot(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(request): Json<PlotRequest>,
) -> Result<Response, AppError> {
    let plot = state.plot_service.plot(&request).await?;
    Ok(encoded(&plot, &headers).await)
}

pub async fn report_card(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    let card = state.plot_service.report_card(&id).await?;
    Ok(encoded(&card, &headers).await)
}
