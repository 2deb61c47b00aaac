use std::sync::Arc;

use axum::body::Bytes;
use axum::debug_handler;
use axum::extract::{DefaultBodyLimit, Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;
use workout_history::query::{DateRange, Summary};
use workout_history::service::{ImportOutcome, Overview};
use workout_history::timeseries::SeriesPoint;

use crate::error::ApiError;
use crate::middleware::track_requests;
use crate::state::AppState;
use crate::types::{ImportResponse, RangeParams, UploadParams};

type ApiResult<T> = Result<T, ApiError>;

pub fn build_router(state: Arc<AppState>, max_body_size: usize) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/metrics", get(metrics_endpoint))
        .route("/download-history", get(download_history))
        .route("/api/history", get(history_overview))
        .route("/api/import/dat", post(import_dat))
        .route("/api/import/history", post(import_history))
        .route("/api/import/disk", post(import_disk))
        .route("/api/timeseries", get(timeseries))
        .route("/api/summary", get(summary))
        .route_layer(axum::middleware::from_fn(track_requests))
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[debug_handler]
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

#[debug_handler]
async fn metrics_endpoint(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let handle = state
        .metrics
        .as_ref()
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "metrics recorder not installed"))?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], handle.render()))
}

#[debug_handler]
async fn download_history(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let body = state.service.history_csv()?;
    let name = state
        .service
        .config()
        .history_file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("Workout_History.csv");
    let disposition = format!("attachment; filename=\"{name}\"");
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

#[debug_handler]
async fn history_overview(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<Json<Overview>> {
    let params = RangeParams::from_pairs(pairs);
    let overview = state.service.overview(&params.into_overview_query())?;
    Ok(Json(overview))
}

#[debug_handler]
async fn import_dat(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> ApiResult<Json<ImportResponse>> {
    let report = state.service.import_dat(&body, params.filename.as_deref())?;
    Ok(Json(ImportResponse::dat_upload(report)))
}

#[debug_handler]
async fn import_history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> ApiResult<Json<ImportResponse>> {
    let report = state
        .service
        .import_history_csv(&body, params.filename.as_deref())?;
    Ok(Json(ImportResponse::history_upload(report)))
}

#[debug_handler]
async fn import_disk(State(state): State<Arc<AppState>>) -> ApiResult<Json<ImportResponse>> {
    let response = match state.service.import_from_disk()? {
        ImportOutcome::Imported(report) => ImportResponse::disk(report),
        ImportOutcome::NothingToImport => ImportResponse::nothing_to_import(),
    };
    Ok(Json(response))
}

#[debug_handler]
async fn timeseries(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<Json<Vec<SeriesPoint>>> {
    let params = RangeParams::from_pairs(pairs);
    let range = DateRange::parse(params.start_date.as_deref(), params.end_date.as_deref())?;
    let points = state.service.timeseries(params.field_list(), &range)?;
    Ok(Json(points))
}

#[debug_handler]
async fn summary(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> ApiResult<Json<Summary>> {
    let params = RangeParams::from_pairs(pairs);
    let range = DateRange::parse(params.start_date.as_deref(), params.end_date.as_deref())?;
    let summary = state.service.summary(params.field_list(), &range)?;
    Ok(Json(summary))
}
