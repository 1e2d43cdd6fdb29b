use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::database::entities::measurements;
use crate::errors::CoreError;
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::services::{
    CreateMeasurement, MeasurementFilter, MeasurementService, QueryService, UpdateMeasurement,
    DEFAULT_LIMIT,
};

/// Query string for the filtered listing. `series_ids` is a comma-separated
/// id list; absent or empty means "select none" and returns nothing.
#[derive(Deserialize)]
pub struct MeasurementQuery {
    pub series_ids: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<u64>,
}

fn parse_series_ids(raw: Option<&str>) -> Result<Vec<i32>, CoreError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i32>().map_err(|_| {
                CoreError::invalid_field(
                    "series_ids",
                    "must be a comma-separated list of integer ids",
                )
            })
        })
        .collect()
}

fn parse_instant(field: &'static str, raw: &str) -> Result<DateTime<Utc>, CoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|_| {
            CoreError::invalid_field(field, "must be an RFC 3339 date-time")
        })
}

pub async fn list_measurements(
    State(state): State<AppState>,
    Query(params): Query<MeasurementQuery>,
) -> Result<Json<Vec<measurements::Model>>, ApiError> {
    let mut filter = MeasurementFilter::new(parse_series_ids(params.series_ids.as_deref())?);

    if let Some(raw) = &params.start_date {
        filter.start = Some(parse_instant("start_date", raw)?);
    }
    if let Some(raw) = &params.end_date {
        filter.end = Some(parse_instant("end_date", raw)?);
    }
    filter.limit = params.limit.unwrap_or(DEFAULT_LIMIT);

    let measurements = QueryService::new(state.db).query(&filter).await?;
    Ok(Json(measurements))
}

pub async fn get_measurement(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<measurements::Model>, ApiError> {
    let measurement = MeasurementService::new(state.db).get(id).await?;
    Ok(Json(measurement))
}

pub async fn create_measurement(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateMeasurement>,
) -> Result<(StatusCode, Json<measurements::Model>), ApiError> {
    state.auth.require_admin(&headers)?;

    let measurement = MeasurementService::new(state.db).create(payload).await?;
    Ok((StatusCode::CREATED, Json(measurement)))
}

pub async fn update_measurement(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateMeasurement>,
) -> Result<Json<measurements::Model>, ApiError> {
    state.auth.require_admin(&headers)?;

    let measurement = MeasurementService::new(state.db).update(id, payload).await?;
    Ok(Json(measurement))
}

pub async fn delete_measurement(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    state.auth.require_admin(&headers)?;

    MeasurementService::new(state.db).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
