use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};

use crate::database::entities::series;
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::services::{CreateSeries, SeriesService, UpdateSeries};

pub async fn list_series(
    State(state): State<AppState>,
) -> Result<Json<Vec<series::Model>>, ApiError> {
    let series = SeriesService::new(state.db).list().await?;
    Ok(Json(series))
}

pub async fn get_series(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<series::Model>, ApiError> {
    let series = SeriesService::new(state.db).get(id).await?;
    Ok(Json(series))
}

pub async fn create_series(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateSeries>,
) -> Result<(StatusCode, Json<series::Model>), ApiError> {
    state.auth.require_admin(&headers)?;

    let series = SeriesService::new(state.db).create(payload).await?;
    Ok((StatusCode::CREATED, Json(series)))
}

pub async fn update_series(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateSeries>,
) -> Result<Json<series::Model>, ApiError> {
    state.auth.require_admin(&headers)?;

    let series = SeriesService::new(state.db).update(id, payload).await?;
    Ok(Json(series))
}

pub async fn delete_series(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    state.auth.require_admin(&headers)?;

    SeriesService::new(state.db).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
