use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use serde::Serialize;

use crate::database::entities::{measurements, sensors};
use crate::errors::CoreError;
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::services::{CreateSensor, IngestMeasurement, SensorService, UpdateSensor};

/// Provisioning response. The only place the API key ever appears.
#[derive(Serialize)]
pub struct SensorWithKey {
    pub id: i32,
    pub series_id: i32,
    pub name: String,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub api_key: String,
}

pub async fn list_sensors(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<sensors::Model>>, ApiError> {
    state.auth.require_admin(&headers)?;

    let sensors = SensorService::new(state.db).list().await?;
    Ok(Json(sensors))
}

pub async fn get_sensor(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i32>,
) -> Result<Json<sensors::Model>, ApiError> {
    state.auth.require_admin(&headers)?;

    let sensor = SensorService::new(state.db).get(id).await?;
    Ok(Json(sensor))
}

pub async fn create_sensor(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateSensor>,
) -> Result<(StatusCode, Json<SensorWithKey>), ApiError> {
    state.auth.require_admin(&headers)?;

    let sensor = SensorService::new(state.db).create(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(SensorWithKey {
            id: sensor.id,
            series_id: sensor.series_id,
            name: sensor.name,
            is_active: sensor.is_active,
            created_at: sensor.created_at,
            api_key: sensor.api_key,
        }),
    ))
}

pub async fn update_sensor(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateSensor>,
) -> Result<Json<sensors::Model>, ApiError> {
    state.auth.require_admin(&headers)?;

    let sensor = SensorService::new(state.db).update(id, payload).await?;
    Ok(Json(sensor))
}

pub async fn delete_sensor(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    state.auth.require_admin(&headers)?;

    SensorService::new(state.db).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Reading submission authenticated by the sensor's API key rather than an
/// admin session.
pub async fn submit_sensor_data(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    headers: HeaderMap,
    Json(payload): Json<IngestMeasurement>,
) -> Result<(StatusCode, Json<measurements::Model>), ApiError> {
    let api_key = headers
        .get("X-API-Key")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| CoreError::Unauthorized("missing X-API-Key header".to_string()))?;

    let measurement = SensorService::new(state.db)
        .ingest(id, api_key, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(measurement)))
}
