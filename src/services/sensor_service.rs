use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::database::entities::{measurements, sensors, sensors::Entity as Sensors, series::Entity as Series};
use crate::errors::CoreError;
use crate::services::{CreateMeasurement, MeasurementService, ValidationService};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateSensor {
    pub series_id: i32,
    pub name: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UpdateSensor {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

/// Reading pushed by a sensor. Shape matches a manual measurement create
/// minus the sensor id, which comes from the authenticated sensor itself.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IngestMeasurement {
    pub series_id: i32,
    pub value: f64,
    pub timestamp: DateTime<FixedOffset>,
}

/// Provisioning and API-key-authenticated ingest for machine-originated
/// readings.
#[derive(Clone)]
pub struct SensorService {
    db: DatabaseConnection,
}

impl SensorService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Provision a sensor. The returned model carries the generated API key;
    /// it is not serialized on subsequent reads.
    pub async fn create(&self, input: CreateSensor) -> Result<sensors::Model, CoreError> {
        ValidationService::validate_sensor_name(&input.name).map_err(CoreError::Validation)?;

        Series::find_by_id(input.series_id)
            .one(&self.db)
            .await?
            .ok_or(CoreError::not_found("series", input.series_id))?;

        let now = Utc::now();
        let row = sensors::ActiveModel {
            series_id: Set(input.series_id),
            name: Set(input.name.trim().to_string()),
            api_key: Set(format!("sensor_{}", Uuid::new_v4().simple())),
            is_active: Set(true),
            last_seen: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let sensor = row.insert(&self.db).await?;
        info!(sensor_id = sensor.id, series_id = sensor.series_id, "provisioned sensor");
        Ok(sensor)
    }

    pub async fn update(&self, id: i32, patch: UpdateSensor) -> Result<sensors::Model, CoreError> {
        let existing = Sensors::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(CoreError::not_found("sensor", id))?;

        if let Some(name) = &patch.name {
            ValidationService::validate_sensor_name(name).map_err(CoreError::Validation)?;
        }

        let mut row: sensors::ActiveModel = existing.into();
        if let Some(name) = patch.name {
            row.name = Set(name.trim().to_string());
        }
        if let Some(is_active) = patch.is_active {
            row.is_active = Set(is_active);
        }
        row.updated_at = Set(Utc::now());

        Ok(row.update(&self.db).await?)
    }

    pub async fn delete(&self, id: i32) -> Result<(), CoreError> {
        let existing = Sensors::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(CoreError::not_found("sensor", id))?;

        Sensors::delete_by_id(existing.id).exec(&self.db).await?;
        Ok(())
    }

    pub async fn get(&self, id: i32) -> Result<sensors::Model, CoreError> {
        Sensors::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(CoreError::not_found("sensor", id))
    }

    pub async fn list(&self) -> Result<Vec<sensors::Model>, CoreError> {
        Ok(Sensors::find()
            .order_by_asc(sensors::Column::Id)
            .all(&self.db)
            .await?)
    }

    /// Accept a reading from a sensor authenticated by its API key. The
    /// reading goes through the same bounds check as a manual create and
    /// stamps the sensor's id and last-seen time.
    pub async fn ingest(
        &self,
        sensor_id: i32,
        api_key: &str,
        input: IngestMeasurement,
    ) -> Result<measurements::Model, CoreError> {
        let sensor = Sensors::find()
            .filter(sensors::Column::Id.eq(sensor_id))
            .filter(sensors::Column::ApiKey.eq(api_key))
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                CoreError::Unauthorized("invalid sensor id or API key".to_string())
            })?;

        if !sensor.is_active {
            return Err(CoreError::Forbidden("sensor is disabled".to_string()));
        }

        if input.series_id != sensor.series_id {
            return Err(CoreError::invalid_field(
                "series_id",
                format!(
                    "series {} does not match the sensor's series {}",
                    input.series_id, sensor.series_id
                ),
            ));
        }

        let measurement = MeasurementService::new(self.db.clone())
            .create(CreateMeasurement {
                series_id: input.series_id,
                value: input.value,
                timestamp: input.timestamp,
                sensor_id: Some(sensor.id),
            })
            .await?;

        let mut row: sensors::ActiveModel = sensor.into();
        row.last_seen = Set(Some(Utc::now()));
        row.update(&self.db).await?;

        Ok(measurement)
    }
}
