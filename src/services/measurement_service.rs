use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::{Deserialize, Serialize};

use crate::database::entities::{
    measurements, measurements::Entity as Measurements, sensors::Entity as Sensors,
    series::Entity as Series,
};
use crate::errors::CoreError;
use crate::services::ValidationService;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateMeasurement {
    pub series_id: i32,
    pub value: f64,
    /// Accepted with any offset; normalized to UTC before storage.
    pub timestamp: DateTime<FixedOffset>,
    #[serde(default)]
    pub sensor_id: Option<i32>,
}

/// Patch for an existing measurement. `series_id` is immutable after creation
/// and deliberately has no slot here.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UpdateMeasurement {
    pub value: Option<f64>,
    pub timestamp: Option<DateTime<FixedOffset>>,
}

/// Measurement Store: owns individual readings, enforcing the owning series'
/// bounds at write time. Bounds are checked against the series as it exists
/// at the moment of the write and never re-checked retroactively.
#[derive(Clone)]
pub struct MeasurementService {
    db: DatabaseConnection,
}

impl MeasurementService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, input: CreateMeasurement) -> Result<measurements::Model, CoreError> {
        let series = Series::find_by_id(input.series_id)
            .one(&self.db)
            .await?
            .ok_or(CoreError::not_found("series", input.series_id))?;

        ValidationService::validate_measurement_value(input.value, &series)
            .map_err(CoreError::Validation)?;

        if let Some(sensor_id) = input.sensor_id {
            Sensors::find_by_id(sensor_id)
                .one(&self.db)
                .await?
                .ok_or(CoreError::not_found("sensor", sensor_id))?;
        }

        let row = measurements::ActiveModel {
            series_id: Set(series.id),
            sensor_id: Set(input.sensor_id),
            value: Set(input.value),
            timestamp: Set(input.timestamp.with_timezone(&Utc)),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        Ok(row.insert(&self.db).await?)
    }

    pub async fn update(
        &self,
        id: i32,
        patch: UpdateMeasurement,
    ) -> Result<measurements::Model, CoreError> {
        let existing = Measurements::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(CoreError::not_found("measurement", id))?;

        if let Some(value) = patch.value {
            // Re-validate against the series' current bounds, which may have
            // changed since this measurement was written.
            let series = Series::find_by_id(existing.series_id)
                .one(&self.db)
                .await?
                .ok_or(CoreError::not_found("series", existing.series_id))?;

            ValidationService::validate_measurement_value(value, &series)
                .map_err(CoreError::Validation)?;
        }

        let mut row: measurements::ActiveModel = existing.into();
        if let Some(value) = patch.value {
            row.value = Set(value);
        }
        if let Some(timestamp) = patch.timestamp {
            row.timestamp = Set(timestamp.with_timezone(&Utc));
        }

        Ok(row.update(&self.db).await?)
    }

    pub async fn delete(&self, id: i32) -> Result<(), CoreError> {
        let existing = Measurements::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(CoreError::not_found("measurement", id))?;

        Measurements::delete_by_id(existing.id).exec(&self.db).await?;
        Ok(())
    }

    pub async fn get(&self, id: i32) -> Result<measurements::Model, CoreError> {
        Measurements::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(CoreError::not_found("measurement", id))
    }
}
