use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::database::entities::{
    measurements, measurements::Entity as Measurements, sensors, sensors::Entity as Sensors,
    series, series::Entity as Series,
};
use crate::errors::CoreError;
use crate::services::ValidationService;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateSeries {
    pub name: String,
    pub description: Option<String>,
    pub unit: String,
    pub min_value: f64,
    pub max_value: f64,
    pub color: String,
}

/// Partial update; absent fields are left unchanged. The merged result is
/// re-validated as a whole, so e.g. raising min_value above the stored
/// max_value fails even though max_value is not part of the patch.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UpdateSeries {
    pub name: Option<String>,
    pub description: Option<String>,
    pub unit: Option<String>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub color: Option<String>,
}

/// Series Registry: owns series definitions and their validation rules.
#[derive(Clone)]
pub struct SeriesService {
    db: DatabaseConnection,
}

impl SeriesService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(&self, input: CreateSeries) -> Result<series::Model, CoreError> {
        ValidationService::validate_series(
            &input.name,
            &input.unit,
            input.min_value,
            input.max_value,
            &input.color,
        )
        .map_err(CoreError::Validation)?;

        let now = Utc::now();
        let row = series::ActiveModel {
            name: Set(input.name.trim().to_string()),
            description: Set(input.description),
            unit: Set(input.unit.trim().to_string()),
            min_value: Set(input.min_value),
            max_value: Set(input.max_value),
            color: Set(input.color),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        Ok(row.insert(&self.db).await?)
    }

    pub async fn update(&self, id: i32, patch: UpdateSeries) -> Result<series::Model, CoreError> {
        let existing = Series::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(CoreError::not_found("series", id))?;

        // Merge the patch onto the stored row, then validate the result.
        let name = patch.name.unwrap_or_else(|| existing.name.clone());
        let unit = patch.unit.unwrap_or_else(|| existing.unit.clone());
        let min_value = patch.min_value.unwrap_or(existing.min_value);
        let max_value = patch.max_value.unwrap_or(existing.max_value);
        let color = patch.color.unwrap_or_else(|| existing.color.clone());

        ValidationService::validate_series(&name, &unit, min_value, max_value, &color)
            .map_err(CoreError::Validation)?;

        let mut row: series::ActiveModel = existing.into();
        row.name = Set(name.trim().to_string());
        if let Some(description) = patch.description {
            row.description = Set(Some(description));
        }
        row.unit = Set(unit.trim().to_string());
        row.min_value = Set(min_value);
        row.max_value = Set(max_value);
        row.color = Set(color);
        row.updated_at = Set(Utc::now());

        Ok(row.update(&self.db).await?)
    }

    /// Delete a series and everything referencing it. Irreversible; the
    /// confirmation step lives at the UI boundary, not here.
    pub async fn delete(&self, id: i32) -> Result<(), CoreError> {
        let existing = Series::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(CoreError::not_found("series", id))?;

        // Cascade explicitly rather than relying on the driver's foreign-key
        // pragma being enabled.
        let removed = Measurements::delete_many()
            .filter(measurements::Column::SeriesId.eq(id))
            .exec(&self.db)
            .await?;

        Sensors::delete_many()
            .filter(sensors::Column::SeriesId.eq(id))
            .exec(&self.db)
            .await?;

        Series::delete_by_id(existing.id).exec(&self.db).await?;

        info!(
            series_id = id,
            measurements = removed.rows_affected,
            "deleted series and cascaded measurements"
        );
        Ok(())
    }

    pub async fn get(&self, id: i32) -> Result<series::Model, CoreError> {
        Series::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(CoreError::not_found("series", id))
    }

    pub async fn list(&self) -> Result<Vec<series::Model>, CoreError> {
        Ok(Series::find()
            .order_by_asc(series::Column::Id)
            .all(&self.db)
            .await?)
    }
}
