//! Database functionality tests
//!
//! Tests for migrations, service-level CRUD, bounds enforcement, cascade
//! deletes, and query ordering.

use anyhow::Result;
use chrono::{DateTime, FixedOffset, Utc};
use measurehub::database::entities::*;
use measurehub::database::setup_database;
use measurehub::errors::CoreError;
use measurehub::services::{
    CreateMeasurement, CreateSeries, MeasurementFilter, MeasurementService, QueryService,
    SeriesService, UpdateMeasurement, UpdateSeries,
};
use sea_orm::{Database, DatabaseConnection, EntityTrait};
use tempfile::NamedTempFile;

/// Create a test database connection with migrations
async fn setup_test_db() -> Result<(DatabaseConnection, NamedTempFile)> {
    let temp_file = NamedTempFile::new()?;
    let db_url = format!("sqlite://{}?mode=rwc", temp_file.path().display());

    let db = Database::connect(&db_url).await?;
    setup_database(&db).await?;

    Ok((db, temp_file))
}

fn instant(raw: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(raw).expect("valid RFC 3339 literal")
}

fn temperature_series() -> CreateSeries {
    CreateSeries {
        name: "Temperature".to_string(),
        description: Some("Living room".to_string()),
        unit: "°C".to_string(),
        min_value: -20.0,
        max_value: 50.0,
        color: "#FF5733".to_string(),
    }
}

#[tokio::test]
async fn test_database_migrations() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;

    // Verify all tables exist by attempting to query them
    let series = series::Entity::find().all(&db).await?;
    assert_eq!(series.len(), 0);

    let measurements = measurements::Entity::find().all(&db).await?;
    assert_eq!(measurements.len(), 0);

    let sensors = sensors::Entity::find().all(&db).await?;
    assert_eq!(sensors.len(), 0);

    Ok(())
}

#[tokio::test]
async fn test_series_crud_operations() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let service = SeriesService::new(db);

    let created = service.create(temperature_series()).await?;
    assert_eq!(created.name, "Temperature");
    assert_eq!(created.unit, "°C");
    assert!(created.min_value < created.max_value);

    let fetched = service.get(created.id).await?;
    assert_eq!(fetched.id, created.id);

    let updated = service
        .update(
            created.id,
            UpdateSeries {
                name: Some("Outdoor Temperature".to_string()),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(updated.name, "Outdoor Temperature");
    // Untouched fields survive a partial update
    assert_eq!(updated.unit, "°C");
    assert_eq!(updated.max_value, 50.0);

    service.delete(created.id).await?;
    assert!(matches!(
        service.get(created.id).await,
        Err(CoreError::NotFound { .. })
    ));
    assert!(service.list().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_series_validation_rules() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let service = SeriesService::new(db);

    let mut invalid = temperature_series();
    invalid.name = String::new();
    invalid.min_value = 50.0;
    invalid.max_value = 50.0;
    invalid.color = "red".to_string();

    let err = service.create(invalid).await.unwrap_err();
    let fields = err.fields().expect("validation error carries fields");
    assert!(fields.contains_key("name"));
    assert!(fields.contains_key("max_value"));
    assert!(fields.contains_key("color"));

    // Raising min_value above the stored max_value must fail even though
    // max_value is not part of the patch.
    let series = service.create(temperature_series()).await?;
    let err = service
        .update(
            series.id,
            UpdateSeries {
                min_value: Some(60.0),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(err.fields().unwrap().contains_key("max_value"));

    Ok(())
}

#[tokio::test]
async fn test_measurement_bounds_enforced_at_write_time() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let series_service = SeriesService::new(db.clone());
    let measurement_service = MeasurementService::new(db);

    let series = series_service.create(temperature_series()).await?;

    // Inclusive upper bound
    let at_bound = measurement_service
        .create(CreateMeasurement {
            series_id: series.id,
            value: 50.0,
            timestamp: instant("2024-01-01T10:00:00Z"),
            sensor_id: None,
        })
        .await?;
    assert_eq!(at_bound.value, 50.0);

    // Just outside the range
    let err = measurement_service
        .create(CreateMeasurement {
            series_id: series.id,
            value: 51.0,
            timestamp: instant("2024-01-01T11:00:00Z"),
            sensor_id: None,
        })
        .await
        .unwrap_err();
    let fields = err.fields().unwrap();
    assert!(fields["value"].contains("[-20, 50]"));
    assert_eq!(fields["min_value"], "-20");
    assert_eq!(fields["max_value"], "50");

    // Unknown series
    assert!(matches!(
        measurement_service
            .create(CreateMeasurement {
                series_id: 9999,
                value: 0.0,
                timestamp: instant("2024-01-01T10:00:00Z"),
                sensor_id: None,
            })
            .await,
        Err(CoreError::NotFound { entity: "series", .. })
    ));

    // Tighten the bounds: the existing measurement is left alone, but value
    // updates re-validate against the new range.
    series_service
        .update(
            series.id,
            UpdateSeries {
                max_value: Some(40.0),
                ..Default::default()
            },
        )
        .await?;

    let untouched = measurement_service.get(at_bound.id).await?;
    assert_eq!(untouched.value, 50.0);

    let err = measurement_service
        .update(
            at_bound.id,
            UpdateMeasurement {
                value: Some(45.0),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(err.fields().unwrap()["value"].contains("[-20, 40]"));

    let lowered = measurement_service
        .update(
            at_bound.id,
            UpdateMeasurement {
                value: Some(39.5),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(lowered.value, 39.5);

    Ok(())
}

#[tokio::test]
async fn test_timestamp_normalized_to_utc() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let series = SeriesService::new(db.clone()).create(temperature_series()).await?;

    let measurement = MeasurementService::new(db)
        .create(CreateMeasurement {
            series_id: series.id,
            value: 21.5,
            timestamp: instant("2024-06-01T12:00:00+02:00"),
            sensor_id: None,
        })
        .await?;

    assert_eq!(
        measurement.timestamp,
        instant("2024-06-01T10:00:00Z").with_timezone(&Utc)
    );

    Ok(())
}

#[tokio::test]
async fn test_query_window_ordering_and_limit() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let series_service = SeriesService::new(db.clone());
    let measurement_service = MeasurementService::new(db.clone());
    let query_service = QueryService::new(db);

    let temp = series_service.create(temperature_series()).await?;
    let energy = series_service
        .create(CreateSeries {
            name: "Energy".to_string(),
            description: None,
            unit: "kWh".to_string(),
            min_value: 0.0,
            max_value: 100.0,
            color: "#00AA00".to_string(),
        })
        .await?;

    // Insert out of chronological order, with one duplicated timestamp
    let stamps = [
        (temp.id, 20.0, "2024-03-02T00:00:00Z"),
        (energy.id, 5.0, "2024-03-01T00:00:00Z"),
        (temp.id, 21.0, "2024-03-01T00:00:00Z"),
        (energy.id, 6.0, "2024-03-04T00:00:00Z"),
        (temp.id, 22.0, "2024-03-03T00:00:00Z"),
    ];
    for (series_id, value, stamp) in stamps {
        measurement_service
            .create(CreateMeasurement {
                series_id,
                value,
                timestamp: instant(stamp),
                sensor_id: None,
            })
            .await?;
    }

    // Union over both series, full window
    let mut filter = MeasurementFilter::new(vec![temp.id, energy.id]);
    filter.start = Some(instant("2024-03-01T00:00:00Z").with_timezone(&Utc));
    filter.end = Some(instant("2024-03-04T00:00:00Z").with_timezone(&Utc));

    let results = query_service.query(&filter).await?;
    assert_eq!(results.len(), 5);
    for pair in results.windows(2) {
        assert!(pair[0].timestamp <= pair[1].timestamp);
        if pair[0].timestamp == pair[1].timestamp {
            assert!(pair[0].id < pair[1].id);
        }
    }

    // Inclusive ends: narrowing to the exact first and last instants keeps
    // the boundary rows
    filter.end = Some(instant("2024-03-01T00:00:00Z").with_timezone(&Utc));
    let boundary = query_service.query(&filter).await?;
    assert_eq!(boundary.len(), 2);
    assert!(boundary.iter().all(|m| m.timestamp
        == instant("2024-03-01T00:00:00Z").with_timezone(&Utc)));

    // Single-series filter excludes the other series entirely
    filter.end = Some(instant("2024-03-04T00:00:00Z").with_timezone(&Utc));
    filter.series_ids = vec![energy.id];
    let energy_only = query_service.query(&filter).await?;
    assert_eq!(energy_only.len(), 2);
    assert!(energy_only.iter().all(|m| m.series_id == energy.id));

    // Truncation takes the head of the sorted sequence
    filter.series_ids = vec![temp.id, energy.id];
    filter.limit = 2;
    let truncated = query_service.query(&filter).await?;
    assert_eq!(truncated.len(), 2);
    assert!(truncated
        .iter()
        .all(|m| m.timestamp == instant("2024-03-01T00:00:00Z").with_timezone(&Utc)));

    // Empty id set means "select none", not "all"
    filter.series_ids = Vec::new();
    assert!(query_service.query(&filter).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_series_delete_cascades_to_measurements() -> Result<()> {
    let (db, _temp_file) = setup_test_db().await?;
    let series_service = SeriesService::new(db.clone());
    let measurement_service = MeasurementService::new(db.clone());
    let query_service = QueryService::new(db.clone());

    let series = series_service.create(temperature_series()).await?;
    for (value, stamp) in [(1.0, "2024-01-01T00:00:00Z"), (2.0, "2024-01-02T00:00:00Z")] {
        measurement_service
            .create(CreateMeasurement {
                series_id: series.id,
                value,
                timestamp: instant(stamp),
                sensor_id: None,
            })
            .await?;
    }

    series_service.delete(series.id).await?;

    let remaining = query_service
        .query(&MeasurementFilter::new(vec![series.id]))
        .await?;
    assert!(remaining.is_empty());
    assert_eq!(measurements::Entity::find().all(&db).await?.len(), 0);

    Ok(())
}
