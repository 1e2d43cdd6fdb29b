use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create series table
        manager
            .create_table(
                Table::create()
                    .table(Series::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Series::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Series::Name).string().not_null())
                    .col(ColumnDef::new(Series::Description).text())
                    .col(ColumnDef::new(Series::Unit).string().not_null())
                    .col(ColumnDef::new(Series::MinValue).double().not_null())
                    .col(ColumnDef::new(Series::MaxValue).double().not_null())
                    .col(ColumnDef::new(Series::Color).string().not_null())
                    .col(ColumnDef::new(Series::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Series::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        // Create sensors table
        manager
            .create_table(
                Table::create()
                    .table(Sensors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Sensors::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Sensors::SeriesId).integer().not_null())
                    .col(ColumnDef::new(Sensors::Name).string().not_null())
                    .col(ColumnDef::new(Sensors::ApiKey).string().not_null())
                    .col(ColumnDef::new(Sensors::IsActive).boolean().not_null())
                    .col(ColumnDef::new(Sensors::LastSeen).timestamp_with_time_zone())
                    .col(ColumnDef::new(Sensors::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Sensors::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-sensors-series_id")
                            .from(Sensors::Table, Sensors::SeriesId)
                            .to(Series::Table, Series::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create measurements table
        manager
            .create_table(
                Table::create()
                    .table(Measurements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Measurements::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Measurements::SeriesId).integer().not_null())
                    .col(ColumnDef::new(Measurements::SensorId).integer())
                    .col(ColumnDef::new(Measurements::Value).double().not_null())
                    .col(ColumnDef::new(Measurements::Timestamp).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Measurements::CreatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-measurements-series_id")
                            .from(Measurements::Table, Measurements::SeriesId)
                            .to(Series::Table, Series::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-measurements-sensor_id")
                            .from(Measurements::Table, Measurements::SensorId)
                            .to(Sensors::Table, Sensors::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create indexes for query performance
        manager
            .create_index(
                Index::create()
                    .name("idx-measurements-series_id")
                    .table(Measurements::Table)
                    .col(Measurements::SeriesId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-measurements-timestamp")
                    .table(Measurements::Table)
                    .col(Measurements::Timestamp)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-sensors-series_id")
                    .table(Sensors::Table)
                    .col(Sensors::SeriesId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-sensors-api_key")
                    .table(Sensors::Table)
                    .col(Sensors::ApiKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Measurements::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Sensors::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Series::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Series {
    Table,
    Id,
    Name,
    Description,
    Unit,
    MinValue,
    MaxValue,
    Color,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Sensors {
    Table,
    Id,
    SeriesId,
    Name,
    ApiKey,
    IsActive,
    LastSeen,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Measurements {
    Table,
    Id,
    SeriesId,
    SensorId,
    Value,
    Timestamp,
    CreatedAt,
}
