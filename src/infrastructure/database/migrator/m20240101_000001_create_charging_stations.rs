//! Create charging_stations table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ChargingStations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChargingStations::Id)
                            .string_len(50)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ChargingStations::Name).string().not_null())
                    .col(
                        ColumnDef::new(ChargingStations::PostalCode)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ChargingStations::Address).string())
                    .col(ColumnDef::new(ChargingStations::Latitude).double())
                    .col(ColumnDef::new(ChargingStations::Longitude).double())
                    .col(
                        ColumnDef::new(ChargingStations::Status)
                            .string()
                            .not_null()
                            .default("available"),
                    )
                    .col(
                        ColumnDef::new(ChargingStations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChargingStations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_charging_stations_postal_code")
                    .table(ChargingStations::Table)
                    .col(ChargingStations::PostalCode)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ChargingStations::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum ChargingStations {
    Table,
    Id,
    Name,
    PostalCode,
    Address,
    Latitude,
    Longitude,
    Status,
    CreatedAt,
    UpdatedAt,
}
