//! Create malfunction_reports table
//!
//! station_id carries no foreign key: a report may name a station that does
//! not exist, which is rejected later during processing.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MalfunctionReports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MalfunctionReports::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MalfunctionReports::StationId)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MalfunctionReports::MalfunctionType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MalfunctionReports::Description)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MalfunctionReports::ReportedBy).string())
                    .col(
                        ColumnDef::new(MalfunctionReports::Status)
                            .string()
                            .not_null()
                            .default("submitted"),
                    )
                    .col(ColumnDef::new(MalfunctionReports::TicketId).string_len(36))
                    .col(
                        ColumnDef::new(MalfunctionReports::ValidationErrors)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(MalfunctionReports::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MalfunctionReports::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_malfunction_reports_station")
                    .table(MalfunctionReports::Table)
                    .col(MalfunctionReports::StationId)
                    .to_owned(),
            )
            .await?;

        // NULLs are distinct in SQLite unique indexes, so unticketed reports coexist.
        manager
            .create_index(
                Index::create()
                    .name("idx_malfunction_reports_ticket")
                    .table(MalfunctionReports::Table)
                    .col(MalfunctionReports::TicketId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MalfunctionReports::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum MalfunctionReports {
    Table,
    Id,
    StationId,
    MalfunctionType,
    Description,
    ReportedBy,
    Status,
    TicketId,
    ValidationErrors,
    CreatedAt,
    UpdatedAt,
}
