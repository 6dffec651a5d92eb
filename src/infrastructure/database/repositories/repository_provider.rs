//! SeaORM implementation of RepositoryProvider

use async_trait::async_trait;
use log::debug;
use sea_orm::{DatabaseConnection, TransactionTrait};

use crate::domain::repositories::{DomainResult, RepositoryProvider};
use crate::domain::report::{MalfunctionReport, MalfunctionReportRepository};
use crate::domain::station::{ChargingStation, ChargingStationRepository};

use super::db_err;
use super::report_repository::{self, SeaOrmReportRepository};
use super::station_repository::{self, SeaOrmStationRepository};

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let station = repos.stations().find_by_id(&station_id).await?;
/// let report = repos.reports().find_by_ticket(&ticket_id).await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    db: DatabaseConnection,
    stations: SeaOrmStationRepository,
    reports: SeaOrmReportRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            stations: SeaOrmStationRepository::new(db.clone()),
            reports: SeaOrmReportRepository::new(db.clone()),
            db,
        }
    }
}

#[async_trait]
impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn stations(&self) -> &dyn ChargingStationRepository {
        &self.stations
    }

    fn reports(&self) -> &dyn MalfunctionReportRepository {
        &self.reports
    }

    async fn save_report_with_station(
        &self,
        report: MalfunctionReport,
        station: ChargingStation,
    ) -> DomainResult<()> {
        debug!(
            "Saving report {} with station {} in one transaction",
            report.report_id(),
            station.station_id()
        );
        let row = report_repository::domain_to_active(report)?;

        // Dropping an uncommitted transaction rolls it back.
        let txn = self.db.begin().await.map_err(db_err)?;
        report_repository::upsert(&txn, row).await.map_err(db_err)?;
        station_repository::upsert(&txn, station)
            .await
            .map_err(db_err)?;
        txn.commit().await.map_err(db_err)
    }
}
