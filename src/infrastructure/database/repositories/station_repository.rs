//! SeaORM implementation of ChargingStationRepository

use async_trait::async_trait;
use log::debug;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use super::db_err;
use crate::domain::{
    ChargingStation, ChargingStationRepository, DomainError, DomainResult, StationId,
    StationStatus,
};
use crate::infrastructure::database::entities::charging_station;

pub struct SeaOrmStationRepository {
    db: DatabaseConnection,
}

impl SeaOrmStationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: charging_station::Model) -> DomainResult<ChargingStation> {
    let corrupt = |what: &str| DomainError::Storage(format!("corrupt station row {}: {}", m.id, what));

    let station_id = StationId::new(m.id.clone()).map_err(|e| corrupt(&e.to_string()))?;
    let status = StationStatus::parse(&m.status)
        .ok_or_else(|| corrupt(&format!("unknown status '{}'", m.status)))?;

    Ok(ChargingStation {
        station_id,
        name: m.name,
        postal_code: m.postal_code,
        address: m.address,
        latitude: m.latitude,
        longitude: m.longitude,
        status,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

fn domain_to_active(s: ChargingStation) -> charging_station::ActiveModel {
    charging_station::ActiveModel {
        id: Set(s.station_id.into()),
        name: Set(s.name),
        postal_code: Set(s.postal_code),
        address: Set(s.address),
        latitude: Set(s.latitude),
        longitude: Set(s.longitude),
        status: Set(s.status.as_str().to_string()),
        created_at: Set(s.created_at),
        updated_at: Set(s.updated_at),
    }
}

fn models_to_domain(models: Vec<charging_station::Model>) -> DomainResult<Vec<ChargingStation>> {
    models.into_iter().map(model_to_domain).collect()
}

/// Insert or update one station on any connection, including a transaction.
pub(crate) async fn upsert<C: ConnectionTrait>(
    conn: &C,
    station: ChargingStation,
) -> Result<(), DbErr> {
    charging_station::Entity::insert(domain_to_active(station))
        .on_conflict(
            OnConflict::column(charging_station::Column::Id)
                .update_columns([
                    charging_station::Column::Name,
                    charging_station::Column::PostalCode,
                    charging_station::Column::Address,
                    charging_station::Column::Latitude,
                    charging_station::Column::Longitude,
                    charging_station::Column::Status,
                    charging_station::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

// ── ChargingStationRepository impl ──────────────────────────────

#[async_trait]
impl ChargingStationRepository for SeaOrmStationRepository {
    async fn save(&self, station: ChargingStation) -> DomainResult<()> {
        debug!("Saving charging station: {}", station.station_id());
        upsert(&self.db, station).await.map_err(db_err)
    }

    async fn find_by_id(&self, id: &StationId) -> DomainResult<Option<ChargingStation>> {
        let model = charging_station::Entity::find_by_id(id.as_str())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        model.map(model_to_domain).transpose()
    }

    async fn find_by_postal_code(&self, postal_code: &str) -> DomainResult<Vec<ChargingStation>> {
        let models = charging_station::Entity::find()
            .filter(charging_station::Column::PostalCode.eq(postal_code))
            .order_by_asc(charging_station::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }

    async fn find_all(&self) -> DomainResult<Vec<ChargingStation>> {
        let models = charging_station::Entity::find()
            .order_by_asc(charging_station::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }

    async fn exists(&self, id: &StationId) -> DomainResult<bool> {
        let count = charging_station::Entity::find()
            .filter(charging_station::Column::Id.eq(id.as_str()))
            .count(&self.db)
            .await
            .map_err(db_err)?;
        Ok(count > 0)
    }

    async fn count(&self) -> DomainResult<usize> {
        let count = charging_station::Entity::find()
            .count(&self.db)
            .await
            .map_err(db_err)?;
        Ok(count as usize)
    }
}
