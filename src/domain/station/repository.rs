//! Charging station repository interface

use async_trait::async_trait;

use super::model::ChargingStation;
use crate::domain::value_objects::StationId;
use crate::domain::DomainResult;

/// Key-value store for stations. Absence is reported as `None`/`false`,
/// never as an error.
#[async_trait]
pub trait ChargingStationRepository: Send + Sync {
    /// Insert or replace, keyed by station id.
    async fn save(&self, station: ChargingStation) -> DomainResult<()>;
    async fn find_by_id(&self, id: &StationId) -> DomainResult<Option<ChargingStation>>;
    async fn find_by_postal_code(&self, postal_code: &str) -> DomainResult<Vec<ChargingStation>>;
    async fn find_all(&self) -> DomainResult<Vec<ChargingStation>>;
    async fn exists(&self, id: &StationId) -> DomainResult<bool>;
    async fn count(&self) -> DomainResult<usize>;
}
