//! SeaORM implementation of MalfunctionReportRepository

use async_trait::async_trait;
use log::debug;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};

use super::db_err;
use crate::domain::{
    DomainError, DomainResult, MalfunctionReport, MalfunctionReportRepository, ReportDescription,
    ReportId, ReportStatus, StationId, TicketId,
};
use crate::infrastructure::database::entities::malfunction_report;

pub struct SeaOrmReportRepository {
    db: DatabaseConnection,
}

impl SeaOrmReportRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: malfunction_report::Model) -> DomainResult<MalfunctionReport> {
    let corrupt = |what: String| DomainError::Storage(format!("corrupt report row {}: {}", m.id, what));

    let report_id: ReportId = m.id.parse().map_err(|e: DomainError| corrupt(e.to_string()))?;
    let station_id = StationId::new(m.station_id.clone()).map_err(|e| corrupt(e.to_string()))?;
    let malfunction_type = m
        .malfunction_type
        .parse()
        .map_err(|e: DomainError| corrupt(e.to_string()))?;
    let description = ReportDescription::new(&m.description).map_err(|e| corrupt(e.to_string()))?;
    let status = ReportStatus::parse(&m.status)
        .ok_or_else(|| corrupt(format!("unknown status '{}'", m.status)))?;
    let ticket_id = m
        .ticket_id
        .as_deref()
        .map(str::parse::<TicketId>)
        .transpose()
        .map_err(|e| corrupt(e.to_string()))?;
    let validation_errors: Vec<String> =
        serde_json::from_str(&m.validation_errors).map_err(|e| corrupt(e.to_string()))?;

    Ok(MalfunctionReport {
        report_id,
        station_id,
        malfunction_type,
        description,
        reported_by: m.reported_by,
        status,
        ticket_id,
        validation_errors,
        created_at: m.created_at,
        updated_at: m.updated_at,
    })
}

pub(crate) fn domain_to_active(r: MalfunctionReport) -> DomainResult<malfunction_report::ActiveModel> {
    let validation_errors = serde_json::to_string(&r.validation_errors)
        .map_err(|e| DomainError::Storage(format!("Serialization error: {}", e)))?;

    Ok(malfunction_report::ActiveModel {
        id: Set(r.report_id.to_string()),
        station_id: Set(r.station_id.into()),
        malfunction_type: Set(r.malfunction_type.as_str().to_string()),
        description: Set(r.description.into()),
        reported_by: Set(r.reported_by),
        status: Set(r.status.as_str().to_string()),
        ticket_id: Set(r.ticket_id.map(|t| t.to_string())),
        validation_errors: Set(validation_errors),
        created_at: Set(r.created_at),
        updated_at: Set(r.updated_at),
    })
}

fn models_to_domain(models: Vec<malfunction_report::Model>) -> DomainResult<Vec<MalfunctionReport>> {
    models.into_iter().map(model_to_domain).collect()
}

/// Insert or update one report row on any connection, including a transaction.
pub(crate) async fn upsert<C: ConnectionTrait>(
    conn: &C,
    row: malfunction_report::ActiveModel,
) -> Result<(), DbErr> {
    malfunction_report::Entity::insert(row)
        .on_conflict(
            OnConflict::column(malfunction_report::Column::Id)
                .update_columns([
                    malfunction_report::Column::Status,
                    malfunction_report::Column::TicketId,
                    malfunction_report::Column::ValidationErrors,
                    malfunction_report::Column::ReportedBy,
                    malfunction_report::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

// ── MalfunctionReportRepository impl ────────────────────────────

#[async_trait]
impl MalfunctionReportRepository for SeaOrmReportRepository {
    async fn save(&self, report: MalfunctionReport) -> DomainResult<()> {
        debug!("Saving malfunction report: {}", report.report_id());
        upsert(&self.db, domain_to_active(report)?)
            .await
            .map_err(db_err)
    }

    async fn find_by_id(&self, id: &ReportId) -> DomainResult<Option<MalfunctionReport>> {
        let model = malfunction_report::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        model.map(model_to_domain).transpose()
    }

    async fn find_by_station(&self, station_id: &StationId) -> DomainResult<Vec<MalfunctionReport>> {
        let models = malfunction_report::Entity::find()
            .filter(malfunction_report::Column::StationId.eq(station_id.as_str()))
            .order_by_asc(malfunction_report::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }

    async fn find_by_ticket(&self, ticket_id: &TicketId) -> DomainResult<Option<MalfunctionReport>> {
        let model = malfunction_report::Entity::find()
            .filter(malfunction_report::Column::TicketId.eq(ticket_id.to_string()))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        model.map(model_to_domain).transpose()
    }

    async fn find_all(&self) -> DomainResult<Vec<MalfunctionReport>> {
        let models = malfunction_report::Entity::find()
            .order_by_asc(malfunction_report::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models_to_domain(models)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MalfunctionType;
    use crate::infrastructure::database::test_support::memory_db;

    fn sample_report(station: &str) -> MalfunctionReport {
        MalfunctionReport::new(
            ReportId::new(),
            StationId::new(station).unwrap(),
            MalfunctionType::PaymentFailure,
            ReportDescription::new("Payment terminal completely unresponsive").unwrap(),
            Some("user@example.com".into()),
        )
    }

    #[tokio::test]
    async fn round_trip_preserves_state() {
        let repo = SeaOrmReportRepository::new(memory_db().await);
        let mut report = sample_report("NONEXISTENT");
        report.validate(false, false);
        repo.save(report.clone()).await.unwrap();

        let found = repo.find_by_id(&report.report_id()).await.unwrap().unwrap();
        assert_eq!(found.status(), ReportStatus::Invalid);
        assert_eq!(found.validation_errors(), report.validation_errors());
        assert_eq!(found.malfunction_type(), MalfunctionType::PaymentFailure);
        assert_eq!(found.reported_by(), Some("user@example.com"));
        assert!(found.ticket_id().is_none());
    }

    #[tokio::test]
    async fn ticket_lookup_after_update() {
        let repo = SeaOrmReportRepository::new(memory_db().await);
        let mut report = sample_report("STATION-001");
        repo.save(report.clone()).await.unwrap();

        let ticket = TicketId::new();
        report.validate(true, true);
        report.create_ticket(ticket).unwrap();
        repo.save(report.clone()).await.unwrap();

        let found = repo.find_by_ticket(&ticket).await.unwrap().unwrap();
        assert_eq!(found.report_id(), report.report_id());
        assert_eq!(found.status(), ReportStatus::TicketCreated);
        assert_eq!(repo.find_all().await.unwrap().len(), 1);
        assert!(repo.find_by_ticket(&TicketId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reports_by_station() {
        let repo = SeaOrmReportRepository::new(memory_db().await);
        repo.save(sample_report("STATION-001")).await.unwrap();
        repo.save(sample_report("STATION-001")).await.unwrap();
        repo.save(sample_report("STATION-002")).await.unwrap();

        let station = StationId::new("STATION-001").unwrap();
        assert_eq!(repo.find_by_station(&station).await.unwrap().len(), 2);
    }
}
