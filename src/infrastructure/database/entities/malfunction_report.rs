//! Malfunction report entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "malfunction_reports")]
pub struct Model {
    /// UUID v4, hyphenated
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub station_id: String,
    pub malfunction_type: String,
    pub description: String,

    #[sea_orm(nullable)]
    pub reported_by: Option<String>,

    /// Report status: submitted, validated, invalid, ticket_created, resolved, closed
    pub status: String,

    #[sea_orm(nullable, unique)]
    pub ticket_id: Option<String>,

    /// JSON array of validation messages
    pub validation_errors: String,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

// No foreign key on station_id: reports may reference unknown stations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::charging_station::Entity",
        from = "Column::StationId",
        to = "super::charging_station::Column::Id"
    )]
    ChargingStation,
}

impl Related<super::charging_station::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChargingStation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
