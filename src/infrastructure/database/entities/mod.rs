//! Database entities module

pub mod charging_station;
pub mod malfunction_report;

pub use charging_station::Entity as ChargingStation;
pub use malfunction_report::Entity as MalfunctionReport;
