//! Charging Station aggregate
//!
//! Contains the ChargingStation entity, its status and the repository interface.

pub mod model;
pub mod repository;

pub use model::{ChargingStation, StationStatus};
pub use repository::ChargingStationRepository;
