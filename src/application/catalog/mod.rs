//! Station catalog import

mod loader;

pub use loader::{seed_stations, CatalogSummary, RegisterLoader};
