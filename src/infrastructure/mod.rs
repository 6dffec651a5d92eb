pub mod database;
pub mod storage;

pub use database::{connect_and_migrate, init_database, DatabaseConfig, SeaOrmRepositoryProvider};
pub use storage::InMemoryRepositoryProvider;
