pub mod app_config;
pub mod database;
pub mod memory;

pub use app_config::{Config, IsolationLevel, StoreBackend};
pub use database::PgFlightStore;
pub use memory::{FlightRecord, MemoryFlightStore};
