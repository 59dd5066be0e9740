pub mod app_config;
pub mod database;
pub mod events;
pub mod redis_repo;
pub mod reservation_repo;
pub mod trip_repo;

pub use database::DbClient;
pub use events::EventProducer;
pub use redis_repo::RedisClient;
pub use reservation_repo::PostgresReservationLedger;
pub use trip_repo::PostgresTripCatalog;

/// Every sqlx failure is reported as a storage outage; decode problems in
/// known columns are caught separately by the row conversions.
pub(crate) fn storage_error(err: sqlx::Error) -> voyage_core::CoreError {
    tracing::error!("Storage failure: {}", err);
    voyage_core::CoreError::StorageUnavailable(err.to_string())
}
