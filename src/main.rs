use shuttle_runtime::{CustomError, SecretStore};
use sqlx::PgPool;
use tracing::info;

use config::Config;
use trip_service::TripService;

mod apis;
mod cache;
mod config;
mod context;
mod db;
mod error;
mod itinerary;
mod rate_sync_job;
mod routes;
mod trip_service;
mod types;
mod utils;

#[shuttle_runtime::main]
async fn shuttle_main(
    #[shuttle_runtime::Secrets] secrets: SecretStore,
    #[shuttle_shared_db::Postgres] pool: PgPool,
) -> Result<TripService, shuttle_runtime::Error> {
    sqlx::migrate!().run(&pool).await.map_err(CustomError::new)?;

    let config = Config::from_secrets(&secrets).map_err(CustomError::new)?;
    info!(
        "rates from {}, cache {} trips for {:?}",
        config.rates_api_url, config.trip_cache_capacity, config.trip_cache_ttl
    );

    Ok(TripService::new(pool, config))
}
