use sqlx::PgPool;

use crate::apis::RatesApi;
use crate::cache::TripCache;
use crate::config::Config;

/// State shared by request handlers and background jobs.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub pool: PgPool,
    pub rates: RatesApi,
    pub cache: TripCache,
}

impl AppContext {
    pub fn new(pool: PgPool, config: &Config) -> Self {
        Self {
            pool,
            rates: RatesApi::new(config.rates_api_url.clone()),
            cache: TripCache::new(config.trip_cache_capacity, config.trip_cache_ttl),
        }
    }
}
