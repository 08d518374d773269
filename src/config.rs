use std::str::FromStr;
use std::time::Duration;

use apalis::cron::Schedule;
use shuttle_runtime::SecretStore;

use crate::error::Error;

const DEFAULT_RATES_API_URL: &str = "https://api.frankfurter.dev/v1/";
const DEFAULT_RATES_SYNC_SCHEDULE: &str = "0 0 */6 * * * *";
const DEFAULT_TRIP_CACHE_CAPACITY: u64 = 256;
const DEFAULT_TRIP_CACHE_TTL_SECS: u64 = 300;

#[derive(Debug, Clone)]
pub struct Config {
    pub rates_api_url: String,
    pub rates_sync_schedule: Schedule,
    pub trip_cache_capacity: u64,
    pub trip_cache_ttl: Duration,
}

impl Config {
    pub fn from_secrets(secrets: &SecretStore) -> Result<Self, Error> {
        Self::from_lookup(|key| secrets.get(key))
    }

    /// Reads every setting through `lookup`, falling back to defaults for
    /// absent keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let rates_api_url = lookup("RATES_API_URL").unwrap_or_else(|| DEFAULT_RATES_API_URL.to_string());

        let schedule = lookup("RATES_SYNC_SCHEDULE").unwrap_or_else(|| DEFAULT_RATES_SYNC_SCHEDULE.to_string());
        let rates_sync_schedule = Schedule::from_str(&schedule)
            .map_err(|e| Error::Config(format!("RATES_SYNC_SCHEDULE {schedule:?}: {e}")))?;

        let trip_cache_capacity = number(&lookup, "TRIP_CACHE_CAPACITY", DEFAULT_TRIP_CACHE_CAPACITY)?;
        let ttl_secs = number(&lookup, "TRIP_CACHE_TTL_SECS", DEFAULT_TRIP_CACHE_TTL_SECS)?;

        Ok(Self {
            rates_api_url,
            rates_sync_schedule,
            trip_cache_capacity,
            trip_cache_ttl: Duration::from_secs(ttl_secs),
        })
    }
}

fn number(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> Result<u64, Error> {
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{key} must be a positive integer, got {value:?}"))),
        None => Ok(default),
    }
}
