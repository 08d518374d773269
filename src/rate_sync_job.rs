use std::collections::HashMap;

use apalis::prelude::{Data, Job};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::apis::RatesApi;
use crate::context::AppContext;
use crate::db::currencies;
use crate::error::Error;
use crate::types::Currency;

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct RateSync(DateTime<Utc>);

impl From<DateTime<Utc>> for RateSync {
    fn from(date_time: DateTime<Utc>) -> Self {
        Self(date_time)
    }
}

impl Job for RateSync {
    const NAME: &'static str = "rates::RateSync";
}

pub async fn rate_sync_job(job: RateSync, ctx: Data<AppContext>) -> Result<(), Error> {
    let updated = sync_rates(&ctx.pool, &ctx.rates).await?;
    ctx.cache.invalidate_all();
    info!("rate sync scheduled at {} updated {} currencies", job.0, updated);
    Ok(())
}

/// New EUR rates for the currencies the live quotes cover. Currencies
/// without a quote are left out.
pub fn rate_updates(currencies: &[Currency], live: &HashMap<String, f64>) -> Vec<(Uuid, f64)> {
    currencies
        .iter()
        .filter_map(|currency| Some((currency.id, currency.live_rate(live)?)))
        .collect()
}

/// Replaces stored rates with live ones where a quote exists, for display.
pub fn with_live_rates(currencies: Vec<Currency>, live: &HashMap<String, f64>) -> Vec<Currency> {
    currencies
        .into_iter()
        .map(|mut currency| {
            if let Some(rate) = currency.live_rate(live) {
                currency.rate_to_eur = rate;
            }
            currency
        })
        .collect()
}

/// Fetches the latest quotes and stores them. Returns how many currencies changed.
pub async fn sync_rates(pool: &PgPool, rates: &RatesApi) -> Result<usize, Error> {
    let live = rates.latest_eur_rates().await?;
    let stored = currencies::list(pool).await?;
    let updates = rate_updates(&stored, &live);

    let mut tx = pool.begin().await?;
    for (id, rate) in &updates {
        currencies::set_rate(&mut *tx, *id, *rate).await?;
    }
    tx.commit().await?;

    Ok(updates.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn currency(name: &str, symbol: &str, rate_to_eur: f64) -> Currency {
        Currency {
            id: Uuid::new_v4(),
            name: name.to_string(),
            symbol: symbol.to_string(),
            rate_to_eur,
        }
    }

    fn live() -> HashMap<String, f64> {
        HashMap::from([("USD".to_string(), 1.25), ("GBP".to_string(), 0.8)])
    }

    #[test]
    fn updates_cover_quoted_currencies_and_euro() {
        let stored = vec![
            currency("Euro (EUR)", "€", 0.99),
            currency("US Dollar (USD)", "$", 1.0),
            currency("Costa Rican Colón (CRC)", "₡", 0.0018),
        ];
        let updates = rate_updates(&stored, &live());

        assert_eq!(updates, vec![(stored[0].id, 1.0), (stored[1].id, 0.8)]);
    }

    #[test]
    fn overlay_keeps_unquoted_rates() {
        let overlaid = with_live_rates(
            vec![
                currency("British Pound (GBP)", "£", 1.1),
                currency("Costa Rican Colón (CRC)", "₡", 0.0018),
            ],
            &live(),
        );

        assert_eq!(overlaid[0].rate_to_eur, 1.25);
        assert_eq!(overlaid[1].rate_to_eur, 0.0018);
    }
}
