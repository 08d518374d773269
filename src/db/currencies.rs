use std::collections::HashMap;

use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::error::Error;
use crate::types::{Currency, CurrencyPayload, CurrencyUpdate};

pub async fn list(pool: &PgPool) -> Result<Vec<Currency>, Error> {
    let currencies = sqlx::query_as("SELECT * FROM currencies ORDER BY name")
        .fetch_all(pool)
        .await?;
    Ok(currencies)
}

pub async fn by_id(pool: &PgPool) -> Result<HashMap<Uuid, Currency>, Error> {
    Ok(list(pool).await?.into_iter().map(|c| (c.id, c)).collect())
}

pub async fn find(executor: impl PgExecutor<'_>, id: Uuid) -> Result<Option<Currency>, Error> {
    let currency = sqlx::query_as("SELECT * FROM currencies WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(currency)
}

/// Looks up a currency referenced by a request body.
pub async fn require(executor: impl PgExecutor<'_>, id: Uuid) -> Result<Currency, Error> {
    find(executor, id)
        .await?
        .ok_or_else(|| Error::BadRequest("Invalid currency.".to_string()))
}

pub async fn insert(pool: &PgPool, payload: CurrencyPayload) -> Result<Currency, Error> {
    let name = payload.name.trim();
    let symbol = payload.symbol.trim();
    if name.is_empty() || symbol.is_empty() {
        return Err(Error::BadRequest("Name and symbol are required.".to_string()));
    }

    let currency = sqlx::query_as(
        "INSERT INTO currencies (id, name, symbol, rate_to_eur) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(symbol)
    .bind(payload.rate_to_eur.unwrap_or(1.0))
    .fetch_one(pool)
    .await
    .map_err(|e| unique_symbol(e, symbol))?;
    Ok(currency)
}

pub async fn update(pool: &PgPool, id: Uuid, update: CurrencyUpdate) -> Result<Currency, Error> {
    let mut currency = find(pool, id).await?.ok_or_else(|| Error::not_found("Currency"))?;
    if let Some(name) = update.name {
        currency.name = name;
    }
    if let Some(symbol) = update.symbol {
        currency.symbol = symbol;
    }
    if let Some(rate) = update.rate_to_eur {
        currency.rate_to_eur = rate;
    }

    let currency = sqlx::query_as(
        "UPDATE currencies SET name = $2, symbol = $3, rate_to_eur = $4 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&currency.name)
    .bind(&currency.symbol)
    .bind(currency.rate_to_eur)
    .fetch_one(pool)
    .await
    .map_err(|e| unique_symbol(e, &currency.symbol))?;
    Ok(currency)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<Currency, Error> {
    sqlx::query_as("DELETE FROM currencies WHERE id = $1 RETURNING *")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| super::referenced(e, "Currency is still in use."))?
        .ok_or_else(|| Error::not_found("Currency"))
}

pub async fn set_rate(executor: impl PgExecutor<'_>, id: Uuid, rate_to_eur: f64) -> Result<(), Error> {
    sqlx::query("UPDATE currencies SET rate_to_eur = $2 WHERE id = $1")
        .bind(id)
        .bind(rate_to_eur)
        .execute(executor)
        .await?;
    Ok(())
}

fn unique_symbol(error: sqlx::Error, symbol: &str) -> Error {
    match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            Error::BadRequest(format!("A currency with symbol {symbol} already exists."))
        }
        _ => Error::Database(error),
    }
}
