use tracing::{info, warn};
use uuid::Uuid;
use warp::reply::Response;
use warp::{Filter, Rejection};

use super::{json, json_body, with_ctx, Route};
use crate::context::AppContext;
use crate::db::currencies;
use crate::rate_sync_job::{sync_rates, with_live_rates};
use crate::types::{CurrencyPayload, CurrencyUpdate};

#[derive(serde::Serialize)]
struct SyncReply {
    success: bool,
    updated: usize,
}

pub fn routes(ctx: AppContext) -> Route {
    let list = warp::path!("api" / "currencies")
        .and(warp::get())
        .and(with_ctx(ctx.clone()))
        .and_then(list_currencies);

    let create = warp::path!("api" / "currencies")
        .and(warp::post())
        .and(with_ctx(ctx.clone()))
        .and(json_body())
        .and_then(create_currency);

    let sync = warp::path!("api" / "currencies" / "sync")
        .and(warp::post())
        .and(with_ctx(ctx.clone()))
        .and_then(sync_currencies);

    let update = warp::path!("api" / "currencies" / Uuid)
        .and(warp::put())
        .and(with_ctx(ctx.clone()))
        .and(json_body())
        .and_then(update_currency);

    let delete = warp::path!("api" / "currencies" / Uuid)
        .and(warp::delete())
        .and(with_ctx(ctx))
        .and_then(delete_currency);

    list.or(create)
        .unify()
        .or(sync)
        .unify()
        .or(update)
        .unify()
        .or(delete)
        .unify()
        .boxed()
}

/// Stored currencies with live rates overlaid when the rates API answers.
async fn list_currencies(ctx: AppContext) -> Result<Response, Rejection> {
    let stored = currencies::list(&ctx.pool).await?;
    match ctx.rates.latest_eur_rates().await {
        Ok(live) => Ok(json(&with_live_rates(stored, &live))),
        Err(e) => {
            warn!("failed to fetch live exchange rates, serving stored rates: {}", e);
            Ok(json(&stored))
        }
    }
}

async fn create_currency(ctx: AppContext, payload: CurrencyPayload) -> Result<Response, Rejection> {
    let currency = currencies::insert(&ctx.pool, payload).await?;
    Ok(json(&currency))
}

async fn update_currency(id: Uuid, ctx: AppContext, update: CurrencyUpdate) -> Result<Response, Rejection> {
    let currency = currencies::update(&ctx.pool, id, update).await?;
    ctx.cache.invalidate_all();
    Ok(json(&currency))
}

async fn delete_currency(id: Uuid, ctx: AppContext) -> Result<Response, Rejection> {
    let currency = currencies::delete(&ctx.pool, id).await?;
    ctx.cache.invalidate_all();
    Ok(json(&currency))
}

async fn sync_currencies(ctx: AppContext) -> Result<Response, Rejection> {
    let updated = sync_rates(&ctx.pool, &ctx.rates).await?;
    ctx.cache.invalidate_all();
    info!("synced exchange rates for {} currencies", updated);
    Ok(json(&SyncReply { success: true, updated }))
}
