use uuid::Uuid;
use warp::reply::Response;
use warp::{Filter, Rejection};

use super::{json, json_body, with_ctx, Route};
use crate::context::AppContext;
use crate::db::{options, trips};
use crate::types::TripOptionPayload;

pub fn routes(ctx: AppContext) -> Route {
    let list = warp::path!("api" / "trips" / Uuid / "options")
        .and(warp::get())
        .and(with_ctx(ctx.clone()))
        .and_then(list_options);

    let create = warp::path!("api" / "trips" / Uuid / "options")
        .and(warp::post())
        .and(with_ctx(ctx))
        .and(json_body())
        .and_then(create_option);

    list.or(create).unify().boxed()
}

async fn list_options(trip_id: Uuid, ctx: AppContext) -> Result<Response, Rejection> {
    trips::require(&ctx.pool, trip_id).await?;
    Ok(json(&options::list_for_trip(&ctx.pool, trip_id).await?))
}

async fn create_option(trip_id: Uuid, ctx: AppContext, payload: TripOptionPayload) -> Result<Response, Rejection> {
    trips::require(&ctx.pool, trip_id).await?;
    let existing = options::count_for_trip(&ctx.pool, trip_id).await?;
    let option = options::insert(&ctx.pool, trip_id, &payload.name_or_default(existing)).await?;
    ctx.cache.invalidate(&trip_id).await;
    Ok(json(&option))
}
