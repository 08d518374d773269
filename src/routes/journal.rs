use uuid::Uuid;
use warp::reply::Response;
use warp::{Filter, Rejection};

use super::{json, json_body, success, with_ctx, Route};
use crate::context::AppContext;
use crate::db::{journal, trips};
use crate::types::JournalPayload;

pub fn routes(ctx: AppContext) -> Route {
    let list = warp::path!("api" / "trips" / Uuid / "journal")
        .and(warp::get())
        .and(with_ctx(ctx.clone()))
        .and_then(list_entries);

    let create = warp::path!("api" / "trips" / Uuid / "journal")
        .and(warp::post())
        .and(with_ctx(ctx.clone()))
        .and(json_body())
        .and_then(create_entry);

    let update = warp::path!("api" / "trips" / Uuid / "journal" / Uuid)
        .and(warp::put())
        .and(with_ctx(ctx.clone()))
        .and(json_body())
        .and_then(update_entry);

    let delete = warp::path!("api" / "trips" / Uuid / "journal" / Uuid)
        .and(warp::delete())
        .and(with_ctx(ctx))
        .and_then(delete_entry);

    list.or(create)
        .unify()
        .or(update)
        .unify()
        .or(delete)
        .unify()
        .boxed()
}

async fn list_entries(trip_id: Uuid, ctx: AppContext) -> Result<Response, Rejection> {
    trips::require(&ctx.pool, trip_id).await?;
    Ok(json(&journal::list_for_trip(&ctx.pool, trip_id).await?))
}

async fn create_entry(trip_id: Uuid, ctx: AppContext, payload: JournalPayload) -> Result<Response, Rejection> {
    trips::require(&ctx.pool, trip_id).await?;
    let (date, content) = payload.required()?;
    let entry = journal::insert(&ctx.pool, trip_id, date, content, &payload.photos).await?;
    Ok(json(&entry))
}

async fn update_entry(trip_id: Uuid, id: Uuid, ctx: AppContext, payload: JournalPayload) -> Result<Response, Rejection> {
    journal::find_in_trip(&ctx.pool, trip_id, id).await?;
    let (date, content) = payload.required()?;
    let entry = journal::update(&ctx.pool, id, date, content, &payload.photos).await?;
    Ok(json(&entry))
}

async fn delete_entry(trip_id: Uuid, id: Uuid, ctx: AppContext) -> Result<Response, Rejection> {
    journal::find_in_trip(&ctx.pool, trip_id, id).await?;
    journal::delete(&ctx.pool, id).await?;
    Ok(success())
}
