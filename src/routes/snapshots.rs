use uuid::Uuid;
use warp::reply::Response;
use warp::{Filter, Rejection};

use super::{json, json_body, success, with_ctx, Route};
use crate::context::AppContext;
use crate::db::{snapshots, trips};
use crate::types::SnapshotPayload;

pub fn routes(ctx: AppContext) -> Route {
    let list = warp::path!("api" / "trips" / Uuid / "snapshots")
        .and(warp::get())
        .and(with_ctx(ctx.clone()))
        .and_then(list_snapshots);

    let create = warp::path!("api" / "trips" / Uuid / "snapshots")
        .and(warp::post())
        .and(with_ctx(ctx.clone()))
        .and(json_body())
        .and_then(create_snapshot);

    let delete = warp::path!("api" / "trips" / Uuid / "snapshots" / Uuid)
        .and(warp::delete())
        .and(with_ctx(ctx))
        .and_then(delete_snapshot);

    list.or(create).unify().or(delete).unify().boxed()
}

async fn list_snapshots(trip_id: Uuid, ctx: AppContext) -> Result<Response, Rejection> {
    trips::require(&ctx.pool, trip_id).await?;
    Ok(json(&snapshots::list_for_trip(&ctx.pool, trip_id).await?))
}

async fn create_snapshot(trip_id: Uuid, ctx: AppContext, payload: SnapshotPayload) -> Result<Response, Rejection> {
    trips::require(&ctx.pool, trip_id).await?;
    let snapshot = payload.into_snapshot(trip_id)?;
    Ok(json(&snapshots::insert(&ctx.pool, &snapshot).await?))
}

async fn delete_snapshot(trip_id: Uuid, id: Uuid, ctx: AppContext) -> Result<Response, Rejection> {
    snapshots::delete(&ctx.pool, trip_id, id).await?;
    Ok(success())
}
