use tracing::info;
use uuid::Uuid;
use warp::reply::Response;
use warp::{Filter, Rejection};

use super::{json, json_body, success, with_ctx, Route};
use crate::context::AppContext;
use crate::db::{currencies, flights, options, trips};
use crate::itinerary::derivation::{apply_update, build_flight};
use crate::types::{CreateFlight, FlightUpdate, OptionAssignment};

pub fn routes(ctx: AppContext) -> Route {
    let list = warp::path!("api" / "trips" / Uuid / "flights")
        .and(warp::get())
        .and(with_ctx(ctx.clone()))
        .and_then(list_flights);

    let create = warp::path!("api" / "trips" / Uuid / "flights")
        .and(warp::post())
        .and(with_ctx(ctx.clone()))
        .and(json_body())
        .and_then(create_flight);

    let update = warp::path!("api" / "trips" / Uuid / "flights" / Uuid)
        .and(warp::put().or(warp::patch()).unify())
        .and(with_ctx(ctx.clone()))
        .and(json_body())
        .and_then(update_flight);

    let assign = warp::path!("api" / "trips" / Uuid / "flights" / Uuid / "option")
        .and(warp::patch())
        .and(with_ctx(ctx.clone()))
        .and(json_body())
        .and_then(assign_option);

    let delete = warp::path!("api" / "trips" / Uuid / "flights" / Uuid)
        .and(warp::delete())
        .and(with_ctx(ctx))
        .and_then(delete_flight);

    list.or(create)
        .unify()
        .or(update)
        .unify()
        .or(assign)
        .unify()
        .or(delete)
        .unify()
        .boxed()
}

async fn list_flights(trip_id: Uuid, ctx: AppContext) -> Result<Response, Rejection> {
    trips::require(&ctx.pool, trip_id).await?;
    let currencies = currencies::by_id(&ctx.pool).await?;
    Ok(json(&flights::views_for_trip(&ctx.pool, trip_id, &currencies).await?))
}

async fn create_flight(trip_id: Uuid, ctx: AppContext, request: CreateFlight) -> Result<Response, Rejection> {
    trips::require(&ctx.pool, trip_id).await?;
    let flight = build_flight(trip_id, request)?;
    let currency = currencies::require(&ctx.pool, flight.currency_id).await?;
    if let Some(option_id) = flight.trip_option_id {
        options::require_in_trip(&ctx.pool, trip_id, option_id).await?;
    }

    let flight = flights::insert(&ctx.pool, &flight).await?;
    ctx.cache.invalidate(&trip_id).await;
    info!("added flight {} {}→{} to trip {}", flight.id, flight.from_airport, flight.to_airport, trip_id);

    let currencies = [(currency.id, currency)].into_iter().collect();
    Ok(json(&flights::view(flight, &currencies)))
}

async fn update_flight(trip_id: Uuid, id: Uuid, ctx: AppContext, update: FlightUpdate) -> Result<Response, Rejection> {
    let mut flight = flights::find_in_trip(&ctx.pool, trip_id, id).await?;
    if let Some(currency_id) = update.currency_id {
        currencies::require(&ctx.pool, currency_id).await?;
    }
    apply_update(&mut flight, update);

    let flight = flights::update(&ctx.pool, &flight).await?;
    ctx.cache.invalidate(&trip_id).await;

    let currencies = currencies::by_id(&ctx.pool).await?;
    Ok(json(&flights::view(flight, &currencies)))
}

async fn assign_option(trip_id: Uuid, id: Uuid, ctx: AppContext, request: OptionAssignment) -> Result<Response, Rejection> {
    flights::find_in_trip(&ctx.pool, trip_id, id).await?;
    let option_id = request.trip_option_id.flatten();
    if let Some(option_id) = option_id {
        options::require_in_trip(&ctx.pool, trip_id, option_id).await?;
    }

    let flight = flights::set_option(&ctx.pool, id, option_id).await?;
    ctx.cache.invalidate(&trip_id).await;
    Ok(json(&flight))
}

async fn delete_flight(trip_id: Uuid, id: Uuid, ctx: AppContext) -> Result<Response, Rejection> {
    flights::find_in_trip(&ctx.pool, trip_id, id).await?;
    flights::delete(&ctx.pool, id).await?;
    ctx.cache.invalidate(&trip_id).await;
    Ok(success())
}
