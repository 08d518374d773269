use std::collections::HashMap;

use tracing::info;
use uuid::Uuid;
use warp::reply::Response;
use warp::{Filter, Rejection};

use super::{json, json_body, success, with_ctx, Route};
use crate::context::AppContext;
use crate::db::{accommodations, car_rentals, currencies, flights, stops, trips};
use crate::itinerary::costs::{summarize, Stay};
use crate::types::{CreateTrip, FinalCarRental, FinalFlight, TripUpdate};

pub fn routes(ctx: AppContext) -> Route {
    let list = warp::path!("api" / "trips")
        .and(warp::get())
        .and(with_ctx(ctx.clone()))
        .and_then(list_trips);

    let create = warp::path!("api" / "trips")
        .and(warp::post())
        .and(with_ctx(ctx.clone()))
        .and(json_body())
        .and_then(create_trip);

    let get = warp::path!("api" / "trips" / Uuid)
        .and(warp::get())
        .and(with_ctx(ctx.clone()))
        .and_then(get_trip);

    let update = warp::path!("api" / "trips" / Uuid)
        .and(warp::put())
        .and(with_ctx(ctx.clone()))
        .and(json_body())
        .and_then(update_trip);

    let delete = warp::path!("api" / "trips" / Uuid)
        .and(warp::delete())
        .and(with_ctx(ctx.clone()))
        .and_then(delete_trip);

    let final_flight = warp::path!("api" / "trips" / Uuid / "final-flight")
        .and(warp::put())
        .and(with_ctx(ctx.clone()))
        .and(json_body())
        .and_then(set_final_flight);

    let final_car_rental = warp::path!("api" / "trips" / Uuid / "final-car-rental")
        .and(warp::put())
        .and(with_ctx(ctx.clone()))
        .and(json_body())
        .and_then(set_final_car_rental);

    let summary = warp::path!("api" / "trips" / Uuid / "summary")
        .and(warp::get())
        .and(with_ctx(ctx))
        .and_then(trip_summary);

    list.or(create)
        .unify()
        .or(get)
        .unify()
        .or(update)
        .unify()
        .or(delete)
        .unify()
        .or(final_flight)
        .unify()
        .or(final_car_rental)
        .unify()
        .or(summary)
        .unify()
        .boxed()
}

async fn list_trips(ctx: AppContext) -> Result<Response, Rejection> {
    Ok(json(&trips::list(&ctx.pool).await?))
}

async fn create_trip(ctx: AppContext, request: CreateTrip) -> Result<Response, Rejection> {
    let trip = request.into_trip()?;
    currencies::require(&ctx.pool, trip.currency_id).await?;

    let trip = trips::insert(&ctx.pool, &trip).await?;
    info!("created trip {} ({})", trip.id, trip.title);
    Ok(json(&trips::view(&ctx.pool, trip).await?))
}

async fn get_trip(id: Uuid, ctx: AppContext) -> Result<Response, Rejection> {
    let detail = ctx
        .cache
        .try_get_or_load(id, || trips::detail(&ctx.pool, id))
        .await?;
    Ok(json(detail.as_ref()))
}

async fn update_trip(id: Uuid, ctx: AppContext, update: TripUpdate) -> Result<Response, Rejection> {
    let mut trip = trips::require(&ctx.pool, id).await?;
    update.apply(&mut trip)?;
    currencies::require(&ctx.pool, trip.currency_id).await?;

    let trip = trips::update(&ctx.pool, &trip).await?;
    ctx.cache.invalidate(&id).await;
    Ok(json(&trips::view(&ctx.pool, trip).await?))
}

async fn delete_trip(id: Uuid, ctx: AppContext) -> Result<Response, Rejection> {
    trips::delete(&ctx.pool, id).await?;
    ctx.cache.invalidate(&id).await;
    info!("deleted trip {}", id);
    Ok(success())
}

async fn set_final_flight(id: Uuid, ctx: AppContext, request: FinalFlight) -> Result<Response, Rejection> {
    trips::require(&ctx.pool, id).await?;
    let flight_id = request.flight_id.flatten();
    if let Some(flight_id) = flight_id {
        flights::find_in_trip(&ctx.pool, id, flight_id).await?;
    }

    let trip = trips::set_selected_flight(&ctx.pool, id, flight_id).await?;
    ctx.cache.invalidate(&id).await;
    Ok(json(&trips::view(&ctx.pool, trip).await?))
}

async fn set_final_car_rental(id: Uuid, ctx: AppContext, request: FinalCarRental) -> Result<Response, Rejection> {
    trips::require(&ctx.pool, id).await?;
    let car_rental_id = request.car_rental_id.flatten();
    if let Some(car_rental_id) = car_rental_id {
        car_rentals::find_in_trip(&ctx.pool, id, car_rental_id).await?;
    }

    let trip = trips::set_selected_car_rental(&ctx.pool, id, car_rental_id).await?;
    ctx.cache.invalidate(&id).await;
    Ok(json(&trips::view(&ctx.pool, trip).await?))
}

/// Recomputes the trip total from the final selections and stores it.
async fn trip_summary(id: Uuid, ctx: AppContext) -> Result<Response, Rejection> {
    let trip = trips::require(&ctx.pool, id).await?;

    let flight = match trip.selected_flight_id {
        Some(flight_id) => flights::find(&ctx.pool, flight_id).await?,
        None => None,
    };
    let rental = match trip.selected_car_rental_id {
        Some(rental_id) => car_rentals::find(&ctx.pool, rental_id).await?,
        None => None,
    };

    let trip_stops = stops::list_for_trip(&ctx.pool, id).await?;
    let mut selected = HashMap::new();
    for stop in &trip_stops {
        if let Some(accommodation_id) = stop.selected_accommodation_id {
            if let Some(accommodation) = accommodations::find(&ctx.pool, accommodation_id).await? {
                selected.insert(stop.id, accommodation);
            }
        }
    }
    let stays: Vec<Stay<'_>> = trip_stops
        .iter()
        .filter_map(|stop| {
            selected.get(&stop.id).map(|accommodation| Stay {
                stop_name: &stop.name,
                accommodation,
            })
        })
        .collect();

    let summary = summarize(&trip, flight.as_ref(), rental.as_ref(), &stays);
    if summary.total_cost_eur != trip.total_cost_eur {
        trips::set_total_cost(&ctx.pool, id, summary.total_cost_eur).await?;
        ctx.cache.invalidate(&id).await;
    }
    Ok(json(&summary))
}
