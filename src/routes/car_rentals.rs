use uuid::Uuid;
use warp::reply::Response;
use warp::{Filter, Rejection};

use super::{json, json_body, success, with_ctx, Route};
use crate::context::AppContext;
use crate::db::{car_rentals, catalog, currencies, options, trips};
use crate::error::Error;
use crate::itinerary::costs::price_rental;
use crate::types::{CarRental, CarRentalPayload, OptionAssignment};

pub fn routes(ctx: AppContext) -> Route {
    let list = warp::path!("api" / "trips" / Uuid / "car-rentals")
        .and(warp::get())
        .and(with_ctx(ctx.clone()))
        .and_then(list_rentals);

    let create = warp::path!("api" / "trips" / Uuid / "car-rentals")
        .and(warp::post())
        .and(with_ctx(ctx.clone()))
        .and(json_body())
        .and_then(create_rental);

    let update = warp::path!("api" / "trips" / Uuid / "car-rentals" / Uuid)
        .and(warp::put().or(warp::patch()).unify())
        .and(with_ctx(ctx.clone()))
        .and(json_body())
        .and_then(update_rental);

    let assign = warp::path!("api" / "trips" / Uuid / "car-rentals" / Uuid / "option")
        .and(warp::patch())
        .and(with_ctx(ctx.clone()))
        .and(json_body())
        .and_then(assign_option);

    let delete = warp::path!("api" / "trips" / Uuid / "car-rentals" / Uuid)
        .and(warp::delete())
        .and(with_ctx(ctx))
        .and_then(delete_rental);

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

async fn list_rentals(trip_id: Uuid, ctx: AppContext) -> Result<Response, Rejection> {
    trips::require(&ctx.pool, trip_id).await?;
    let currencies = currencies::by_id(&ctx.pool).await?;
    Ok(json(&car_rentals::views_for_trip(&ctx.pool, trip_id, &currencies).await?))
}

/// Checks references and prices the rental in EUR.
async fn prepare(ctx: &AppContext, rental: &mut CarRental) -> Result<(), Error> {
    if let Some(car_type_id) = &rental.car_type_id {
        catalog::require_car_type(&ctx.pool, car_type_id).await?;
    }
    if let Some(option_id) = rental.trip_option_id {
        options::require_in_trip(&ctx.pool, rental.trip_id, option_id).await?;
    }
    let currency = currencies::require(&ctx.pool, rental.currency_id).await?;
    price_rental(rental, currency.rate_to_eur);
    Ok(())
}

async fn rental_view(ctx: &AppContext, rental: CarRental) -> Result<Response, Error> {
    let currencies = currencies::by_id(&ctx.pool).await?;
    let car_types = car_rentals::car_types_by_id(&ctx.pool).await?;
    Ok(json(&car_rentals::view(rental, &currencies, &car_types)))
}

async fn create_rental(trip_id: Uuid, ctx: AppContext, payload: CarRentalPayload) -> Result<Response, Rejection> {
    trips::require(&ctx.pool, trip_id).await?;
    let mut rental = payload.into_rental(Uuid::new_v4(), trip_id)?;
    prepare(&ctx, &mut rental).await?;

    let rental = car_rentals::insert(&ctx.pool, &rental).await?;
    ctx.cache.invalidate(&trip_id).await;
    Ok(rental_view(&ctx, rental).await?)
}

async fn update_rental(trip_id: Uuid, id: Uuid, ctx: AppContext, payload: CarRentalPayload) -> Result<Response, Rejection> {
    let existing = car_rentals::find_in_trip(&ctx.pool, trip_id, id).await?;
    let mut rental = payload.into_rental(id, trip_id)?;
    rental.trip_option_id = existing.trip_option_id;
    prepare(&ctx, &mut rental).await?;

    let rental = car_rentals::update(&ctx.pool, &rental).await?;
    ctx.cache.invalidate(&trip_id).await;
    Ok(rental_view(&ctx, rental).await?)
}

async fn assign_option(trip_id: Uuid, id: Uuid, ctx: AppContext, request: OptionAssignment) -> Result<Response, Rejection> {
    car_rentals::find_in_trip(&ctx.pool, trip_id, id).await?;
    let option_id = request.trip_option_id.flatten();
    if let Some(option_id) = option_id {
        options::require_in_trip(&ctx.pool, trip_id, option_id).await?;
    }

    let rental = car_rentals::set_option(&ctx.pool, id, option_id).await?;
    ctx.cache.invalidate(&trip_id).await;
    Ok(json(&rental))
}

async fn delete_rental(trip_id: Uuid, id: Uuid, ctx: AppContext) -> Result<Response, Rejection> {
    car_rentals::find_in_trip(&ctx.pool, trip_id, id).await?;
    car_rentals::delete(&ctx.pool, id).await?;
    ctx.cache.invalidate(&trip_id).await;
    Ok(success())
}
