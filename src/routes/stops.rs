use serde::{Deserialize, Serialize};
use uuid::Uuid;
use warp::reply::Response;
use warp::{Filter, Rejection};

use super::{json, json_body, success, with_ctx, Route};
use crate::context::AppContext;
use crate::db::accommodations::{self, Lookups};
use crate::db::{catalog, currencies, stops, trips};
use crate::error::Error;
use crate::itinerary::costs::{accommodation_cost_eur, accommodation_nights};
use crate::itinerary::stops::next_stop_order;
use crate::types::{
    non_blank, Accommodation, AccommodationPayload, AccommodationUpdate, BatchStopUpdate, StopOrder, StopPayload,
    StopType, StopUpdate, StopView, TripStop,
};

#[derive(Debug, Deserialize)]
struct ReorderRequest {
    orders: Vec<StopOrder>,
}

#[derive(Debug, Deserialize)]
struct BatchRequest {
    stops: Vec<BatchStopUpdate>,
}

#[derive(Serialize)]
struct StopsReply {
    success: bool,
    stops: Vec<StopView>,
}

pub fn routes(ctx: AppContext) -> Route {
    let list = warp::path!("api" / "trips" / Uuid / "stops")
        .and(warp::get())
        .and(with_ctx(ctx.clone()))
        .and_then(list_stops);

    let create = warp::path!("api" / "trips" / Uuid / "stops")
        .and(warp::post())
        .and(with_ctx(ctx.clone()))
        .and(json_body())
        .and_then(create_stop);

    let reorder = warp::path!("api" / "trips" / Uuid / "stops" / "reorder")
        .and(warp::put())
        .and(with_ctx(ctx.clone()))
        .and(json_body())
        .and_then(reorder_stops);

    let batch = warp::path!("api" / "trips" / Uuid / "stops" / "batch")
        .and(warp::put())
        .and(with_ctx(ctx.clone()))
        .and(json_body())
        .and_then(batch_update_stops);

    let update = warp::path!("api" / "trips" / Uuid / "stops" / Uuid)
        .and(warp::put())
        .and(with_ctx(ctx.clone()))
        .and(json_body())
        .and_then(update_stop);

    let delete = warp::path!("api" / "trips" / Uuid / "stops" / Uuid)
        .and(warp::delete())
        .and(with_ctx(ctx.clone()))
        .and_then(delete_stop);

    let list_accommodations = warp::path!("api" / "trips" / Uuid / "stops" / Uuid / "accommodations")
        .and(warp::get())
        .and(with_ctx(ctx.clone()))
        .and_then(list_stop_accommodations);

    let create_accommodation = warp::path!("api" / "trips" / Uuid / "stops" / Uuid / "accommodations")
        .and(warp::post())
        .and(with_ctx(ctx.clone()))
        .and(json_body())
        .and_then(add_accommodation);

    let update_accommodation = warp::path!("api" / "trips" / Uuid / "stops" / Uuid / "accommodations" / Uuid)
        .and(warp::put())
        .and(with_ctx(ctx.clone()))
        .and(json_body())
        .and_then(edit_accommodation);

    let delete_accommodation = warp::path!("api" / "trips" / Uuid / "stops" / Uuid / "accommodations" / Uuid)
        .and(warp::delete())
        .and(with_ctx(ctx))
        .and_then(remove_accommodation);

    list.or(create)
        .unify()
        .or(reorder)
        .unify()
        .or(batch)
        .unify()
        .or(update)
        .unify()
        .or(delete)
        .unify()
        .or(list_accommodations)
        .unify()
        .or(create_accommodation)
        .unify()
        .or(update_accommodation)
        .unify()
        .or(delete_accommodation)
        .unify()
        .boxed()
}

async fn stops_reply(ctx: &AppContext, trip_id: Uuid) -> Result<Response, Error> {
    let lookups = Lookups::load(&ctx.pool).await?;
    let stops = stops::views_for_trip(&ctx.pool, trip_id, &lookups).await?;
    Ok(json(&StopsReply { success: true, stops }))
}

async fn list_stops(trip_id: Uuid, ctx: AppContext) -> Result<Response, Rejection> {
    trips::require(&ctx.pool, trip_id).await?;
    let lookups = Lookups::load(&ctx.pool).await?;
    Ok(json(&stops::views_for_trip(&ctx.pool, trip_id, &lookups).await?))
}

async fn create_stop(trip_id: Uuid, ctx: AppContext, payload: StopPayload) -> Result<Response, Rejection> {
    trips::require(&ctx.pool, trip_id).await?;
    let (name, start_date, end_date) = match (non_blank(payload.name), payload.start_date, payload.end_date) {
        (Some(name), Some(start_date), Some(end_date)) => (name, start_date, end_date),
        _ => {
            return Err(Error::BadRequest("Missing required fields (name, startDate, endDate)".to_string()).into())
        }
    };

    let order = match payload.order {
        Some(order) => order,
        None => next_stop_order(&stops::orders_for_trip(&ctx.pool, trip_id).await?),
    };
    let stop = TripStop {
        id: Uuid::new_v4(),
        trip_id,
        name,
        start_date,
        end_date,
        lat: payload.lat,
        lng: payload.lng,
        stop_type: payload.stop_type.unwrap_or(StopType::Stop),
        order,
        selected_accommodation_id: None,
    };

    let stop = stops::insert(&ctx.pool, &stop).await?;
    ctx.cache.invalidate(&trip_id).await;
    Ok(json(&stops::view(&ctx.pool, stop).await?))
}

async fn update_stop(trip_id: Uuid, id: Uuid, ctx: AppContext, update: StopUpdate) -> Result<Response, Rejection> {
    let mut stop = stops::find_in_trip(&ctx.pool, trip_id, id).await?;
    if let Some(Some(accommodation_id)) = update.selected_accommodation_id {
        accommodations::find_in_stop(&ctx.pool, id, accommodation_id)
            .await
            .map_err(|_| Error::BadRequest("Accommodation does not belong to this stop.".to_string()))?;
    }
    update.apply(&mut stop);

    let stop = stops::update(&ctx.pool, &stop).await?;
    ctx.cache.invalidate(&trip_id).await;
    Ok(json(&stops::view(&ctx.pool, stop).await?))
}

async fn delete_stop(trip_id: Uuid, id: Uuid, ctx: AppContext) -> Result<Response, Rejection> {
    stops::find_in_trip(&ctx.pool, trip_id, id).await?;
    stops::delete(&ctx.pool, id).await?;
    ctx.cache.invalidate(&trip_id).await;
    Ok(success())
}

async fn reorder_stops(trip_id: Uuid, ctx: AppContext, request: ReorderRequest) -> Result<Response, Rejection> {
    trips::require(&ctx.pool, trip_id).await?;
    stops::reorder(&ctx.pool, trip_id, &request.orders).await?;
    ctx.cache.invalidate(&trip_id).await;
    Ok(stops_reply(&ctx, trip_id).await?)
}

async fn batch_update_stops(trip_id: Uuid, ctx: AppContext, request: BatchRequest) -> Result<Response, Rejection> {
    trips::require(&ctx.pool, trip_id).await?;
    stops::batch_update(&ctx.pool, trip_id, &request.stops).await?;
    ctx.cache.invalidate(&trip_id).await;
    Ok(stops_reply(&ctx, trip_id).await?)
}

async fn list_stop_accommodations(trip_id: Uuid, stop_id: Uuid, ctx: AppContext) -> Result<Response, Rejection> {
    stops::find_in_trip(&ctx.pool, trip_id, stop_id).await?;
    Ok(json(&accommodations::views_for_stop(&ctx.pool, stop_id).await?))
}

async fn check_room_type(ctx: &AppContext, room_type_id: Option<&str>) -> Result<(), Error> {
    if let Some(id) = room_type_id {
        if catalog::find_room_type(&ctx.pool, id).await?.is_none() {
            return Err(Error::BadRequest("Invalid room type.".to_string()));
        }
    }
    Ok(())
}

async fn add_accommodation(
    trip_id: Uuid,
    stop_id: Uuid,
    ctx: AppContext,
    payload: AccommodationPayload,
) -> Result<Response, Rejection> {
    let stop = stops::find_in_trip(&ctx.pool, trip_id, stop_id).await?;
    let (name, currency_id) = match (non_blank(payload.name), payload.currency_id) {
        (Some(name), Some(currency_id)) => (name, currency_id),
        _ => return Err(Error::BadRequest("Missing required fields (name, currencyId)".to_string()).into()),
    };
    let currency = currencies::require(&ctx.pool, currency_id).await?;
    let room_type_id = non_blank(payload.room_type_id);
    check_room_type(&ctx, room_type_id.as_deref()).await?;

    let nights = accommodation_nights(stop.start_date, stop.end_date);
    let accommodation = Accommodation {
        id: Uuid::new_v4(),
        trip_stop_id: stop_id,
        name,
        provider: non_blank(payload.provider),
        room_type_id,
        nightly_rate: payload.nightly_rate.filter(|rate| *rate != 0.0),
        total_price: payload.total_price.filter(|price| *price != 0.0),
        currency_id,
        total_cost_eur: accommodation_cost_eur(
            payload.total_cost_eur,
            payload.total_price,
            payload.nightly_rate,
            nights,
            currency.rate_to_eur,
        ),
        notes: non_blank(payload.notes),
        url: non_blank(payload.url),
        created_at: chrono::Utc::now(),
    };

    let accommodation = accommodations::insert(&ctx.pool, &accommodation, &payload.images).await?;
    ctx.cache.invalidate(&trip_id).await;
    Ok(json(&accommodations::view(&ctx.pool, accommodation).await?))
}

async fn edit_accommodation(
    trip_id: Uuid,
    stop_id: Uuid,
    id: Uuid,
    ctx: AppContext,
    mut update: AccommodationUpdate,
) -> Result<Response, Rejection> {
    let stop = stops::find_in_trip(&ctx.pool, trip_id, stop_id).await?;
    let mut accommodation = accommodations::find_in_stop(&ctx.pool, stop_id, id).await?;
    if let Some(currency_id) = update.currency_id {
        currencies::require(&ctx.pool, currency_id).await?;
    }

    let reprice = update.changes_cost();
    let explicit_eur = update.total_cost_eur.flatten();
    update.apply(&mut accommodation);
    check_room_type(&ctx, accommodation.room_type_id.as_deref()).await?;

    if reprice {
        let currency = currencies::require(&ctx.pool, accommodation.currency_id).await?;
        accommodation.total_cost_eur = accommodation_cost_eur(
            explicit_eur,
            accommodation.total_price,
            accommodation.nightly_rate,
            accommodation_nights(stop.start_date, stop.end_date),
            currency.rate_to_eur,
        );
    }

    let images = update.images.take();
    let accommodation = accommodations::update(&ctx.pool, &accommodation, images.as_deref()).await?;
    ctx.cache.invalidate(&trip_id).await;
    Ok(json(&accommodations::view(&ctx.pool, accommodation).await?))
}

async fn remove_accommodation(trip_id: Uuid, stop_id: Uuid, id: Uuid, ctx: AppContext) -> Result<Response, Rejection> {
    accommodations::find_in_stop(&ctx.pool, stop_id, id).await?;
    stops::find_in_trip(&ctx.pool, trip_id, stop_id).await?;
    accommodations::delete(&ctx.pool, id).await?;
    ctx.cache.invalidate(&trip_id).await;
    Ok(success())
}
