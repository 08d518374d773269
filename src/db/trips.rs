use sqlx::{PgExecutor, PgPool};
use tracing::warn;
use uuid::Uuid;

use super::accommodations::Lookups;
use super::{car_rentals, flights, options, stops};
use crate::error::Error;
use crate::types::{Trip, TripDetail, TripView};

pub async fn list(pool: &PgPool) -> Result<Vec<TripView>, Error> {
    let trips: Vec<Trip> = sqlx::query_as("SELECT * FROM trips ORDER BY start_date, created_at")
        .fetch_all(pool)
        .await?;
    let currencies = super::currencies::by_id(pool).await?;

    Ok(trips
        .into_iter()
        .map(|trip| TripView {
            currency: currencies.get(&trip.currency_id).cloned(),
            trip,
            selected_flight: None,
            selected_car_rental: None,
        })
        .collect())
}

pub async fn find(executor: impl PgExecutor<'_>, id: Uuid) -> Result<Option<Trip>, Error> {
    let trip = sqlx::query_as("SELECT * FROM trips WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(trip)
}

pub async fn require(executor: impl PgExecutor<'_>, id: Uuid) -> Result<Trip, Error> {
    find(executor, id).await?.ok_or_else(|| Error::not_found("Trip"))
}

/// Trip with its currency and current selections.
pub async fn view(pool: &PgPool, trip: Trip) -> Result<TripView, Error> {
    let currencies = super::currencies::by_id(pool).await?;

    let selected_flight = match trip.selected_flight_id {
        Some(id) => flights::find(pool, id).await?.map(|f| flights::view(f, &currencies)),
        None => None,
    };
    let selected_car_rental = match trip.selected_car_rental_id {
        Some(id) => match car_rentals::find(pool, id).await? {
            Some(rental) => {
                let car_types = car_rentals::car_types_by_id(pool).await?;
                Some(car_rentals::view(rental, &currencies, &car_types))
            }
            None => None,
        },
        None => None,
    };

    Ok(TripView {
        currency: currencies.get(&trip.currency_id).cloned(),
        trip,
        selected_flight,
        selected_car_rental,
    })
}

/// Everything planned for a trip, in display order.
pub async fn detail(pool: &PgPool, id: Uuid) -> Result<TripDetail, Error> {
    let trip = require(pool, id).await?;
    let lookups = Lookups::load(pool).await?;

    let flights = flights::views_for_trip(pool, id, &lookups.currencies).await?;
    let car_rentals = car_rentals::views_for_trip(pool, id, &lookups.currencies).await?;
    let trip_stops = stops::views_for_trip(pool, id, &lookups).await?;
    let trip_options = options::list_for_trip(pool, id).await?;

    Ok(TripDetail {
        currency: lookups.currencies.get(&trip.currency_id).cloned(),
        trip,
        flights,
        car_rentals,
        trip_stops,
        trip_options,
    })
}

pub async fn insert(pool: &PgPool, trip: &Trip) -> Result<Trip, Error> {
    let created: Trip = sqlx::query_as(
        "INSERT INTO trips (
            id, title, start_date, end_date, people, total_cost_eur, image_url, currency_id,
            start_location_name, start_lat, start_lng, end_location_name, end_lat, end_lng,
            split_flight_cost, split_car_rental_cost, split_accommodation_cost,
            selected_flight_id, selected_car_rental_id, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
        RETURNING *",
    )
    .bind(trip.id)
    .bind(&trip.title)
    .bind(trip.start_date)
    .bind(trip.end_date)
    .bind(trip.people)
    .bind(trip.total_cost_eur)
    .bind(&trip.image_url)
    .bind(trip.currency_id)
    .bind(&trip.start_location_name)
    .bind(trip.start_lat)
    .bind(trip.start_lng)
    .bind(&trip.end_location_name)
    .bind(trip.end_lat)
    .bind(trip.end_lng)
    .bind(trip.split_flight_cost)
    .bind(trip.split_car_rental_cost)
    .bind(trip.split_accommodation_cost)
    .bind(trip.selected_flight_id)
    .bind(trip.selected_car_rental_id)
    .bind(trip.created_at)
    .fetch_one(pool)
    .await?;

    sync_hubs(pool, &created).await;
    Ok(created)
}

/// Writes every editable column. Selections and the cost total have their own setters.
pub async fn update(pool: &PgPool, trip: &Trip) -> Result<Trip, Error> {
    let updated: Trip = sqlx::query_as(
        "UPDATE trips SET
            title = $2, start_date = $3, end_date = $4, people = $5, image_url = $6,
            currency_id = $7, start_location_name = $8, start_lat = $9, start_lng = $10,
            end_location_name = $11, end_lat = $12, end_lng = $13, split_flight_cost = $14,
            split_car_rental_cost = $15, split_accommodation_cost = $16
        WHERE id = $1 RETURNING *",
    )
    .bind(trip.id)
    .bind(&trip.title)
    .bind(trip.start_date)
    .bind(trip.end_date)
    .bind(trip.people)
    .bind(&trip.image_url)
    .bind(trip.currency_id)
    .bind(&trip.start_location_name)
    .bind(trip.start_lat)
    .bind(trip.start_lng)
    .bind(&trip.end_location_name)
    .bind(trip.end_lat)
    .bind(trip.end_lng)
    .bind(trip.split_flight_cost)
    .bind(trip.split_car_rental_cost)
    .bind(trip.split_accommodation_cost)
    .fetch_one(pool)
    .await?;

    sync_hubs(pool, &updated).await;
    Ok(updated)
}

/// HUB maintenance never fails the trip write that triggered it.
async fn sync_hubs(pool: &PgPool, trip: &Trip) {
    let result: Result<(), Error> = async {
        let mut tx = pool.begin().await?;
        stops::upsert_hubs(&mut tx, trip).await?;
        tx.commit().await?;
        Ok(())
    }
    .await;

    if let Err(e) = result {
        warn!("failed to sync hub stops for trip {}: {}", trip.id, e);
    }
}

pub async fn set_selected_flight(pool: &PgPool, id: Uuid, flight_id: Option<Uuid>) -> Result<Trip, Error> {
    let trip = sqlx::query_as("UPDATE trips SET selected_flight_id = $2 WHERE id = $1 RETURNING *")
        .bind(id)
        .bind(flight_id)
        .fetch_one(pool)
        .await?;
    Ok(trip)
}

pub async fn set_selected_car_rental(pool: &PgPool, id: Uuid, car_rental_id: Option<Uuid>) -> Result<Trip, Error> {
    let trip = sqlx::query_as("UPDATE trips SET selected_car_rental_id = $2 WHERE id = $1 RETURNING *")
        .bind(id)
        .bind(car_rental_id)
        .fetch_one(pool)
        .await?;
    Ok(trip)
}

pub async fn set_total_cost(pool: &PgPool, id: Uuid, total_cost_eur: f64) -> Result<(), Error> {
    sqlx::query("UPDATE trips SET total_cost_eur = $2 WHERE id = $1")
        .bind(id)
        .bind(total_cost_eur)
        .execute(pool)
        .await?;
    Ok(())
}

/// Removes a trip and everything planned under it. Selections pointing into
/// the trip are cleared first so the cascade can run.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), Error> {
    let mut tx = pool.begin().await?;
    require(&mut *tx, id).await?;

    sqlx::query("UPDATE trips SET selected_flight_id = NULL, selected_car_rental_id = NULL WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("UPDATE trip_stops SET selected_accommodation_id = NULL WHERE trip_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM trips WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}
