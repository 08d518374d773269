use std::collections::HashMap;

use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::error::Error;
use crate::types::{CarRental, CarRentalView, CarType, Currency};

pub async fn list_for_trip(executor: impl PgExecutor<'_>, trip_id: Uuid) -> Result<Vec<CarRental>, Error> {
    let rentals = sqlx::query_as(
        "SELECT * FROM car_rentals WHERE trip_id = $1 ORDER BY pickup_date, total_cost_eur",
    )
    .bind(trip_id)
    .fetch_all(executor)
    .await?;
    Ok(rentals)
}

pub async fn car_types_by_id(pool: &PgPool) -> Result<HashMap<String, CarType>, Error> {
    let car_types: Vec<CarType> = sqlx::query_as("SELECT * FROM car_types").fetch_all(pool).await?;
    Ok(car_types.into_iter().map(|t| (t.id.clone(), t)).collect())
}

pub fn view(
    rental: CarRental,
    currencies: &HashMap<Uuid, Currency>,
    car_types: &HashMap<String, CarType>,
) -> CarRentalView {
    CarRentalView {
        currency: currencies.get(&rental.currency_id).cloned(),
        car_type: rental.car_type_id.as_ref().and_then(|id| car_types.get(id)).cloned(),
        rental,
    }
}

pub async fn views_for_trip(
    pool: &PgPool,
    trip_id: Uuid,
    currencies: &HashMap<Uuid, Currency>,
) -> Result<Vec<CarRentalView>, Error> {
    let rentals = list_for_trip(pool, trip_id).await?;
    let car_types = car_types_by_id(pool).await?;
    Ok(rentals
        .into_iter()
        .map(|rental| view(rental, currencies, &car_types))
        .collect())
}

pub async fn find(executor: impl PgExecutor<'_>, id: Uuid) -> Result<Option<CarRental>, Error> {
    let rental = sqlx::query_as("SELECT * FROM car_rentals WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(rental)
}

pub async fn find_in_trip(executor: impl PgExecutor<'_>, trip_id: Uuid, id: Uuid) -> Result<CarRental, Error> {
    let rental = find(executor, id).await?.ok_or_else(|| Error::not_found("Car rental"))?;
    if rental.trip_id != trip_id {
        return Err(Error::BadRequest("Car rental does not belong to this trip.".to_string()));
    }
    Ok(rental)
}

pub async fn insert(executor: impl PgExecutor<'_>, rental: &CarRental) -> Result<CarRental, Error> {
    let rental = sqlx::query_as(
        "INSERT INTO car_rentals (
            id, trip_id, trip_option_id, provider, car_type_id, pickup_date, dropoff_date,
            pickup_location, dropoff_location, base_rate, fees, insurance_per_day,
            currency_id, total_cost_eur, notes, url, image_url
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
        RETURNING *",
    )
    .bind(rental.id)
    .bind(rental.trip_id)
    .bind(rental.trip_option_id)
    .bind(&rental.provider)
    .bind(&rental.car_type_id)
    .bind(rental.pickup_date)
    .bind(rental.dropoff_date)
    .bind(&rental.pickup_location)
    .bind(&rental.dropoff_location)
    .bind(rental.base_rate)
    .bind(rental.fees)
    .bind(rental.insurance_per_day)
    .bind(rental.currency_id)
    .bind(rental.total_cost_eur)
    .bind(&rental.notes)
    .bind(&rental.url)
    .bind(&rental.image_url)
    .fetch_one(executor)
    .await?;
    Ok(rental)
}

/// Rewrites every field except the trip and option assignment.
pub async fn update(executor: impl PgExecutor<'_>, rental: &CarRental) -> Result<CarRental, Error> {
    let rental = sqlx::query_as(
        "UPDATE car_rentals SET
            provider = $2, car_type_id = $3, pickup_date = $4, dropoff_date = $5,
            pickup_location = $6, dropoff_location = $7, base_rate = $8, fees = $9,
            insurance_per_day = $10, currency_id = $11, total_cost_eur = $12,
            notes = $13, url = $14, image_url = $15
        WHERE id = $1 RETURNING *",
    )
    .bind(rental.id)
    .bind(&rental.provider)
    .bind(&rental.car_type_id)
    .bind(rental.pickup_date)
    .bind(rental.dropoff_date)
    .bind(&rental.pickup_location)
    .bind(&rental.dropoff_location)
    .bind(rental.base_rate)
    .bind(rental.fees)
    .bind(rental.insurance_per_day)
    .bind(rental.currency_id)
    .bind(rental.total_cost_eur)
    .bind(&rental.notes)
    .bind(&rental.url)
    .bind(&rental.image_url)
    .fetch_one(executor)
    .await?;
    Ok(rental)
}

pub async fn set_option(executor: impl PgExecutor<'_>, id: Uuid, trip_option_id: Option<Uuid>) -> Result<CarRental, Error> {
    let rental = sqlx::query_as("UPDATE car_rentals SET trip_option_id = $2 WHERE id = $1 RETURNING *")
        .bind(id)
        .bind(trip_option_id)
        .fetch_one(executor)
        .await?;
    Ok(rental)
}

/// Deletes a rental, clearing any trip selection pointing at it first.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("UPDATE trips SET selected_car_rental_id = NULL WHERE selected_car_rental_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM car_rentals WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}
