use std::collections::HashMap;

use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::{PgExecutor, PgPool, Postgres};
use uuid::Uuid;

use crate::error::Error;
use crate::types::{Currency, Flight, FlightView};

const INSERT: &str = "INSERT INTO flights (
    id, trip_id, trip_option_id, airline, flight_number, from_airport, to_airport,
    departure_date, arrival_date, travel_class, base_fare, extras, currency_id,
    total_cost_eur, booking_url, airline_logo_url, notes, stops, duration_min,
    is_round_trip, return_departure_date, return_arrival_date,
    outbound_duration_min, outbound_net_duration_min, outbound_stopover_min,
    return_duration_min, return_net_duration_min, return_stopover_min,
    stop_over_duration_minutes, stop_over_airports, segments
) VALUES (
    $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
    $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29, $30, $31
) RETURNING *";

const UPDATE: &str = "UPDATE flights SET
    trip_option_id = $2, airline = $3, flight_number = $4, from_airport = $5,
    to_airport = $6, departure_date = $7, arrival_date = $8, travel_class = $9,
    base_fare = $10, extras = $11, currency_id = $12, total_cost_eur = $13,
    booking_url = $14, airline_logo_url = $15, notes = $16, stops = $17,
    duration_min = $18, is_round_trip = $19, return_departure_date = $20,
    return_arrival_date = $21, outbound_duration_min = $22,
    outbound_net_duration_min = $23, outbound_stopover_min = $24,
    return_duration_min = $25, return_net_duration_min = $26,
    return_stopover_min = $27, stop_over_duration_minutes = $28,
    stop_over_airports = $29, segments = $30
WHERE id = $1 RETURNING *";

/// Binds every column after `id` and `trip_id`, in table order.
fn bind_fields<'q>(
    query: Query<'q, Postgres, PgArguments>,
    flight: &'q Flight,
) -> Query<'q, Postgres, PgArguments> {
    query
        .bind(flight.trip_option_id)
        .bind(&flight.airline)
        .bind(&flight.flight_number)
        .bind(&flight.from_airport)
        .bind(&flight.to_airport)
        .bind(flight.departure_date)
        .bind(flight.arrival_date)
        .bind(&flight.travel_class)
        .bind(flight.base_fare)
        .bind(&flight.extras)
        .bind(flight.currency_id)
        .bind(flight.total_cost_eur)
        .bind(&flight.booking_url)
        .bind(&flight.airline_logo_url)
        .bind(&flight.notes)
        .bind(flight.stops)
        .bind(flight.duration_min)
        .bind(flight.is_round_trip)
        .bind(flight.return_departure_date)
        .bind(flight.return_arrival_date)
        .bind(flight.outbound_duration_min)
        .bind(flight.outbound_net_duration_min)
        .bind(flight.outbound_stopover_min)
        .bind(flight.return_duration_min)
        .bind(flight.return_net_duration_min)
        .bind(flight.return_stopover_min)
        .bind(flight.stop_over_duration_minutes)
        .bind(&flight.stop_over_airports)
        .bind(&flight.segments)
}

pub fn view(flight: Flight, currencies: &HashMap<Uuid, Currency>) -> FlightView {
    FlightView {
        currency: currencies.get(&flight.currency_id).cloned(),
        flight,
    }
}

pub async fn list_for_trip(executor: impl PgExecutor<'_>, trip_id: Uuid) -> Result<Vec<Flight>, Error> {
    let flights = sqlx::query_as(
        "SELECT * FROM flights WHERE trip_id = $1 ORDER BY departure_date, total_cost_eur",
    )
    .bind(trip_id)
    .fetch_all(executor)
    .await?;
    Ok(flights)
}

pub async fn views_for_trip(
    pool: &PgPool,
    trip_id: Uuid,
    currencies: &HashMap<Uuid, Currency>,
) -> Result<Vec<FlightView>, Error> {
    let flights = list_for_trip(pool, trip_id).await?;
    Ok(flights.into_iter().map(|flight| view(flight, currencies)).collect())
}

pub async fn find(executor: impl PgExecutor<'_>, id: Uuid) -> Result<Option<Flight>, Error> {
    let flight = sqlx::query_as("SELECT * FROM flights WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(flight)
}

/// Loads a flight addressed through a trip: 404 when it does not exist,
/// 400 when it belongs to another trip.
pub async fn find_in_trip(executor: impl PgExecutor<'_>, trip_id: Uuid, id: Uuid) -> Result<Flight, Error> {
    let flight = find(executor, id).await?.ok_or_else(|| Error::not_found("Flight"))?;
    if flight.trip_id != trip_id {
        return Err(Error::BadRequest("Flight does not belong to this trip.".to_string()));
    }
    Ok(flight)
}

pub async fn insert(executor: impl PgExecutor<'_>, flight: &Flight) -> Result<Flight, Error> {
    let query = sqlx::query(INSERT).bind(flight.id).bind(flight.trip_id);
    let row = bind_fields(query, flight).fetch_one(executor).await?;
    Ok(sqlx::FromRow::from_row(&row)?)
}

pub async fn update(executor: impl PgExecutor<'_>, flight: &Flight) -> Result<Flight, Error> {
    let query = sqlx::query(UPDATE).bind(flight.id);
    let row = bind_fields(query, flight).fetch_one(executor).await?;
    Ok(sqlx::FromRow::from_row(&row)?)
}

pub async fn set_option(executor: impl PgExecutor<'_>, id: Uuid, trip_option_id: Option<Uuid>) -> Result<Flight, Error> {
    let flight = sqlx::query_as("UPDATE flights SET trip_option_id = $2 WHERE id = $1 RETURNING *")
        .bind(id)
        .bind(trip_option_id)
        .fetch_one(executor)
        .await?;
    Ok(flight)
}

/// Deletes a flight, clearing any trip selection pointing at it first.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("UPDATE trips SET selected_flight_id = NULL WHERE selected_flight_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM flights WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}
