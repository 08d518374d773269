use sqlx::{PgConnection, PgExecutor, PgPool};
use uuid::Uuid;

use super::accommodations::{self, Lookups};
use crate::error::Error;
use crate::itinerary::stops::{check_reorder, hub_stops, sort_itinerary};
use crate::types::{BatchStopUpdate, StopOrder, StopType, StopView, Trip, TripStop};

pub async fn list_for_trip(executor: impl PgExecutor<'_>, trip_id: Uuid) -> Result<Vec<TripStop>, Error> {
    let mut stops: Vec<TripStop> = sqlx::query_as("SELECT * FROM trip_stops WHERE trip_id = $1")
        .bind(trip_id)
        .fetch_all(executor)
        .await?;
    sort_itinerary(&mut stops);
    Ok(stops)
}

/// Stops of a trip in itinerary order, each with its accommodations.
pub async fn views_for_trip(pool: &PgPool, trip_id: Uuid, lookups: &Lookups) -> Result<Vec<StopView>, Error> {
    let stops = list_for_trip(pool, trip_id).await?;
    let ids: Vec<Uuid> = stops.iter().map(|stop| stop.id).collect();
    let mut accommodations = accommodations::views_for_stops(pool, &ids, lookups).await?;

    let views = stops
        .into_iter()
        .map(|stop| {
            let accommodations = accommodations.remove(&stop.id).unwrap_or_default();
            let selected_accommodation = stop.selected_accommodation_id.and_then(|selected| {
                accommodations
                    .iter()
                    .find(|view| view.accommodation.id == selected)
                    .cloned()
            });
            StopView {
                stop,
                accommodations,
                selected_accommodation,
            }
        })
        .collect();
    Ok(views)
}

pub async fn view(pool: &PgPool, stop: TripStop) -> Result<StopView, Error> {
    let accommodations = accommodations::views_for_stop(pool, stop.id).await?;
    let selected_accommodation = stop.selected_accommodation_id.and_then(|selected| {
        accommodations
            .iter()
            .find(|view| view.accommodation.id == selected)
            .cloned()
    });
    Ok(StopView {
        stop,
        accommodations,
        selected_accommodation,
    })
}

pub async fn find_in_trip(executor: impl PgExecutor<'_>, trip_id: Uuid, id: Uuid) -> Result<TripStop, Error> {
    let stop: Option<TripStop> = sqlx::query_as("SELECT * FROM trip_stops WHERE id = $1 AND trip_id = $2")
        .bind(id)
        .bind(trip_id)
        .fetch_optional(executor)
        .await?;
    stop.ok_or_else(|| Error::not_found("Stop"))
}

pub async fn orders_for_trip(executor: impl PgExecutor<'_>, trip_id: Uuid) -> Result<Vec<i32>, Error> {
    let orders = sqlx::query_scalar("SELECT sort_order FROM trip_stops WHERE trip_id = $1")
        .bind(trip_id)
        .fetch_all(executor)
        .await?;
    Ok(orders)
}

pub async fn insert(executor: impl PgExecutor<'_>, stop: &TripStop) -> Result<TripStop, Error> {
    let stop = sqlx::query_as(
        "INSERT INTO trip_stops (
            id, trip_id, name, start_date, end_date, lat, lng, stop_type, sort_order,
            selected_accommodation_id
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *",
    )
    .bind(stop.id)
    .bind(stop.trip_id)
    .bind(&stop.name)
    .bind(stop.start_date)
    .bind(stop.end_date)
    .bind(stop.lat)
    .bind(stop.lng)
    .bind(stop.stop_type)
    .bind(stop.order)
    .bind(stop.selected_accommodation_id)
    .fetch_one(executor)
    .await?;
    Ok(stop)
}

pub async fn update(executor: impl PgExecutor<'_>, stop: &TripStop) -> Result<TripStop, Error> {
    let stop = sqlx::query_as(
        "UPDATE trip_stops SET
            name = $2, start_date = $3, end_date = $4, lat = $5, lng = $6,
            stop_type = $7, sort_order = $8, selected_accommodation_id = $9
        WHERE id = $1 RETURNING *",
    )
    .bind(stop.id)
    .bind(&stop.name)
    .bind(stop.start_date)
    .bind(stop.end_date)
    .bind(stop.lat)
    .bind(stop.lng)
    .bind(stop.stop_type)
    .bind(stop.order)
    .bind(stop.selected_accommodation_id)
    .fetch_one(executor)
    .await
    .map_err(|e| super::referenced(e, "Invalid accommodation."))?;
    Ok(stop)
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("UPDATE trip_stops SET selected_accommodation_id = NULL WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM trip_stops WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

/// Applies new positions in one transaction. Ids outside the trip fail the
/// whole request before anything is written.
pub async fn reorder(pool: &PgPool, trip_id: Uuid, orders: &[StopOrder]) -> Result<(), Error> {
    let batch: Vec<BatchStopUpdate> = orders
        .iter()
        .map(|order| BatchStopUpdate {
            id: order.id,
            order: order.order,
            start_date: None,
            end_date: None,
        })
        .collect();
    batch_update(pool, trip_id, &batch).await
}

/// Applies new positions and optional dates in one transaction.
pub async fn batch_update(pool: &PgPool, trip_id: Uuid, updates: &[BatchStopUpdate]) -> Result<(), Error> {
    let mut tx = pool.begin().await?;
    let existing = list_for_trip(&mut *tx, trip_id).await?;
    check_reorder(&existing, updates.iter().map(|update| &update.id))?;

    for update in updates {
        sqlx::query(
            "UPDATE trip_stops SET
                sort_order = $3,
                start_date = COALESCE($4, start_date),
                end_date = COALESCE($5, end_date)
            WHERE id = $1 AND trip_id = $2",
        )
        .bind(update.id)
        .bind(trip_id)
        .bind(update.order)
        .bind(update.start_date)
        .bind(update.end_date)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}

/// Creates or refreshes the start and end HUBs of `trip`.
pub async fn upsert_hubs(conn: &mut PgConnection, trip: &Trip) -> Result<(), Error> {
    for hub in hub_stops(trip) {
        let updated = sqlx::query(
            "UPDATE trip_stops SET name = $3, start_date = $4, end_date = $4, lat = $5, lng = $6
             WHERE trip_id = $1 AND stop_type = $2 AND sort_order = $7",
        )
        .bind(trip.id)
        .bind(StopType::Hub)
        .bind(&hub.name)
        .bind(hub.date)
        .bind(hub.lat)
        .bind(hub.lng)
        .bind(hub.order)
        .execute(&mut *conn)
        .await?;

        if updated.rows_affected() == 0 {
            insert(&mut *conn, &hub.into_stop(trip.id)).await?;
        }
    }
    Ok(())
}
