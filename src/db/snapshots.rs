use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Error;
use crate::types::ComparisonSnapshot;

/// Snapshots of a trip, newest first.
pub async fn list_for_trip(pool: &PgPool, trip_id: Uuid) -> Result<Vec<ComparisonSnapshot>, Error> {
    let snapshots = sqlx::query_as("SELECT * FROM comparison_snapshots WHERE trip_id = $1 ORDER BY created_at DESC")
        .bind(trip_id)
        .fetch_all(pool)
        .await?;
    Ok(snapshots)
}

pub async fn insert(pool: &PgPool, snapshot: &ComparisonSnapshot) -> Result<ComparisonSnapshot, Error> {
    let snapshot = sqlx::query_as(
        "INSERT INTO comparison_snapshots (
            id, trip_id, name, flight_id, car_rental_id, stop_selections, total_cost_eur,
            reasoning, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *",
    )
    .bind(snapshot.id)
    .bind(snapshot.trip_id)
    .bind(&snapshot.name)
    .bind(snapshot.flight_id)
    .bind(snapshot.car_rental_id)
    .bind(&snapshot.stop_selections)
    .bind(snapshot.total_cost_eur)
    .bind(&snapshot.reasoning)
    .bind(snapshot.created_at)
    .fetch_one(pool)
    .await?;
    Ok(snapshot)
}

/// Deletes a snapshot of the trip; 404 when it is not there.
pub async fn delete(pool: &PgPool, trip_id: Uuid, id: Uuid) -> Result<(), Error> {
    let deleted = sqlx::query("DELETE FROM comparison_snapshots WHERE id = $1 AND trip_id = $2")
        .bind(id)
        .bind(trip_id)
        .execute(pool)
        .await?;
    if deleted.rows_affected() == 0 {
        return Err(Error::not_found("Snapshot"));
    }
    Ok(())
}
