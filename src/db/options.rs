use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::error::Error;
use crate::types::TripOption;

pub async fn list_for_trip(executor: impl PgExecutor<'_>, trip_id: Uuid) -> Result<Vec<TripOption>, Error> {
    let options = sqlx::query_as("SELECT * FROM trip_options WHERE trip_id = $1 ORDER BY created_at")
        .bind(trip_id)
        .fetch_all(executor)
        .await?;
    Ok(options)
}

pub async fn count_for_trip(executor: impl PgExecutor<'_>, trip_id: Uuid) -> Result<i64, Error> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM trip_options WHERE trip_id = $1")
        .bind(trip_id)
        .fetch_one(executor)
        .await?;
    Ok(count)
}

/// Checks that an option assigned to a flight or rental belongs to the same trip.
pub async fn require_in_trip(executor: impl PgExecutor<'_>, trip_id: Uuid, id: Uuid) -> Result<(), Error> {
    let found: Option<Uuid> = sqlx::query_scalar("SELECT id FROM trip_options WHERE id = $1 AND trip_id = $2")
        .bind(id)
        .bind(trip_id)
        .fetch_optional(executor)
        .await?;
    found
        .map(|_| ())
        .ok_or_else(|| Error::BadRequest("Invalid trip option.".to_string()))
}

pub async fn insert(pool: &PgPool, trip_id: Uuid, name: &str) -> Result<TripOption, Error> {
    let option = sqlx::query_as(
        "INSERT INTO trip_options (id, trip_id, name) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(trip_id)
    .bind(name)
    .fetch_one(pool)
    .await?;
    Ok(option)
}
