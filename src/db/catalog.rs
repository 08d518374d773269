use sqlx::{PgExecutor, PgPool};

use crate::error::Error;
use crate::types::{CarType, CatalogQuery, RoomType};

pub const DEFAULT_ROOM_TYPES: [&str; 5] = ["Hotel", "Studio", "Cabin", "House", "Apartment"];

pub async fn car_types(pool: &PgPool, query: &CatalogQuery) -> Result<Vec<CarType>, Error> {
    let pattern = query.needle().map(|needle| format!("%{needle}%"));
    let car_types = sqlx::query_as(
        "SELECT * FROM car_types
         WHERE $1::TEXT IS NULL OR lower(name) LIKE $1 OR lower(id) LIKE $1
         ORDER BY name
         LIMIT $2",
    )
    .bind(pattern)
    .bind(query.limit() as i64)
    .fetch_all(pool)
    .await?;
    Ok(car_types)
}

pub async fn find_car_type(executor: impl PgExecutor<'_>, id: &str) -> Result<Option<CarType>, Error> {
    let car_type = sqlx::query_as("SELECT * FROM car_types WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(car_type)
}

pub async fn require_car_type(executor: impl PgExecutor<'_>, id: &str) -> Result<CarType, Error> {
    find_car_type(executor, id)
        .await?
        .ok_or_else(|| Error::BadRequest("Invalid car type.".to_string()))
}

pub async fn find_room_type(executor: impl PgExecutor<'_>, id: &str) -> Result<Option<RoomType>, Error> {
    let room_type = sqlx::query_as("SELECT * FROM room_types WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(room_type)
}

/// Slug used as the id of a seeded room type, e.g. `Tiny House` -> `tiny-house`.
pub fn room_type_slug(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Adds any missing default room types, then lists all of them by name.
pub async fn room_types(pool: &PgPool) -> Result<Vec<RoomType>, Error> {
    let mut tx = pool.begin().await?;
    for name in DEFAULT_ROOM_TYPES {
        sqlx::query("INSERT INTO room_types (id, name) VALUES ($1, $2) ON CONFLICT DO NOTHING")
            .bind(room_type_slug(name))
            .bind(name)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    let room_types = sqlx::query_as("SELECT * FROM room_types ORDER BY name")
        .fetch_all(pool)
        .await?;
    Ok(room_types)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_are_lowercase_and_dashed() {
        assert_eq!(room_type_slug("Hotel"), "hotel");
        assert_eq!(room_type_slug(" Tiny  House "), "tiny-house");
    }
}
