use std::collections::HashMap;

use sqlx::{PgConnection, PgExecutor, PgPool};
use uuid::Uuid;

use crate::error::Error;
use crate::types::{Accommodation, AccommodationImage, AccommodationView, Currency, RoomType};

/// Lookup tables needed to turn accommodation rows into views.
pub struct Lookups {
    pub currencies: HashMap<Uuid, Currency>,
    pub room_types: HashMap<String, RoomType>,
}

impl Lookups {
    pub async fn load(pool: &PgPool) -> Result<Self, Error> {
        let currencies = super::currencies::by_id(pool).await?;
        let room_types: Vec<RoomType> = sqlx::query_as("SELECT * FROM room_types").fetch_all(pool).await?;
        Ok(Self {
            currencies,
            room_types: room_types.into_iter().map(|r| (r.id.clone(), r)).collect(),
        })
    }

    pub fn view(&self, accommodation: Accommodation, images: Vec<AccommodationImage>) -> AccommodationView {
        AccommodationView {
            currency: self.currencies.get(&accommodation.currency_id).cloned(),
            room_type: accommodation
                .room_type_id
                .as_ref()
                .and_then(|id| self.room_types.get(id))
                .cloned(),
            images,
            accommodation,
        }
    }
}

async fn images_for(executor: impl PgExecutor<'_>, ids: &[Uuid]) -> Result<Vec<AccommodationImage>, Error> {
    let images = sqlx::query_as(
        "SELECT * FROM accommodation_images WHERE accommodation_id = ANY($1) ORDER BY url",
    )
    .bind(ids)
    .fetch_all(executor)
    .await?;
    Ok(images)
}

/// Accommodation views of the given stops, grouped by stop id, oldest first.
pub async fn views_for_stops(
    pool: &PgPool,
    stop_ids: &[Uuid],
    lookups: &Lookups,
) -> Result<HashMap<Uuid, Vec<AccommodationView>>, Error> {
    let accommodations: Vec<Accommodation> = sqlx::query_as(
        "SELECT * FROM accommodations WHERE trip_stop_id = ANY($1) ORDER BY created_at",
    )
    .bind(stop_ids)
    .fetch_all(pool)
    .await?;

    let ids: Vec<Uuid> = accommodations.iter().map(|a| a.id).collect();
    let mut images: HashMap<Uuid, Vec<AccommodationImage>> = HashMap::new();
    for image in images_for(pool, &ids).await? {
        images.entry(image.accommodation_id).or_default().push(image);
    }

    let mut by_stop: HashMap<Uuid, Vec<AccommodationView>> = HashMap::new();
    for accommodation in accommodations {
        let stop_images = images.remove(&accommodation.id).unwrap_or_default();
        by_stop
            .entry(accommodation.trip_stop_id)
            .or_default()
            .push(lookups.view(accommodation, stop_images));
    }
    Ok(by_stop)
}

pub async fn views_for_stop(pool: &PgPool, stop_id: Uuid) -> Result<Vec<AccommodationView>, Error> {
    let lookups = Lookups::load(pool).await?;
    let mut by_stop = views_for_stops(pool, &[stop_id], &lookups).await?;
    Ok(by_stop.remove(&stop_id).unwrap_or_default())
}

pub async fn find(executor: impl PgExecutor<'_>, id: Uuid) -> Result<Option<Accommodation>, Error> {
    let accommodation = sqlx::query_as("SELECT * FROM accommodations WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(accommodation)
}

pub async fn find_in_stop(executor: impl PgExecutor<'_>, stop_id: Uuid, id: Uuid) -> Result<Accommodation, Error> {
    find(executor, id)
        .await?
        .filter(|accommodation| accommodation.trip_stop_id == stop_id)
        .ok_or_else(|| Error::not_found("Accommodation"))
}

/// Loads one accommodation as a view, with its images.
pub async fn view(pool: &PgPool, accommodation: Accommodation) -> Result<AccommodationView, Error> {
    let lookups = Lookups::load(pool).await?;
    let images = images_for(pool, &[accommodation.id]).await?;
    Ok(lookups.view(accommodation, images))
}

async fn replace_images(conn: &mut PgConnection, id: Uuid, urls: &[String]) -> Result<(), Error> {
    sqlx::query("DELETE FROM accommodation_images WHERE accommodation_id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    for url in urls.iter().map(|url| url.trim()).filter(|url| !url.is_empty()) {
        sqlx::query("INSERT INTO accommodation_images (id, accommodation_id, url) VALUES ($1, $2, $3)")
            .bind(Uuid::new_v4())
            .bind(id)
            .bind(url)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

pub async fn insert(pool: &PgPool, accommodation: &Accommodation, images: &[String]) -> Result<Accommodation, Error> {
    let mut tx = pool.begin().await?;
    let created: Accommodation = sqlx::query_as(
        "INSERT INTO accommodations (
            id, trip_stop_id, name, provider, room_type_id, nightly_rate, total_price,
            currency_id, total_cost_eur, notes, url, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING *",
    )
    .bind(accommodation.id)
    .bind(accommodation.trip_stop_id)
    .bind(&accommodation.name)
    .bind(&accommodation.provider)
    .bind(&accommodation.room_type_id)
    .bind(accommodation.nightly_rate)
    .bind(accommodation.total_price)
    .bind(accommodation.currency_id)
    .bind(accommodation.total_cost_eur)
    .bind(&accommodation.notes)
    .bind(&accommodation.url)
    .bind(accommodation.created_at)
    .fetch_one(&mut *tx)
    .await?;
    replace_images(&mut tx, created.id, images).await?;
    tx.commit().await?;
    Ok(created)
}

/// Writes the row and, when `images` is given, replaces the image list.
pub async fn update(
    pool: &PgPool,
    accommodation: &Accommodation,
    images: Option<&[String]>,
) -> Result<Accommodation, Error> {
    let mut tx = pool.begin().await?;
    let updated: Accommodation = sqlx::query_as(
        "UPDATE accommodations SET
            name = $2, provider = $3, room_type_id = $4, nightly_rate = $5,
            total_price = $6, currency_id = $7, total_cost_eur = $8, notes = $9, url = $10
        WHERE id = $1 RETURNING *",
    )
    .bind(accommodation.id)
    .bind(&accommodation.name)
    .bind(&accommodation.provider)
    .bind(&accommodation.room_type_id)
    .bind(accommodation.nightly_rate)
    .bind(accommodation.total_price)
    .bind(accommodation.currency_id)
    .bind(accommodation.total_cost_eur)
    .bind(&accommodation.notes)
    .bind(&accommodation.url)
    .fetch_one(&mut *tx)
    .await?;
    if let Some(images) = images {
        replace_images(&mut tx, updated.id, images).await?;
    }
    tx.commit().await?;
    Ok(updated)
}

/// Deletes an accommodation, clearing the stop selection pointing at it first.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("UPDATE trip_stops SET selected_accommodation_id = NULL WHERE selected_accommodation_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM accommodations WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}
