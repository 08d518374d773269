use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgExecutor, PgPool};
use uuid::Uuid;

use crate::error::Error;
use crate::types::{JournalEntry, JournalEntryView, JournalPhoto, PhotoPayload};

async fn photos_for(executor: impl PgExecutor<'_>, entry_ids: &[Uuid]) -> Result<Vec<JournalPhoto>, Error> {
    let photos = sqlx::query_as("SELECT * FROM journal_photos WHERE journal_entry_id = ANY($1)")
        .bind(entry_ids)
        .fetch_all(executor)
        .await?;
    Ok(photos)
}

/// Journal entries of a trip, oldest day first.
pub async fn list_for_trip(pool: &PgPool, trip_id: Uuid) -> Result<Vec<JournalEntryView>, Error> {
    let entries: Vec<JournalEntry> =
        sqlx::query_as("SELECT * FROM journal_entries WHERE trip_id = $1 ORDER BY date, created_at")
            .bind(trip_id)
            .fetch_all(pool)
            .await?;

    let ids: Vec<Uuid> = entries.iter().map(|entry| entry.id).collect();
    let mut photos: HashMap<Uuid, Vec<JournalPhoto>> = HashMap::new();
    for photo in photos_for(pool, &ids).await? {
        photos.entry(photo.journal_entry_id).or_default().push(photo);
    }

    Ok(entries
        .into_iter()
        .map(|entry| JournalEntryView {
            photos: photos.remove(&entry.id).unwrap_or_default(),
            entry,
        })
        .collect())
}

pub async fn find_in_trip(executor: impl PgExecutor<'_>, trip_id: Uuid, id: Uuid) -> Result<JournalEntry, Error> {
    let entry: Option<JournalEntry> =
        sqlx::query_as("SELECT * FROM journal_entries WHERE id = $1 AND trip_id = $2")
            .bind(id)
            .bind(trip_id)
            .fetch_optional(executor)
            .await?;
    entry.ok_or_else(|| Error::not_found("Journal entry"))
}

async fn insert_photos(conn: &mut PgConnection, entry_id: Uuid, photos: &[PhotoPayload]) -> Result<Vec<JournalPhoto>, Error> {
    let mut created = Vec::with_capacity(photos.len());
    for photo in photos {
        let row: JournalPhoto = sqlx::query_as(
            "INSERT INTO journal_photos (id, journal_entry_id, url, caption) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(entry_id)
        .bind(&photo.url)
        .bind(&photo.caption)
        .fetch_one(&mut *conn)
        .await?;
        created.push(row);
    }
    Ok(created)
}

pub async fn insert(
    pool: &PgPool,
    trip_id: Uuid,
    date: DateTime<Utc>,
    content: &str,
    photos: &[PhotoPayload],
) -> Result<JournalEntryView, Error> {
    let mut tx = pool.begin().await?;
    let entry: JournalEntry = sqlx::query_as(
        "INSERT INTO journal_entries (id, trip_id, date, content) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(trip_id)
    .bind(date)
    .bind(content)
    .fetch_one(&mut *tx)
    .await?;
    let photos = insert_photos(&mut tx, entry.id, photos).await?;
    tx.commit().await?;
    Ok(JournalEntryView { entry, photos })
}

/// Rewrites the entry and replaces its photos.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    date: DateTime<Utc>,
    content: &str,
    photos: &[PhotoPayload],
) -> Result<JournalEntryView, Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM journal_photos WHERE journal_entry_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let entry: JournalEntry =
        sqlx::query_as("UPDATE journal_entries SET date = $2, content = $3 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(date)
            .bind(content)
            .fetch_one(&mut *tx)
            .await?;
    let photos = insert_photos(&mut tx, entry.id, photos).await?;
    tx.commit().await?;
    Ok(JournalEntryView { entry, photos })
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), Error> {
    sqlx::query("DELETE FROM journal_entries WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
