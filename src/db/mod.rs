//! Postgres access, one module per table family.

pub mod accommodations;
pub mod car_rentals;
pub mod catalog;
pub mod currencies;
pub mod flights;
pub mod journal;
pub mod options;
pub mod snapshots;
pub mod stops;
pub mod trips;

use crate::error::Error;

/// Maps a foreign key violation to a client error, leaving other failures as they are.
pub(crate) fn referenced(error: sqlx::Error, message: &str) -> Error {
    match &error {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => Error::BadRequest(message.to_string()),
        _ => Error::Database(error),
    }
}
