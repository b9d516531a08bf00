// src/repositories/venue_repository.rs
//
// Venue persistence

use std::sync::Arc;

use rusqlite::{params, Connection, Row};

use crate::db::{get_connection, ConnectionPool};
use crate::domain::Venue;
use crate::error::AppResult;

use super::{row_exists, Repository, UpsertOutcome};

pub struct VenueRepository {
    pool: Arc<ConnectionPool>,
}

impl VenueRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    fn row_to_venue(row: &Row) -> rusqlite::Result<Venue> {
        Ok(Venue {
            id: row.get("venue_id")?,
            name: row.get("name")?,
            city: row.get("city")?,
            country: row.get("country")?,
            capacity: row.get("capacity")?,
            timezone: row.get("timezone")?,
            latitude: row.get("latitude")?,
            longitude: row.get("longitude")?,
        })
    }

    pub fn exists(&self, conn: &Connection, id: i64) -> AppResult<bool> {
        row_exists(
            conn,
            "SELECT EXISTS(SELECT 1 FROM venues WHERE venue_id = ?1)",
            [id],
        )
    }

    pub fn get(&self, id: i64) -> AppResult<Option<Venue>> {
        let conn = get_connection(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT venue_id, name, city, country, capacity, timezone, latitude, longitude
             FROM venues WHERE venue_id = ?1",
        )?;
        match stmt.query_row(params![id], Self::row_to_venue) {
            Ok(venue) => Ok(Some(venue)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list(&self) -> AppResult<Vec<Venue>> {
        let conn = get_connection(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT venue_id, name, city, country, capacity, timezone, latitude, longitude
             FROM venues ORDER BY venue_id",
        )?;
        let rows = stmt.query_map([], Self::row_to_venue)?;
        let mut venues = Vec::new();
        for venue in rows {
            venues.push(venue?);
        }
        Ok(venues)
    }
}

impl Repository for VenueRepository {
    type Entity = Venue;

    fn upsert(&self, conn: &Connection, venue: &Venue) -> AppResult<UpsertOutcome> {
        let existed = self.exists(conn, venue.id)?;

        conn.execute(
            "INSERT INTO venues (venue_id, name, city, country, capacity, timezone, latitude, longitude)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(venue_id) DO UPDATE SET
                name = excluded.name,
                city = excluded.city,
                country = excluded.country,
                capacity = excluded.capacity,
                timezone = excluded.timezone,
                latitude = excluded.latitude,
                longitude = excluded.longitude",
            params![
                venue.id,
                venue.name,
                venue.city,
                venue.country,
                venue.capacity,
                venue.timezone,
                venue.latitude,
                venue.longitude
            ],
        )?;

        Ok(if existed {
            UpsertOutcome::Updated
        } else {
            UpsertOutcome::Created
        })
    }
}
