// src/repositories/series_repository.rs
//
// Series persistence

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use crate::db::{get_connection, ConnectionPool};
use crate::domain::Series;
use crate::error::AppResult;

use super::{row_exists, Repository, UpsertOutcome};

pub struct SeriesRepository {
    pool: Arc<ConnectionPool>,
}

impl SeriesRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    fn row_to_series(row: &Row) -> rusqlite::Result<Series> {
        Ok(Series {
            id: row.get("series_id")?,
            name: row.get("name")?,
            host_country: row.get("host_country")?,
            match_type: row.get("match_type")?,
            start_date: parse_stored_datetime(row.get("start_date")?),
            end_date: parse_stored_datetime(row.get("end_date")?),
            total_matches: row.get("total_matches")?,
        })
    }

    pub fn exists(&self, conn: &Connection, id: i64) -> AppResult<bool> {
        row_exists(
            conn,
            "SELECT EXISTS(SELECT 1 FROM series WHERE series_id = ?1)",
            [id],
        )
    }

    pub fn get(&self, id: i64) -> AppResult<Option<Series>> {
        let conn = get_connection(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT series_id, name, host_country, match_type, start_date, end_date, total_matches
             FROM series WHERE series_id = ?1",
        )?;
        match stmt.query_row(params![id], Self::row_to_series) {
            Ok(series) => Ok(Some(series)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list(&self) -> AppResult<Vec<Series>> {
        let conn = get_connection(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT series_id, name, host_country, match_type, start_date, end_date, total_matches
             FROM series ORDER BY series_id",
        )?;
        let rows = stmt.query_map([], Self::row_to_series)?;
        let mut series = Vec::new();
        for entry in rows {
            series.push(entry?);
        }
        Ok(series)
    }
}

impl Repository for SeriesRepository {
    type Entity = Series;

    fn upsert(&self, conn: &Connection, series: &Series) -> AppResult<UpsertOutcome> {
        let existed = self.exists(conn, series.id)?;

        conn.execute(
            "INSERT INTO series
                (series_id, name, host_country, match_type, start_date, end_date, total_matches)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(series_id) DO UPDATE SET
                name = excluded.name,
                host_country = excluded.host_country,
                match_type = excluded.match_type,
                start_date = excluded.start_date,
                end_date = excluded.end_date,
                total_matches = excluded.total_matches",
            params![
                series.id,
                series.name,
                series.host_country,
                series.match_type,
                series.start_date.map(|dt| dt.to_rfc3339()),
                series.end_date.map(|dt| dt.to_rfc3339()),
                series.total_matches
            ],
        )?;

        Ok(if existed {
            UpsertOutcome::Updated
        } else {
            UpsertOutcome::Created
        })
    }
}

pub(crate) fn parse_stored_datetime(raw: Option<String>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    })
}
