// src/repositories/match_repository.rs
//
// Match persistence
//
// The upsert deliberately leaves the toss columns alone: toss data is
// written by its own backfill stage and must survive re-ingestion of
// the match row.

use std::sync::Arc;

use rusqlite::{params, Connection, Row};

use crate::db::{get_connection, ConnectionPool};
use crate::domain::Match;
use crate::error::AppResult;

use super::series_repository::parse_stored_datetime;
use super::{row_exists, Repository, UpsertOutcome};

pub struct MatchRepository {
    pool: Arc<ConnectionPool>,
}

impl MatchRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    fn row_to_match(row: &Row) -> rusqlite::Result<Match> {
        Ok(Match {
            id: row.get("match_id")?,
            series_id: row.get("series_id")?,
            description: row.get("match_desc")?,
            format: row.get("match_format")?,
            start_time: parse_stored_datetime(row.get("start_datetime")?),
            end_time: parse_stored_datetime(row.get("end_datetime")?),
            team1_id: row.get("team1_id")?,
            team2_id: row.get("team2_id")?,
            venue_id: row.get("venue_id")?,
            winner_id: row.get("winner_id")?,
            toss_winner_id: row.get("toss_winner_id")?,
            toss_decision: row.get("toss_decision")?,
            status: row.get("status")?,
            state: row.get("state")?,
        })
    }

    const COLUMNS: &'static str = "match_id, series_id, match_desc, match_format, \
         start_datetime, end_datetime, team1_id, team2_id, venue_id, winner_id, \
         toss_winner_id, toss_decision, status, state";

    pub fn exists(&self, conn: &Connection, id: i64) -> AppResult<bool> {
        row_exists(
            conn,
            "SELECT EXISTS(SELECT 1 FROM matches WHERE match_id = ?1)",
            [id],
        )
    }

    pub fn get(&self, id: i64) -> AppResult<Option<Match>> {
        let conn = get_connection(&self.pool)?;
        let sql = format!("SELECT {} FROM matches WHERE match_id = ?1", Self::COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        match stmt.query_row(params![id], Self::row_to_match) {
            Ok(m) => Ok(Some(m)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list(&self) -> AppResult<Vec<Match>> {
        let conn = get_connection(&self.pool)?;
        let sql = format!("SELECT {} FROM matches ORDER BY match_id", Self::COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], Self::row_to_match)?;
        let mut matches = Vec::new();
        for m in rows {
            matches.push(m?);
        }
        Ok(matches)
    }

    /// Matches decided but still missing toss data, for the backfill
    /// stage.
    pub fn missing_toss_ids(&self, limit: usize) -> AppResult<Vec<i64>> {
        let conn = get_connection(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT match_id FROM matches
             WHERE (toss_decision IS NULL OR toss_winner_id IS NULL)
               AND winner_id IS NOT NULL
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| row.get(0))?;
        let mut ids = Vec::new();
        for id in rows {
            ids.push(id?);
        }
        Ok(ids)
    }

    /// Matches with a decided winner, for the scorecard stage.
    pub fn completed_ids(&self, limit: usize) -> AppResult<Vec<i64>> {
        let conn = get_connection(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT match_id FROM matches WHERE winner_id IS NOT NULL LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| row.get(0))?;
        let mut ids = Vec::new();
        for id in rows {
            ids.push(id?);
        }
        Ok(ids)
    }

    pub fn set_toss(
        &self,
        conn: &Connection,
        match_id: i64,
        toss_winner_id: i64,
        toss_decision: &str,
    ) -> AppResult<bool> {
        let updated = conn.execute(
            "UPDATE matches SET toss_decision = ?1, toss_winner_id = ?2 WHERE match_id = ?3",
            params![toss_decision, toss_winner_id, match_id],
        )?;
        Ok(updated > 0)
    }

    /// Remove a match and its scorecard lines. Part of the downstream
    /// CRUD surface, never called by the pipeline.
    pub fn delete(&self, id: i64) -> AppResult<bool> {
        let mut conn = get_connection(&self.pool)?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM match_scorecards WHERE match_id = ?1", [id])?;
        let deleted = tx.execute("DELETE FROM matches WHERE match_id = ?1", [id])?;
        tx.commit()?;
        Ok(deleted > 0)
    }
}

impl Repository for MatchRepository {
    type Entity = Match;

    fn upsert(&self, conn: &Connection, m: &Match) -> AppResult<UpsertOutcome> {
        let existed = self.exists(conn, m.id)?;

        conn.execute(
            "INSERT INTO matches
                (match_id, series_id, match_desc, match_format, start_datetime, end_datetime,
                 team1_id, team2_id, venue_id, winner_id, status, state)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             ON CONFLICT(match_id) DO UPDATE SET
                series_id = excluded.series_id,
                match_desc = excluded.match_desc,
                match_format = excluded.match_format,
                start_datetime = excluded.start_datetime,
                end_datetime = excluded.end_datetime,
                team1_id = excluded.team1_id,
                team2_id = excluded.team2_id,
                venue_id = excluded.venue_id,
                winner_id = excluded.winner_id,
                status = excluded.status,
                state = excluded.state",
            params![
                m.id,
                m.series_id,
                m.description,
                m.format,
                m.start_time.map(|dt| dt.to_rfc3339()),
                m.end_time.map(|dt| dt.to_rfc3339()),
                m.team1_id,
                m.team2_id,
                m.venue_id,
                m.winner_id,
                m.status,
                m.state
            ],
        )?;

        Ok(if existed {
            UpsertOutcome::Updated
        } else {
            UpsertOutcome::Created
        })
    }
}
