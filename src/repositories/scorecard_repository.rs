// src/repositories/scorecard_repository.rs
//
// Scorecard batting-line persistence
//
// Keyed by (match, innings, player). The uniqueness constraint is what
// makes re-ingestion of a scorecard idempotent: the latest line wins.

use std::sync::Arc;

use rusqlite::{params, Connection, Row};

use crate::db::{get_connection, ConnectionPool};
use crate::domain::ScorecardEntry;
use crate::error::AppResult;

use super::{row_exists, Repository, UpsertOutcome};

pub struct ScorecardRepository {
    pool: Arc<ConnectionPool>,
}

impl ScorecardRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    fn row_to_entry(row: &Row) -> rusqlite::Result<ScorecardEntry> {
        Ok(ScorecardEntry {
            match_id: row.get("match_id")?,
            innings_id: row.get("innings_id")?,
            player_id: row.get("player_id")?,
            runs: row.get("runs")?,
            balls: row.get("balls")?,
            fours: row.get("fours")?,
            sixes: row.get("sixes")?,
            strike_rate: row.get("strike_rate")?,
            batting_position: row.get("batting_position")?,
            out_description: row.get("out_description")?,
            is_captain: row.get("is_captain")?,
            is_keeper: row.get("is_keeper")?,
        })
    }

    pub fn list_for_match(&self, match_id: i64) -> AppResult<Vec<ScorecardEntry>> {
        let conn = get_connection(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT match_id, innings_id, player_id, runs, balls, fours, sixes, strike_rate,
                    batting_position, out_description, is_captain, is_keeper
             FROM match_scorecards
             WHERE match_id = ?1
             ORDER BY innings_id, batting_position",
        )?;
        let rows = stmt.query_map(params![match_id], Self::row_to_entry)?;
        let mut entries = Vec::new();
        for entry in rows {
            entries.push(entry?);
        }
        Ok(entries)
    }
}

impl Repository for ScorecardRepository {
    type Entity = ScorecardEntry;

    fn upsert(&self, conn: &Connection, entry: &ScorecardEntry) -> AppResult<UpsertOutcome> {
        let existed = row_exists(
            conn,
            "SELECT EXISTS(SELECT 1 FROM match_scorecards
               WHERE match_id = ?1 AND innings_id = ?2 AND player_id = ?3)",
            params![entry.match_id, entry.innings_id, entry.player_id],
        )?;

        conn.execute(
            "INSERT INTO match_scorecards
                (match_id, innings_id, player_id, runs, balls, fours, sixes, strike_rate,
                 batting_position, out_description, is_captain, is_keeper)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             ON CONFLICT(match_id, innings_id, player_id) DO UPDATE SET
                runs = excluded.runs,
                balls = excluded.balls,
                fours = excluded.fours,
                sixes = excluded.sixes,
                strike_rate = excluded.strike_rate,
                batting_position = excluded.batting_position,
                out_description = excluded.out_description,
                is_captain = excluded.is_captain,
                is_keeper = excluded.is_keeper",
            params![
                entry.match_id,
                entry.innings_id,
                entry.player_id,
                entry.runs,
                entry.balls,
                entry.fours,
                entry.sixes,
                entry.strike_rate,
                entry.batting_position,
                entry.out_description,
                entry.is_captain,
                entry.is_keeper
            ],
        )?;

        Ok(if existed {
            UpsertOutcome::Updated
        } else {
            UpsertOutcome::Created
        })
    }
}
