// src/repositories/player_stat_repository.rs
//
// Per-format career stats persistence
//
// Keyed by (player, format). Rows hold provider-reported totals, so a
// re-ingested row replaces the previous one wholesale.

use std::sync::Arc;

use rusqlite::{params, Connection, Row};

use crate::db::{get_connection, ConnectionPool};
use crate::domain::PlayerStat;
use crate::error::AppResult;

use super::{row_exists, Repository, UpsertOutcome};

pub struct PlayerStatRepository {
    pool: Arc<ConnectionPool>,
}

impl PlayerStatRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    fn row_to_stat(row: &Row) -> rusqlite::Result<PlayerStat> {
        Ok(PlayerStat {
            player_id: row.get("player_id")?,
            format: row.get("format")?,
            matches: row.get("matches")?,
            innings: row.get("innings")?,
            runs: row.get("runs")?,
            highest_score: row.get("highest_score")?,
            average: row.get("average")?,
            strike_rate: row.get("strike_rate")?,
            centuries: row.get("centuries")?,
            fifties: row.get("fifties")?,
            wickets: row.get("wickets")?,
            bowling_average: row.get("bowling_average")?,
            economy_rate: row.get("economy_rate")?,
        })
    }

    pub fn list_for_player(&self, player_id: i64) -> AppResult<Vec<PlayerStat>> {
        let conn = get_connection(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT player_id, format, matches, innings, runs, highest_score, average,
                    strike_rate, centuries, fifties, wickets, bowling_average, economy_rate
             FROM player_stats WHERE player_id = ?1 ORDER BY format",
        )?;
        let rows = stmt.query_map(params![player_id], Self::row_to_stat)?;
        let mut stats = Vec::new();
        for stat in rows {
            stats.push(stat?);
        }
        Ok(stats)
    }

    pub fn list(&self) -> AppResult<Vec<PlayerStat>> {
        let conn = get_connection(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT player_id, format, matches, innings, runs, highest_score, average,
                    strike_rate, centuries, fifties, wickets, bowling_average, economy_rate
             FROM player_stats ORDER BY player_id, format",
        )?;
        let rows = stmt.query_map([], Self::row_to_stat)?;
        let mut stats = Vec::new();
        for stat in rows {
            stats.push(stat?);
        }
        Ok(stats)
    }
}

impl Repository for PlayerStatRepository {
    type Entity = PlayerStat;

    fn upsert(&self, conn: &Connection, stat: &PlayerStat) -> AppResult<UpsertOutcome> {
        let existed = row_exists(
            conn,
            "SELECT EXISTS(SELECT 1 FROM player_stats WHERE player_id = ?1 AND format = ?2)",
            params![stat.player_id, stat.format],
        )?;

        conn.execute(
            "INSERT INTO player_stats
                (player_id, format, matches, innings, runs, highest_score, average,
                 strike_rate, centuries, fifties, wickets, bowling_average, economy_rate)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
             ON CONFLICT(player_id, format) DO UPDATE SET
                matches = excluded.matches,
                innings = excluded.innings,
                runs = excluded.runs,
                highest_score = excluded.highest_score,
                average = excluded.average,
                strike_rate = excluded.strike_rate,
                centuries = excluded.centuries,
                fifties = excluded.fifties,
                wickets = excluded.wickets,
                bowling_average = excluded.bowling_average,
                economy_rate = excluded.economy_rate",
            params![
                stat.player_id,
                stat.format,
                stat.matches,
                stat.innings,
                stat.runs,
                stat.highest_score,
                stat.average,
                stat.strike_rate,
                stat.centuries,
                stat.fifties,
                stat.wickets,
                stat.bowling_average,
                stat.economy_rate
            ],
        )?;

        Ok(if existed {
            UpsertOutcome::Updated
        } else {
            UpsertOutcome::Created
        })
    }
}
