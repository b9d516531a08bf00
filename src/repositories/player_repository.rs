// src/repositories/player_repository.rs
//
// Player persistence

use std::sync::Arc;

use rusqlite::{params, Connection, Row};

use crate::db::{get_connection, ConnectionPool};
use crate::domain::Player;
use crate::error::AppResult;

use super::{row_exists, Repository, UpsertOutcome};

pub struct PlayerRepository {
    pool: Arc<ConnectionPool>,
}

impl PlayerRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    fn row_to_player(row: &Row) -> rusqlite::Result<Player> {
        Ok(Player {
            id: row.get("player_id")?,
            name: row.get("name")?,
            team_id: row.get("team_id")?,
            role: row.get("role")?,
            batting_style: row.get("batting_style")?,
            bowling_style: row.get("bowling_style")?,
            country: row.get("country")?,
        })
    }

    pub fn exists(&self, conn: &Connection, id: i64) -> AppResult<bool> {
        row_exists(
            conn,
            "SELECT EXISTS(SELECT 1 FROM players WHERE player_id = ?1)",
            [id],
        )
    }

    /// Insert a row only when the id is unseen, leaving an existing row
    /// untouched. Used for placeholder synthesis, where a real row must
    /// never be clobbered by defaults.
    pub fn insert_if_absent(&self, conn: &Connection, player: &Player) -> AppResult<bool> {
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO players
                (player_id, name, team_id, role, batting_style, bowling_style, country)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                player.id,
                player.name,
                player.team_id,
                player.role,
                player.batting_style,
                player.bowling_style,
                player.country
            ],
        )?;
        Ok(inserted > 0)
    }

    pub fn get(&self, id: i64) -> AppResult<Option<Player>> {
        let conn = get_connection(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT player_id, name, team_id, role, batting_style, bowling_style, country
             FROM players WHERE player_id = ?1",
        )?;
        match stmt.query_row(params![id], Self::row_to_player) {
            Ok(player) => Ok(Some(player)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list(&self) -> AppResult<Vec<Player>> {
        let conn = get_connection(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT player_id, name, team_id, role, batting_style, bowling_style, country
             FROM players ORDER BY player_id",
        )?;
        let rows = stmt.query_map([], Self::row_to_player)?;
        let mut players = Vec::new();
        for player in rows {
            players.push(player?);
        }
        Ok(players)
    }

    /// Remove a player and the facts that reference it. Part of the
    /// downstream CRUD surface, never called by the pipeline.
    pub fn delete(&self, id: i64) -> AppResult<bool> {
        let mut conn = get_connection(&self.pool)?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM match_scorecards WHERE player_id = ?1", [id])?;
        tx.execute("DELETE FROM player_stats WHERE player_id = ?1", [id])?;
        let deleted = tx.execute("DELETE FROM players WHERE player_id = ?1", [id])?;
        tx.commit()?;
        Ok(deleted > 0)
    }
}

impl Repository for PlayerRepository {
    type Entity = Player;

    fn upsert(&self, conn: &Connection, player: &Player) -> AppResult<UpsertOutcome> {
        let existed = self.exists(conn, player.id)?;

        conn.execute(
            "INSERT INTO players
                (player_id, name, team_id, role, batting_style, bowling_style, country)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(player_id) DO UPDATE SET
                name = excluded.name,
                team_id = excluded.team_id,
                role = excluded.role,
                batting_style = excluded.batting_style,
                bowling_style = excluded.bowling_style,
                country = excluded.country",
            params![
                player.id,
                player.name,
                player.team_id,
                player.role,
                player.batting_style,
                player.bowling_style,
                player.country
            ],
        )?;

        Ok(if existed {
            UpsertOutcome::Updated
        } else {
            UpsertOutcome::Created
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, initialize_database};

    #[test]
    fn test_insert_if_absent_never_clobbers() {
        let pool = Arc::new(create_test_pool().unwrap());
        initialize_database(&pool.get().unwrap()).unwrap();
        let repo = PlayerRepository::new(pool.clone());
        let conn = pool.get().unwrap();

        let real = Player {
            id: 8,
            name: "R Jadeja".to_string(),
            team_id: None,
            role: "Allrounder".to_string(),
            batting_style: "Left-handed".to_string(),
            bowling_style: "Left-arm orthodox".to_string(),
            country: "India".to_string(),
        };
        repo.upsert(&conn, &real).unwrap();

        let inserted = repo
            .insert_if_absent(&conn, &Player::placeholder(8, None))
            .unwrap();
        assert!(!inserted);
        assert_eq!(repo.get(8).unwrap().unwrap().name, "R Jadeja");
    }

    #[test]
    fn test_delete_removes_dependent_facts() {
        let pool = Arc::new(create_test_pool().unwrap());
        initialize_database(&pool.get().unwrap()).unwrap();
        let repo = PlayerRepository::new(pool.clone());
        let conn = pool.get().unwrap();

        repo.insert_if_absent(&conn, &Player::placeholder(5, None))
            .unwrap();
        conn.execute(
            "INSERT INTO player_stats (player_id, format) VALUES (5, 'ODI')",
            [],
        )
        .unwrap();
        drop(conn);

        assert!(repo.delete(5).unwrap());
        assert!(repo.get(5).unwrap().is_none());

        let conn = pool.get().unwrap();
        let stats: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM player_stats WHERE player_id = 5",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(stats, 0);
    }
}
