// src/repositories/team_repository.rs
//
// Team persistence

use std::sync::Arc;

use rusqlite::{params, Connection, Row};

use crate::db::{get_connection, ConnectionPool};
use crate::domain::Team;
use crate::error::AppResult;

use super::{row_exists, Repository, UpsertOutcome};

pub struct TeamRepository {
    pool: Arc<ConnectionPool>,
}

impl TeamRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    fn row_to_team(row: &Row) -> rusqlite::Result<Team> {
        Ok(Team {
            id: row.get("team_id")?,
            name: row.get("name")?,
            short_name: row.get("short_name")?,
            country: row.get("country")?,
            image_id: row.get("image_id")?,
        })
    }

    pub fn exists(&self, conn: &Connection, id: i64) -> AppResult<bool> {
        row_exists(
            conn,
            "SELECT EXISTS(SELECT 1 FROM teams WHERE team_id = ?1)",
            [id],
        )
    }

    pub fn get(&self, id: i64) -> AppResult<Option<Team>> {
        let conn = get_connection(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT team_id, name, short_name, country, image_id FROM teams WHERE team_id = ?1",
        )?;
        match stmt.query_row(params![id], Self::row_to_team) {
            Ok(team) => Ok(Some(team)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list(&self) -> AppResult<Vec<Team>> {
        let conn = get_connection(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT team_id, name, short_name, country, image_id FROM teams ORDER BY team_id",
        )?;
        let rows = stmt.query_map([], Self::row_to_team)?;
        let mut teams = Vec::new();
        for team in rows {
            teams.push(team?);
        }
        Ok(teams)
    }
}

impl Repository for TeamRepository {
    type Entity = Team;

    fn upsert(&self, conn: &Connection, team: &Team) -> AppResult<UpsertOutcome> {
        let existed = self.exists(conn, team.id)?;

        conn.execute(
            "INSERT INTO teams (team_id, name, short_name, country, image_id)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(team_id) DO UPDATE SET
                name = excluded.name,
                short_name = excluded.short_name,
                country = excluded.country,
                image_id = excluded.image_id",
            params![
                team.id,
                team.name,
                team.short_name,
                team.country,
                team.image_id
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

    fn setup() -> (Arc<ConnectionPool>, TeamRepository) {
        let pool = Arc::new(create_test_pool().unwrap());
        initialize_database(&pool.get().unwrap()).unwrap();
        let repo = TeamRepository::new(pool.clone());
        (pool, repo)
    }

    #[test]
    fn test_upsert_reports_created_then_updated() {
        let (pool, repo) = setup();
        let conn = pool.get().unwrap();

        let mut team = Team {
            id: 2,
            name: "India".to_string(),
            short_name: "IND".to_string(),
            country: "India".to_string(),
            image_id: 17,
        };

        assert_eq!(repo.upsert(&conn, &team).unwrap(), UpsertOutcome::Created);

        team.short_name = "INDIA".to_string();
        assert_eq!(repo.upsert(&conn, &team).unwrap(), UpsertOutcome::Updated);

        let stored = repo.get(2).unwrap().unwrap();
        assert_eq!(stored.short_name, "INDIA");
        assert_eq!(repo.list().unwrap().len(), 1);
    }
}
