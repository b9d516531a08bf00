// src/repositories/mod.rs
//
// Repository layer
//
// CRITICAL RULES:
// - Repositories are DUMB data mappers
// - NO business logic, NO cross-repository calls
// - Explicit SQL only
// - Upserts take an explicit connection so a whole ingestion stage can
//   share one transaction; reads go through the pool

pub mod match_repository;
pub mod player_repository;
pub mod player_stat_repository;
pub mod scorecard_repository;
pub mod series_repository;
pub mod team_repository;
pub mod venue_repository;

pub use match_repository::MatchRepository;
pub use player_repository::PlayerRepository;
pub use player_stat_repository::PlayerStatRepository;
pub use scorecard_repository::ScorecardRepository;
pub use series_repository::SeriesRepository;
pub use team_repository::TeamRepository;
pub use venue_repository::VenueRepository;

use std::sync::Arc;

use rusqlite::Connection;

use crate::db::ConnectionPool;
use crate::error::AppResult;

/// What an upsert did to the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// The uniform persistence interface: insert the row if its external
/// key is unseen, otherwise overwrite every non-key column
/// (last write wins).
pub trait Repository: Send + Sync {
    type Entity;

    fn upsert(&self, conn: &Connection, entity: &Self::Entity) -> AppResult<UpsertOutcome>;
}

/// All seven repositories over one pool, in the dependency order the
/// orchestrator writes them.
pub struct Repositories {
    pub teams: TeamRepository,
    pub venues: VenueRepository,
    pub players: PlayerRepository,
    pub series: SeriesRepository,
    pub matches: MatchRepository,
    pub player_stats: PlayerStatRepository,
    pub scorecards: ScorecardRepository,
}

impl Repositories {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self {
            teams: TeamRepository::new(pool.clone()),
            venues: VenueRepository::new(pool.clone()),
            players: PlayerRepository::new(pool.clone()),
            series: SeriesRepository::new(pool.clone()),
            matches: MatchRepository::new(pool.clone()),
            player_stats: PlayerStatRepository::new(pool.clone()),
            scorecards: ScorecardRepository::new(pool),
        }
    }
}

pub(crate) fn row_exists(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> AppResult<bool> {
    let exists: bool = conn.query_row(sql, params, |row| row.get(0))?;
    Ok(exists)
}
