// src/ingest/writer.rs
//
// Applies candidate rows to the store.
//
// Callers wrap each logical stage in one transaction, so a stage that
// fails midway rolls back to zero committed rather than leaving
// orphaned cross-references. Parent rows are guaranteed before any row
// that references them, synthesizing placeholders where the parent has
// not been sighted yet.

use log::warn;
use rusqlite::Connection;

use crate::domain::{Player, Series, Team};
use crate::error::AppResult;
use crate::repositories::{Repositories, Repository};

use super::extract::{MatchCandidate, ScorecardCandidate};

pub fn apply_teams(conn: &Connection, repos: &Repositories, teams: &[Team]) -> AppResult<usize> {
    for team in teams {
        repos.teams.upsert(conn, team)?;
    }
    Ok(teams.len())
}

pub fn apply_venues(
    conn: &Connection,
    repos: &Repositories,
    venues: &[crate::domain::Venue],
) -> AppResult<usize> {
    for venue in venues {
        repos.venues.upsert(conn, venue)?;
    }
    Ok(venues.len())
}

/// Upsert players, synthesizing a placeholder team for any team id the
/// store has not seen yet.
pub fn apply_players(
    conn: &Connection,
    repos: &Repositories,
    players: &[Player],
) -> AppResult<usize> {
    for player in players {
        if let Some(team_id) = player.team_id {
            if !repos.teams.exists(conn, team_id)? {
                repos.teams.upsert(conn, &Team::placeholder(team_id))?;
            }
        }
        repos.players.upsert(conn, player)?;
    }
    Ok(players.len())
}

pub fn apply_series(
    conn: &Connection,
    repos: &Repositories,
    series: &[Series],
) -> AppResult<usize> {
    for entry in series {
        repos.series.upsert(conn, entry)?;
    }
    Ok(series.len())
}

/// Upsert per-format stat rows, synthesizing a placeholder player for
/// any id the store has not seen yet (a stat row must never be blocked
/// by a missing parent).
pub fn apply_player_stats(
    conn: &Connection,
    repos: &Repositories,
    stats: &[crate::domain::PlayerStat],
) -> AppResult<usize> {
    for stat in stats {
        if !repos.players.exists(conn, stat.player_id)? {
            repos
                .players
                .insert_if_absent(conn, &Player::placeholder(stat.player_id, None))?;
        }
        repos.player_stats.upsert(conn, stat)?;
    }
    Ok(stats.len())
}

/// Upsert match rows. The teams and venue carried by the payload are
/// written first, and an unseen series id gets a placeholder row, so
/// every reference the match row makes resolves.
pub fn apply_match_candidates(
    conn: &Connection,
    repos: &Repositories,
    candidates: &[MatchCandidate],
) -> AppResult<usize> {
    let mut written = 0;
    for candidate in candidates {
        for team in [&candidate.team1, &candidate.team2].into_iter().flatten() {
            repos.teams.upsert(conn, team)?;
        }
        if let Some(venue) = &candidate.venue {
            repos.venues.upsert(conn, venue)?;
        }
        if let Some(series_id) = candidate.row.series_id {
            if !repos.series.exists(conn, series_id)? {
                repos.series.upsert(conn, &Series::placeholder(series_id))?;
            }
        }
        repos.matches.upsert(conn, &candidate.row)?;
        written += 1;
    }
    Ok(written)
}

/// Apply one match's scorecard lines with foreign-key checks relaxed.
///
/// Entries may legitimately reference players the store has not seen;
/// the reconciliation pass synthesizes those afterwards. The pragma
/// cannot change inside a transaction, so the relaxation brackets the
/// transaction and is always restored before returning.
///
/// Write failures are caught per record: one bad line must not abort
/// the rest of the batch.
pub fn apply_scorecards_relaxed(
    conn: &mut Connection,
    repos: &Repositories,
    candidates: &[ScorecardCandidate],
) -> AppResult<usize> {
    conn.execute_batch("PRAGMA foreign_keys = OFF;")?;
    let result = apply_scorecard_lines(conn, repos, candidates, false);
    let restore = conn.execute_batch("PRAGMA foreign_keys = ON;");
    let written = result?;
    restore?;
    Ok(written)
}

/// Apply one match's scorecard lines with the batsman names at hand,
/// inserting a named placeholder for each unseen player instead of
/// relaxing foreign keys. Used by the backfill runs.
pub fn apply_scorecards_with_players(
    conn: &mut Connection,
    repos: &Repositories,
    candidates: &[ScorecardCandidate],
) -> AppResult<usize> {
    apply_scorecard_lines(conn, repos, candidates, true)
}

fn apply_scorecard_lines(
    conn: &mut Connection,
    repos: &Repositories,
    candidates: &[ScorecardCandidate],
    ensure_players: bool,
) -> AppResult<usize> {
    let tx = conn.transaction()?;
    let mut written = 0;
    for candidate in candidates {
        if ensure_players {
            let placeholder =
                Player::placeholder(candidate.entry.player_id, candidate.player_name.as_deref());
            if let Err(e) = repos.players.insert_if_absent(&tx, &placeholder) {
                warn!(
                    "skipping scorecard line for player {} in match {}: {}",
                    candidate.entry.player_id, candidate.entry.match_id, e
                );
                continue;
            }
        }
        match repos.scorecards.upsert(&tx, &candidate.entry) {
            Ok(_) => written += 1,
            Err(e) => warn!(
                "skipping scorecard line (match {}, innings {}, player {}): {}",
                candidate.entry.match_id, candidate.entry.innings_id, candidate.entry.player_id, e
            ),
        }
    }
    tx.commit()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, initialize_database};
    use crate::domain::ScorecardEntry;
    use std::sync::Arc;

    fn entry(match_id: i64, player_id: i64) -> ScorecardCandidate {
        ScorecardCandidate {
            entry: ScorecardEntry {
                match_id,
                innings_id: 1,
                player_id,
                runs: 10,
                balls: 8,
                fours: 2,
                sixes: 0,
                strike_rate: 125.0,
                batting_position: 1,
                out_description: "not out".to_string(),
                is_captain: false,
                is_keeper: false,
            },
            player_name: Some("A Batsman".to_string()),
        }
    }

    #[test]
    fn test_relaxation_is_restored_after_the_batch() {
        let pool = Arc::new(create_test_pool().unwrap());
        let mut conn = pool.get().unwrap();
        initialize_database(&conn).unwrap();
        let repos = Repositories::new(pool.clone());

        // Match 1 does not exist either; both FKs are bypassed
        let written =
            apply_scorecards_relaxed(&mut conn, &repos, &[entry(1, 900), entry(1, 901)]).unwrap();
        assert_eq!(written, 2);

        let fk_enabled: i32 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk_enabled, 1);
    }

    #[test]
    fn test_backfill_path_names_its_placeholders() {
        let pool = Arc::new(create_test_pool().unwrap());
        let mut conn = pool.get().unwrap();
        initialize_database(&conn).unwrap();
        // Scorecard rows still need their match row under this path
        conn.execute_batch("PRAGMA foreign_keys = OFF;").unwrap();
        let repos = Repositories::new(pool.clone());

        apply_scorecards_with_players(&mut conn, &repos, &[entry(1, 900)]).unwrap();
        drop(conn);

        let player = repos.players.get(900).unwrap().unwrap();
        assert_eq!(player.name, "A Batsman");
    }
}
