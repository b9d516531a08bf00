// src/ingest/orchestrator.rs
//
// Stage sequencing
//
// Stages run strictly in dependency order: teams and venues before
// matches, matches before scorecards, reconciliation last. A stage
// failure is contained: it logs, reports zero processed, and the run
// moves on. With a 200-call budget and a flaky provider, a fully
// successful run is the exception, not the rule; partial progress
// plus a safe re-run is the design.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;
use uuid::Uuid;

use crate::config::IngestOptions;
use crate::db::{get_connection, initialize_database, ConnectionPool};
use crate::error::AppResult;
use crate::integrations::cricbuzz::payloads::MatchInfo;
use crate::integrations::CricketApi;
use crate::repositories::{Repositories, Repository};

use super::reconcile::ReconcileReport;
use super::{extract, reconcile, writer};

/// The ingestion stages, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Teams,
    Venues,
    Players,
    Series,
    Matches,
    TossBackfill,
    PlayerStats,
    Scorecards,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::Teams => "teams",
            Stage::Venues => "venues",
            Stage::Players => "players",
            Stage::Series => "series",
            Stage::Matches => "matches",
            Stage::TossBackfill => "toss backfill",
            Stage::PlayerStats => "player stats",
            Stage::Scorecards => "scorecards",
        }
    }
}

/// Per-stage counts for one full ingestion run.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub teams: usize,
    pub venues: usize,
    pub players: usize,
    pub series: usize,
    pub matches: usize,
    pub toss_updates: usize,
    pub player_stats: usize,
    pub scorecards: usize,
    pub reconciliation: ReconcileReport,
    pub api_calls_used: u32,
    pub api_calls_remaining: u32,
}

impl IngestReport {
    fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            teams: 0,
            venues: 0,
            players: 0,
            series: 0,
            matches: 0,
            toss_updates: 0,
            player_stats: 0,
            scorecards: 0,
            reconciliation: ReconcileReport::default(),
            api_calls_used: 0,
            api_calls_remaining: 0,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "run {} complete\n\
             \x20 teams: {}\n\
             \x20 venues: {}\n\
             \x20 players: {}\n\
             \x20 series: {}\n\
             \x20 matches: {}\n\
             \x20 toss updates: {}\n\
             \x20 player stats: {}\n\
             \x20 scorecard entries: {}\n\
             \x20 reconciled: {} players, {} capacities, {} match counts\n\
             \x20 api calls: {} used, {} remaining",
            self.run_id,
            self.teams,
            self.venues,
            self.players,
            self.series,
            self.matches,
            self.toss_updates,
            self.player_stats,
            self.scorecards,
            self.reconciliation.placeholder_players,
            self.reconciliation.venue_capacity_updates,
            self.reconciliation.series_match_counts,
            self.api_calls_used,
            self.api_calls_remaining,
        )
    }
}

/// Counts for a historical or world-cup backfill run.
#[derive(Debug, Clone, Serialize)]
pub struct BackfillReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub series_seen: usize,
    pub matches_processed: usize,
    pub scorecards_added: usize,
    pub api_calls_used: u32,
    pub api_calls_remaining: u32,
}

impl BackfillReport {
    fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            series_seen: 0,
            matches_processed: 0,
            scorecards_added: 0,
            api_calls_used: 0,
            api_calls_remaining: 0,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "backfill {} complete\n\
             \x20 series: {}\n\
             \x20 matches processed: {}\n\
             \x20 scorecard entries: {}\n\
             \x20 api calls: {} used, {} remaining",
            self.run_id,
            self.series_seen,
            self.matches_processed,
            self.scorecards_added,
            self.api_calls_used,
            self.api_calls_remaining,
        )
    }
}

/// The main world cups, by year. The 2011 edition predates the
/// provider's "Mens" naming.
const WORLD_CUP_TARGETS: &[(i32, &str)] = &[
    (2011, "ICC World Cup 2011"),
    (2015, "ICC Cricket World Cup 2015"),
    (2019, "ICC Cricket World Cup 2019"),
    (2022, "ICC Mens T20 World Cup 2022"),
    (2023, "ICC Cricket World Cup 2023"),
    (2024, "ICC Mens T20 World Cup 2024"),
];

pub struct Orchestrator {
    api: Arc<dyn CricketApi>,
    pool: Arc<ConnectionPool>,
    pub repos: Repositories,
    options: IngestOptions,
}

impl Orchestrator {
    pub fn new(
        api: Arc<dyn CricketApi>,
        pool: Arc<ConnectionPool>,
        options: IngestOptions,
    ) -> Self {
        let repos = Repositories::new(pool.clone());
        Self {
            api,
            pool,
            repos,
            options,
        }
    }

    /// Run the full stage sequence once.
    ///
    /// Only a schema-setup failure aborts the run; every data stage
    /// degrades to zero processed on failure.
    pub async fn run_full(&self) -> AppResult<IngestReport> {
        let mut report = IngestReport::new();
        info!(
            "starting ingestion run {} (budget: {} calls)",
            report.run_id,
            self.api.budget().limit()
        );

        self.setup_schema()?;

        report.teams = self.observe(Stage::Teams, self.stage_teams().await);
        report.venues = self.observe(Stage::Venues, self.stage_venues().await);
        report.players = self.observe(Stage::Players, self.stage_players().await);
        report.series = self.observe(Stage::Series, self.stage_series().await);
        report.matches = self.observe(Stage::Matches, self.stage_matches().await);
        report.toss_updates =
            self.observe(Stage::TossBackfill, self.stage_toss_backfill().await);
        report.player_stats = self.observe(Stage::PlayerStats, self.stage_player_stats().await);
        report.scorecards = self.observe(Stage::Scorecards, self.stage_scorecards().await);

        match self.stage_reconciliation() {
            Ok(result) => report.reconciliation = result,
            Err(e) => warn!("reconciliation failed: {} (continuing)", e),
        }

        report.api_calls_used = self.api.budget().used();
        report.api_calls_remaining = self.api.budget().remaining();
        Ok(report)
    }

    /// Historical backfill: per-year series archives, a bounded number
    /// of matches per year, scorecards per match. Halts early once the
    /// shared budget drops to the safety margin.
    pub async fn run_historical(
        &self,
        years: &[i32],
        matches_per_year: usize,
    ) -> AppResult<BackfillReport> {
        let mut report = BackfillReport::new();
        info!("starting historical backfill {} for {:?}", report.run_id, years);

        self.setup_schema()?;

        'years: for &year in years {
            if self.near_budget_ceiling() {
                warn!("approaching the call budget, stopping early");
                break;
            }

            let Some(archive) = self.api.series_archives(Some(year)).await else {
                warn!("no series archive for {}", year);
                continue;
            };
            let entries = extract::series_for_year(&archive, year);
            info!("found {} series for {}", entries.len(), year);

            let mut processed_this_year = 0;
            for entry in entries {
                if processed_this_year >= matches_per_year {
                    break;
                }
                if self.near_budget_ceiling() {
                    warn!("approaching the call budget, stopping early");
                    break 'years;
                }

                let Some(series) = extract::series_from_entry(entry) else {
                    continue;
                };
                let series_id = series.id;
                if let Err(e) = self.store_series(&series) {
                    warn!("failed to store series {}: {}", series_id, e);
                    continue;
                }
                report.series_seen += 1;

                let Some(matches_payload) = self.api.series_matches(series_id).await else {
                    continue;
                };
                for wrapper in matches_payload.all_matches() {
                    if processed_this_year >= matches_per_year {
                        break;
                    }
                    if self.near_budget_ceiling() {
                        warn!("approaching the call budget, stopping early");
                        break 'years;
                    }
                    let Some(info) = &wrapper.match_info else { continue };
                    if self
                        .ingest_match_with_scorecard(series_id, info, &mut report)
                        .await
                    {
                        processed_this_year += 1;
                    }
                }
            }
            info!("year {}: processed {} matches", year, processed_this_year);
        }

        report.api_calls_used = self.api.budget().used();
        report.api_calls_remaining = self.api.budget().remaining();
        Ok(report)
    }

    /// World-cup backfill: one target tournament per year, every match
    /// in it (head-to-head reports need the full bracket), same budget
    /// guard as the historical sweep.
    pub async fn run_world_cups(&self, years: &[i32]) -> AppResult<BackfillReport> {
        let mut report = BackfillReport::new();
        info!("starting world cup backfill {} for {:?}", report.run_id, years);

        self.setup_schema()?;

        'years: for &year in years {
            if self.near_budget_ceiling() {
                warn!("approaching the call budget, stopping early");
                break;
            }

            let Some(&(_, target)) = WORLD_CUP_TARGETS.iter().find(|(y, _)| *y == year) else {
                warn!("no known world cup for {}", year);
                continue;
            };

            let Some(archive) = self.api.series_archives(Some(year)).await else {
                warn!("no series archive for {}", year);
                continue;
            };
            let entries = extract::series_for_year(&archive, year);

            let Some(entry) = entries
                .iter()
                .copied()
                .find(|e| e.name.as_deref().is_some_and(|name| name.contains(target)))
            else {
                warn!("no target world cup found for {}", year);
                continue;
            };
            let Some(series) = extract::series_from_entry(entry) else {
                continue;
            };
            info!("processing world cup: {}", series.name);

            let series_id = series.id;
            if let Err(e) = self.store_series(&series) {
                warn!("failed to store series {}: {}", series_id, e);
                continue;
            }
            report.series_seen += 1;

            let Some(matches_payload) = self.api.series_matches(series_id).await else {
                continue;
            };
            let wrappers = matches_payload.all_matches();
            info!("found {} matches in this world cup", wrappers.len());

            let mut processed_this_year = 0;
            for wrapper in wrappers {
                if self.near_budget_ceiling() {
                    warn!("approaching the call budget, stopping early");
                    break 'years;
                }
                let Some(info) = &wrapper.match_info else { continue };
                if self
                    .ingest_match_with_scorecard(series_id, info, &mut report)
                    .await
                {
                    processed_this_year += 1;
                }
            }
            info!("year {}: processed {} matches", year, processed_this_year);
        }

        report.api_calls_used = self.api.budget().used();
        report.api_calls_remaining = self.api.budget().remaining();
        Ok(report)
    }

    // ------------------------------------------------------------------
    // Stages
    // ------------------------------------------------------------------

    fn setup_schema(&self) -> AppResult<()> {
        let conn = get_connection(&self.pool)?;
        initialize_database(&conn)
    }

    fn observe(&self, stage: Stage, result: AppResult<usize>) -> usize {
        match result {
            Ok(count) => {
                info!("{}: {} processed", stage.name(), count);
                count
            }
            Err(e) => {
                warn!(
                    "{} failed: {} (continuing with zero processed)",
                    stage.name(),
                    e
                );
                0
            }
        }
    }

    async fn stage_teams(&self) -> AppResult<usize> {
        let Some(payload) = self.api.recent_matches().await else {
            warn!("could not fetch recent matches for teams");
            return Ok(0);
        };
        let teams = extract::teams_in(&payload);

        let mut conn = get_connection(&self.pool)?;
        let tx = conn.transaction()?;
        let written = writer::apply_teams(&tx, &self.repos, &teams)?;
        tx.commit()?;
        Ok(written)
    }

    async fn stage_venues(&self) -> AppResult<usize> {
        let Some(payload) = self.api.recent_matches().await else {
            warn!("could not fetch recent matches for venues");
            return Ok(0);
        };
        let venues = extract::venues_in(&payload);

        let mut conn = get_connection(&self.pool)?;
        let tx = conn.transaction()?;
        let written = writer::apply_venues(&tx, &self.repos, &venues)?;
        tx.commit()?;
        Ok(written)
    }

    async fn stage_players(&self) -> AppResult<usize> {
        let Some(payload) = self.api.player_list().await else {
            warn!("could not fetch the player list");
            return Ok(0);
        };
        let players = extract::player_candidates(&payload);

        let mut conn = get_connection(&self.pool)?;
        let tx = conn.transaction()?;
        let written = writer::apply_players(&tx, &self.repos, &players)?;
        tx.commit()?;
        Ok(written)
    }

    async fn stage_series(&self) -> AppResult<usize> {
        let Some(payload) = self.api.series_archives(None).await else {
            warn!("could not fetch the series archive");
            return Ok(0);
        };
        let series = extract::series_candidates(&payload);

        let mut conn = get_connection(&self.pool)?;
        let tx = conn.transaction()?;
        let written = writer::apply_series(&tx, &self.repos, &series)?;
        tx.commit()?;
        Ok(written)
    }

    async fn stage_matches(&self) -> AppResult<usize> {
        let recent = self.api.recent_matches().await;
        let upcoming = self.api.upcoming_matches().await;
        let live = self.api.live_matches().await;

        let mut candidates = Vec::new();
        for payload in [recent, upcoming, live].into_iter().flatten() {
            candidates.extend(extract::match_candidates(&payload));
        }
        if candidates.is_empty() {
            return Ok(0);
        }

        let mut conn = get_connection(&self.pool)?;
        let tx = conn.transaction()?;
        let written = writer::apply_match_candidates(&tx, &self.repos, &candidates)?;
        tx.commit()?;
        Ok(written)
    }

    async fn stage_toss_backfill(&self) -> AppResult<usize> {
        let ids = self
            .repos
            .matches
            .missing_toss_ids(self.options.toss_backfill_limit)?;

        let mut updates = Vec::new();
        for match_id in ids {
            let Some(center) = self.api.match_center(match_id).await else {
                continue;
            };
            // A miss here is not an error: the toss fields stay unset
            if let Some((toss_winner_id, decision)) = extract::toss_from_center(&center) {
                updates.push((match_id, toss_winner_id, decision));
            }
        }
        if updates.is_empty() {
            return Ok(0);
        }

        let mut conn = get_connection(&self.pool)?;
        let tx = conn.transaction()?;
        let mut applied = 0;
        for (match_id, toss_winner_id, decision) in &updates {
            if self
                .repos
                .matches
                .set_toss(&tx, *match_id, *toss_winner_id, decision.as_str())?
            {
                applied += 1;
            }
        }
        tx.commit()?;
        Ok(applied)
    }

    async fn stage_player_stats(&self) -> AppResult<usize> {
        let Some(payload) = self.api.player_list().await else {
            warn!("could not fetch the player list for stats");
            return Ok(0);
        };
        let stats = extract::player_stat_candidates(&payload);

        let mut conn = get_connection(&self.pool)?;
        let tx = conn.transaction()?;
        let written = writer::apply_player_stats(&tx, &self.repos, &stats)?;
        tx.commit()?;
        Ok(written)
    }

    async fn stage_scorecards(&self) -> AppResult<usize> {
        let ids = self
            .repos
            .matches
            .completed_ids(self.options.scorecard_match_limit)?;

        let mut batches = Vec::new();
        for match_id in ids {
            let Some(payload) = self.api.match_scorecard(match_id).await else {
                continue;
            };
            let candidates = extract::scorecard_candidates(&payload, match_id);
            if !candidates.is_empty() {
                batches.push(candidates);
            }
        }

        let mut written = 0;
        for batch in &batches {
            let mut conn = get_connection(&self.pool)?;
            written += writer::apply_scorecards_relaxed(&mut conn, &self.repos, batch)?;
        }
        Ok(written)
    }

    fn stage_reconciliation(&self) -> AppResult<ReconcileReport> {
        let conn = get_connection(&self.pool)?;
        reconcile::run_reconciliation(&conn)
    }

    // ------------------------------------------------------------------
    // Backfill helpers
    // ------------------------------------------------------------------

    fn near_budget_ceiling(&self) -> bool {
        self.api.budget().remaining() <= self.options.budget_margin
    }

    /// Store one match and its scorecard, committing per match so a
    /// backfill interrupted by the budget guard keeps what it has.
    async fn ingest_match_with_scorecard(
        &self,
        series_id: i64,
        info: &MatchInfo,
        report: &mut BackfillReport,
    ) -> bool {
        let Some(candidate) = extract::candidate_from_info(Some(series_id), info) else {
            return false;
        };
        let match_id = candidate.row.id;
        info!("  processing: {}", candidate.row.description);

        if let Err(e) = self.store_match(&candidate) {
            warn!("failed to store match {}: {}", match_id, e);
            return false;
        }

        if let Some(payload) = self.api.match_scorecard(match_id).await {
            let lines = extract::scorecard_candidates(&payload, match_id);
            match self.store_scorecards(&lines) {
                Ok(added) => report.scorecards_added += added,
                Err(e) => warn!("failed to store scorecard for match {}: {}", match_id, e),
            }
        }

        report.matches_processed += 1;
        true
    }

    fn store_series(&self, series: &crate::domain::Series) -> AppResult<()> {
        let conn = get_connection(&self.pool)?;
        self.repos.series.upsert(&conn, series)?;
        Ok(())
    }

    fn store_match(&self, candidate: &extract::MatchCandidate) -> AppResult<()> {
        let mut conn = get_connection(&self.pool)?;
        let tx = conn.transaction()?;
        writer::apply_match_candidates(&tx, &self.repos, std::slice::from_ref(candidate))?;
        tx.commit()?;
        Ok(())
    }

    fn store_scorecards(&self, lines: &[extract::ScorecardCandidate]) -> AppResult<usize> {
        let mut conn = get_connection(&self.pool)?;
        writer::apply_scorecards_with_players(&mut conn, &self.repos, lines)
    }
}
