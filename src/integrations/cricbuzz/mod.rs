// src/integrations/cricbuzz/mod.rs
//
// Upstream cricket data provider (keyed REST API)

pub mod budget;
pub mod client;
pub mod payloads;

pub use budget::CallBudget;
pub use client::CricbuzzClient;

use async_trait::async_trait;

use payloads::{
    MatchCenterPayload, MatchListPayload, PlayerListPayload, ScorecardPayload,
    SeriesArchivePayload, SeriesMatchesPayload,
};

/// The upstream endpoints the ingestion pipeline consumes.
///
/// `CricbuzzClient` is the real implementation; tests substitute a
/// fixture-backed fake. Every method returns `None` both on budget
/// exhaustion and on any transport or decode failure, and callers
/// treat `None` as "skip this stage".
#[async_trait]
pub trait CricketApi: Send + Sync {
    /// The shared call budget, for reporting and early-halt guards.
    fn budget(&self) -> &CallBudget;

    async fn recent_matches(&self) -> Option<MatchListPayload>;
    async fn live_matches(&self) -> Option<MatchListPayload>;
    async fn upcoming_matches(&self) -> Option<MatchListPayload>;
    async fn player_list(&self) -> Option<PlayerListPayload>;
    async fn series_archives(&self, year: Option<i32>) -> Option<SeriesArchivePayload>;
    async fn series_matches(&self, series_id: i64) -> Option<SeriesMatchesPayload>;
    async fn match_center(&self, match_id: i64) -> Option<MatchCenterPayload>;
    async fn match_scorecard(&self, match_id: i64) -> Option<ScorecardPayload>;
}
