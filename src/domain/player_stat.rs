use serde::{Deserialize, Serialize};

/// Aggregated career totals for one player in one format.
///
/// Composite key (player, format). Re-ingestion overwrites the row
/// wholesale: these are totals reported by the provider, not deltas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStat {
    pub player_id: i64,

    /// One of the fixed format labels: TEST, ODI, T20, IPL.
    pub format: String,

    pub matches: i64,
    pub innings: i64,
    pub runs: i64,
    pub highest_score: i64,
    pub average: f64,
    pub strike_rate: f64,
    pub centuries: i64,
    pub fifties: i64,
    pub wickets: i64,
    pub bowling_average: f64,
    pub economy_rate: f64,
}
