use serde::{Deserialize, Serialize};

/// One batting line in one innings of one match.
///
/// Composite key (match, innings, player): a player cannot appear twice
/// in the same innings. Bowling figures are read from the upstream
/// scorecard but not persisted; this table carries batting lines only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorecardEntry {
    pub match_id: i64,

    /// Innings number within the match, 1-based.
    pub innings_id: i64,

    pub player_id: i64,

    pub runs: i64,
    pub balls: i64,
    pub fours: i64,
    pub sixes: i64,
    pub strike_rate: f64,

    /// 1-based order within the innings batting card.
    pub batting_position: i64,

    /// Free-text dismissal ("c Smith b Starc", "not out", ...)
    pub out_description: String,

    pub is_captain: bool,
    pub is_keeper: bool,
}
