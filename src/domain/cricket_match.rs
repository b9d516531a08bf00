use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A match.
///
/// All references are weak: the pipeline guarantees the referenced
/// rows exist by the time a match row is written (synthesizing
/// placeholders where needed), but any of them may be absent from the
/// upstream payload itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// External match id
    pub id: i64,

    pub series_id: Option<i64>,

    /// Free-text description ("2nd ODI", "Final", ...)
    pub description: String,

    /// Format label ("TEST", "ODI", "T20", ...)
    pub format: String,

    pub start_time: Option<DateTime<Utc>>,

    pub end_time: Option<DateTime<Utc>>,

    pub team1_id: Option<i64>,

    pub team2_id: Option<i64>,

    pub venue_id: Option<i64>,

    /// Winner, when inferable. Left unset until decided; the inference
    /// from the status string is best-effort (see `ingest::extract`).
    pub winner_id: Option<i64>,

    /// Toss winner and decision, filled by the toss backfill stage.
    /// Both stay unset when the toss string cannot be parsed.
    pub toss_winner_id: Option<i64>,
    pub toss_decision: Option<String>,

    /// Free-text status ("India won by 7 wkts")
    pub status: String,

    /// Free-text state ("Complete", "In Progress", ...)
    pub state: String,
}
