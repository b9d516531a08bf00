use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A series (tour, trophy or tournament).
///
/// Host country and competition type are derived from the series name
/// by string heuristics (see `ingest::extract`), not from a real
/// taxonomy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// External series id
    pub id: i64,

    pub name: String,

    pub host_country: String,

    pub match_type: String,

    pub start_date: Option<DateTime<Utc>>,

    pub end_date: Option<DateTime<Utc>>,

    /// Planned match count. Stays 0 until reported by the provider or
    /// backfilled by the reconciliation pass from ingested matches.
    pub total_matches: i64,
}

impl Series {
    /// Placeholder for a series id referenced by a match before the
    /// series itself has been seen in an archive payload.
    pub fn placeholder(id: i64) -> Self {
        Self {
            id,
            name: format!("Series {}", id),
            host_country: "Unknown".to_string(),
            match_type: "International".to_string(),
            start_date: None,
            end_date: None,
            total_matches: 0,
        }
    }
}
