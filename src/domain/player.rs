use serde::{Deserialize, Serialize};

/// A player.
///
/// Role and style labels are an open set of provider strings
/// ("Batsman", "Bowling Allrounder", ...) and are stored as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// External player id
    pub id: i64,

    pub name: String,

    /// Owning team. Weak reference: the team may not have been seen
    /// yet, or the provider may not report one at all.
    pub team_id: Option<i64>,

    pub role: String,

    pub batting_style: String,

    pub bowling_style: String,

    pub country: String,
}

impl Player {
    /// Placeholder for a player id referenced by a scorecard before the
    /// player has been ingested. The fixed defaults match what the
    /// reconciliation pass synthesizes.
    pub fn placeholder(id: i64, name: Option<&str>) -> Self {
        Self {
            id,
            name: name
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("Player {}", id)),
            team_id: None,
            role: "Batsman".to_string(),
            batting_style: "Right-handed".to_string(),
            bowling_style: "Right-arm medium".to_string(),
            country: "Unknown".to_string(),
        }
    }
}
