use serde::{Deserialize, Serialize};

/// A cricket team as reported by the upstream provider.
///
/// The id is immutable once observed; every other field may be updated
/// on a later sighting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    /// External team id
    pub id: i64,

    /// Display name
    pub name: String,

    /// Short name (e.g. "IND")
    pub short_name: String,

    /// Country label. The upstream match payloads carry no separate
    /// country field, so this mirrors the display name for national
    /// sides.
    pub country: String,

    /// Source image reference
    pub image_id: i64,
}

impl Team {
    /// Placeholder for a team id referenced before the team itself has
    /// been seen. Overwritten by the real row on its first sighting.
    pub fn placeholder(id: i64) -> Self {
        Self {
            id,
            name: format!("Team {}", id),
            short_name: String::new(),
            country: String::new(),
            image_id: 0,
        }
    }
}
