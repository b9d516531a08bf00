use serde::{Deserialize, Serialize};

/// A cricket ground.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    /// External venue id
    pub id: i64,

    /// Ground name
    pub name: String,

    pub city: String,

    pub country: String,

    /// Seating capacity. Stays 0 until the reconciliation pass assigns
    /// a tier estimate; a positive value is never overwritten by the
    /// heuristic.
    pub capacity: i64,

    pub timezone: Option<String>,

    pub latitude: Option<f64>,

    pub longitude: Option<f64>,
}
