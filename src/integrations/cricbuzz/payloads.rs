// src/integrations/cricbuzz/payloads.rs
//
// Typed views over the provider's nested JSON.
//
// The provider is inconsistent about types (ids and counts arrive as
// numbers or strings depending on endpoint) and about which fields are
// present at all. Every field here is optional or defaulted, and the
// numeric fields go through lenient deserializers: absence and
// malformed values degrade to defaults, never to errors.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

// ---------------------------------------------------------------------
// Lenient field deserializers
// ---------------------------------------------------------------------

pub(crate) fn flex_i64<'de, D>(de: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(de)?;
    Ok(value.as_ref().and_then(value_to_i64))
}

pub(crate) fn flex_f64<'de, D>(de: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(de)?;
    Ok(value.as_ref().and_then(value_to_f64))
}

pub(crate) fn flex_bool<'de, D>(de: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(de)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0) != 0,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    })
}

fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
        }
        _ => None,
    }
}

fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

// ---------------------------------------------------------------------
// Match lists (recent / live / upcoming)
// ---------------------------------------------------------------------

/// Top level of the three match-list endpoints: a list of "type"
/// groupings (International / League / ...), each holding series
/// groupings, each wrapping the actual match list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatchListPayload {
    pub type_matches: Vec<TypeMatches>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TypeMatches {
    pub match_type: Option<String>,
    pub series_matches: Vec<SeriesMatchesGroup>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SeriesMatchesGroup {
    pub series_ad_wrapper: Option<SeriesAdWrapper>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SeriesAdWrapper {
    #[serde(deserialize_with = "flex_i64")]
    pub series_id: Option<i64>,
    pub series_name: Option<String>,
    pub matches: Vec<MatchWrapper>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatchWrapper {
    pub match_info: Option<MatchInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatchInfo {
    #[serde(deserialize_with = "flex_i64")]
    pub match_id: Option<i64>,
    #[serde(deserialize_with = "flex_i64")]
    pub series_id: Option<i64>,
    pub match_desc: Option<String>,
    pub match_format: Option<String>,
    /// Epoch milliseconds; the provider sends these as strings.
    #[serde(deserialize_with = "flex_i64")]
    pub start_date: Option<i64>,
    #[serde(deserialize_with = "flex_i64")]
    pub end_date: Option<i64>,
    pub state: Option<String>,
    pub status: Option<String>,
    pub team1: Option<TeamInfo>,
    pub team2: Option<TeamInfo>,
    pub venue_info: Option<VenueInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeamInfo {
    #[serde(deserialize_with = "flex_i64")]
    pub team_id: Option<i64>,
    pub team_name: Option<String>,
    #[serde(rename = "teamSName")]
    pub team_s_name: Option<String>,
    #[serde(deserialize_with = "flex_i64")]
    pub image_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VenueInfo {
    #[serde(deserialize_with = "flex_i64")]
    pub id: Option<i64>,
    pub ground: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub timezone: Option<String>,
    #[serde(rename = "lat", deserialize_with = "flex_f64")]
    pub latitude: Option<f64>,
    #[serde(rename = "lng", deserialize_with = "flex_f64")]
    pub longitude: Option<f64>,
    #[serde(deserialize_with = "flex_i64")]
    pub capacity: Option<i64>,
}

// ---------------------------------------------------------------------
// Player list and search
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlayerListPayload {
    pub player: Vec<PlayerEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerEntry {
    #[serde(deserialize_with = "flex_i64")]
    pub id: Option<i64>,
    pub name: Option<String>,
    #[serde(deserialize_with = "flex_i64")]
    pub team_id: Option<i64>,
    pub role: Option<String>,
    pub batting_style: Option<String>,
    pub bowling_style: Option<String>,
    pub country: Option<String>,
    /// Per-format career blocks. An absent or empty block means the
    /// player has no record in that format and yields no stat row.
    #[serde(deserialize_with = "stats_block")]
    pub test: Option<FormatStatsBlock>,
    #[serde(deserialize_with = "stats_block")]
    pub odi: Option<FormatStatsBlock>,
    #[serde(deserialize_with = "stats_block")]
    pub t20: Option<FormatStatsBlock>,
    #[serde(deserialize_with = "stats_block")]
    pub ipl: Option<FormatStatsBlock>,
}

/// Empty objects count as "no stats block", matching the upstream
/// habit of sending `{}` for formats a player never appeared in.
fn stats_block<'de, D>(de: D) -> Result<Option<FormatStatsBlock>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(de)?;
    match value {
        Some(Value::Object(map)) if !map.is_empty() => {
            serde_json::from_value(Value::Object(map))
                .map(Some)
                .map_err(serde::de::Error::custom)
        }
        _ => Ok(None),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormatStatsBlock {
    #[serde(deserialize_with = "flex_i64")]
    pub matches: Option<i64>,
    #[serde(deserialize_with = "flex_i64")]
    pub innings: Option<i64>,
    #[serde(deserialize_with = "flex_i64")]
    pub runs: Option<i64>,
    #[serde(deserialize_with = "flex_i64")]
    pub highest_score: Option<i64>,
    #[serde(deserialize_with = "flex_f64")]
    pub average: Option<f64>,
    #[serde(deserialize_with = "flex_f64")]
    pub strike_rate: Option<f64>,
    #[serde(deserialize_with = "flex_i64")]
    pub centuries: Option<i64>,
    #[serde(deserialize_with = "flex_i64")]
    pub fifties: Option<i64>,
    #[serde(deserialize_with = "flex_i64")]
    pub wickets: Option<i64>,
    #[serde(deserialize_with = "flex_f64")]
    pub bowling_average: Option<f64>,
    #[serde(deserialize_with = "flex_f64")]
    pub economy_rate: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlayerSearchPayload {
    pub player: Vec<PlayerSearchEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerSearchEntry {
    #[serde(deserialize_with = "flex_i64")]
    pub id: Option<i64>,
    pub name: Option<String>,
    pub team_name: Option<String>,
    pub dob: Option<String>,
}

// ---------------------------------------------------------------------
// Series archives and per-series match lists
// ---------------------------------------------------------------------

/// The archives endpoint has two shapes: a flat `series` list, and a
/// `seriesMapProto` list of per-year buckets when filtered by year.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SeriesArchivePayload {
    pub series: Vec<SeriesEntry>,
    pub series_map_proto: Vec<SeriesYearBucket>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SeriesYearBucket {
    /// The year, as a string.
    pub date: Option<String>,
    pub series: Vec<SeriesEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SeriesEntry {
    #[serde(deserialize_with = "flex_i64")]
    pub id: Option<i64>,
    pub name: Option<String>,
    /// Epoch milliseconds, two spellings depending on endpoint shape.
    #[serde(deserialize_with = "flex_i64")]
    pub start_dt: Option<i64>,
    #[serde(deserialize_with = "flex_i64")]
    pub end_dt: Option<i64>,
    #[serde(deserialize_with = "flex_i64")]
    pub start_date: Option<i64>,
    #[serde(deserialize_with = "flex_i64")]
    pub end_date: Option<i64>,
    #[serde(deserialize_with = "flex_i64")]
    pub total_matches: Option<i64>,
    /// Inline match list, only used as a fallback planned-match count.
    pub matches: Vec<Value>,
}

/// Per-series match list. The provider uses four different container
/// keys for the same data depending on series age and kind.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SeriesMatchesPayload {
    pub matches: Vec<MatchWrapper>,
    pub match_list: Vec<MatchWrapper>,
    pub series_matches: Vec<MatchWrapper>,
    pub match_details: Vec<MatchDetail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatchDetail {
    pub match_details_map: Option<MatchDetailsMap>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MatchDetailsMap {
    #[serde(rename = "match")]
    pub matches: Vec<MatchWrapper>,
}

impl SeriesMatchesPayload {
    /// Flatten whichever container the provider used, in the order the
    /// keys are tried upstream.
    pub fn all_matches(&self) -> Vec<&MatchWrapper> {
        if !self.matches.is_empty() {
            return self.matches.iter().collect();
        }
        if !self.match_list.is_empty() {
            return self.match_list.iter().collect();
        }
        if !self.series_matches.is_empty() {
            return self.series_matches.iter().collect();
        }
        self.match_details
            .iter()
            .filter_map(|detail| detail.match_details_map.as_ref())
            .flat_map(|map| map.matches.iter())
            .collect()
    }
}

// ---------------------------------------------------------------------
// Match center and scorecards
// ---------------------------------------------------------------------

/// Match-center payload, consumed for the toss backfill. This endpoint
/// uses all-lowercase keys, unlike the match lists.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MatchCenterPayload {
    #[serde(rename = "tossstatus")]
    pub toss_status: Option<String>,
    pub team1: Option<CenterTeam>,
    pub team2: Option<CenterTeam>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CenterTeam {
    #[serde(rename = "teamid", deserialize_with = "flex_i64")]
    pub team_id: Option<i64>,
    #[serde(rename = "teamname")]
    pub team_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScorecardPayload {
    pub scorecard: Vec<InningsCard>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InningsCard {
    #[serde(rename = "inningsid", deserialize_with = "flex_i64")]
    pub innings_id: Option<i64>,
    pub batsman: Vec<BatsmanLine>,
    /// Deserialized for completeness but never persisted: the schema
    /// has no bowling table.
    pub bowler: Vec<BowlerLine>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BatsmanLine {
    #[serde(deserialize_with = "flex_i64")]
    pub id: Option<i64>,
    pub name: Option<String>,
    #[serde(deserialize_with = "flex_i64")]
    pub runs: Option<i64>,
    #[serde(deserialize_with = "flex_i64")]
    pub balls: Option<i64>,
    #[serde(deserialize_with = "flex_i64")]
    pub fours: Option<i64>,
    #[serde(deserialize_with = "flex_i64")]
    pub sixes: Option<i64>,
    #[serde(rename = "strkrate", deserialize_with = "flex_f64")]
    pub strike_rate: Option<f64>,
    #[serde(rename = "outdec")]
    pub out_description: Option<String>,
    #[serde(rename = "iscaptain", deserialize_with = "flex_bool")]
    pub is_captain: bool,
    #[serde(rename = "iskeeper", deserialize_with = "flex_bool")]
    pub is_keeper: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BowlerLine {
    #[serde(deserialize_with = "flex_i64")]
    pub id: Option<i64>,
    pub name: Option<String>,
    #[serde(deserialize_with = "flex_f64")]
    pub overs: Option<f64>,
    #[serde(deserialize_with = "flex_i64")]
    pub maidens: Option<i64>,
    #[serde(deserialize_with = "flex_i64")]
    pub wickets: Option<i64>,
    #[serde(deserialize_with = "flex_i64")]
    pub runs: Option<i64>,
    #[serde(deserialize_with = "flex_f64")]
    pub economy: Option<f64>,
}
