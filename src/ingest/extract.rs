// src/ingest/extract.rs
//
// Entity extractors
//
// Pure mappings from raw provider payloads to candidate rows. All the
// string heuristics live here as free functions so they can be tested
// in isolation. None of them is authoritative: a miss leaves the
// corresponding field unset, it never guesses.

use chrono::{DateTime, Utc};

use crate::domain::{Match, Player, PlayerStat, ScorecardEntry, Series, Team, TossDecision, Venue};
use crate::integrations::cricbuzz::payloads::{
    FormatStatsBlock, MatchCenterPayload, MatchInfo, MatchListPayload, PlayerListPayload,
    ScorecardPayload, SeriesArchivePayload, SeriesEntry, TeamInfo, VenueInfo,
};

/// A match row together with the parent candidates carried by the same
/// payload, so the writer can guarantee the parents exist first.
#[derive(Debug, Clone)]
pub struct MatchCandidate {
    pub row: Match,
    pub team1: Option<Team>,
    pub team2: Option<Team>,
    pub venue: Option<Venue>,
}

/// A scorecard line plus the batsman's display name, kept around for
/// placeholder-player synthesis during backfills.
#[derive(Debug, Clone)]
pub struct ScorecardCandidate {
    pub entry: ScorecardEntry,
    pub player_name: Option<String>,
}

pub fn epoch_millis_to_utc(millis: Option<i64>) -> Option<DateTime<Utc>> {
    millis
        .filter(|&ms| ms != 0)
        .and_then(DateTime::from_timestamp_millis)
}

// ---------------------------------------------------------------------
// Match lists
// ---------------------------------------------------------------------

/// Flatten the three-level nesting (type grouping, series grouping,
/// wrapper) into a flat sequence of match records tagged with the
/// grouping's series id. The grouping itself is dropped.
pub fn flatten_matches(payload: &MatchListPayload) -> Vec<(Option<i64>, &MatchInfo)> {
    let mut flat = Vec::new();
    for type_group in &payload.type_matches {
        for series_group in &type_group.series_matches {
            let Some(wrapper) = &series_group.series_ad_wrapper else {
                continue;
            };
            for match_wrapper in &wrapper.matches {
                if let Some(info) = &match_wrapper.match_info {
                    flat.push((wrapper.series_id, info));
                }
            }
        }
    }
    flat
}

fn team_from_info(info: &TeamInfo) -> Option<Team> {
    let id = info.team_id?;
    let name = info.team_name.clone().unwrap_or_default();
    Some(Team {
        id,
        // The match payloads carry no country field; national sides
        // are their own country
        country: name.clone(),
        name,
        short_name: info.team_s_name.clone().unwrap_or_default(),
        image_id: info.image_id.unwrap_or(0),
    })
}

fn venue_from_info(info: &VenueInfo) -> Option<Venue> {
    let id = info.id?;
    Some(Venue {
        id,
        name: info.ground.clone().unwrap_or_default(),
        city: info.city.clone().unwrap_or_default(),
        country: info.country.clone().unwrap_or_default(),
        capacity: info.capacity.unwrap_or(0),
        timezone: info.timezone.clone(),
        latitude: info.latitude,
        longitude: info.longitude,
    })
}

/// Teams sighted anywhere in a match list, deduplicated by id.
pub fn teams_in(payload: &MatchListPayload) -> Vec<Team> {
    let mut seen = std::collections::HashSet::new();
    let mut teams = Vec::new();
    for (_, info) in flatten_matches(payload) {
        for side in [&info.team1, &info.team2].into_iter().flatten() {
            if let Some(team) = team_from_info(side) {
                if seen.insert(team.id) {
                    teams.push(team);
                }
            }
        }
    }
    teams
}

/// Venues sighted anywhere in a match list, deduplicated by id.
pub fn venues_in(payload: &MatchListPayload) -> Vec<Venue> {
    let mut seen = std::collections::HashSet::new();
    let mut venues = Vec::new();
    for (_, info) in flatten_matches(payload) {
        if let Some(venue) = info.venue_info.as_ref().and_then(venue_from_info) {
            if seen.insert(venue.id) {
                venues.push(venue);
            }
        }
    }
    venues
}

/// Build one match candidate from a match record.
///
/// `series_id` is the grouping's id where available, falling back to
/// the id embedded in the record itself.
pub fn candidate_from_info(series_id: Option<i64>, info: &MatchInfo) -> Option<MatchCandidate> {
    let match_id = info.match_id?;

    let team1 = info.team1.as_ref().and_then(team_from_info);
    let team2 = info.team2.as_ref().and_then(team_from_info);
    let venue = info.venue_info.as_ref().and_then(venue_from_info);

    let status = info.status.clone().unwrap_or_default();
    let competitors: Vec<(i64, &str)> = [&team1, &team2]
        .into_iter()
        .flatten()
        .map(|team| (team.id, team.name.as_str()))
        .collect();
    let winner_id = infer_winner(&status, &competitors);

    let row = Match {
        id: match_id,
        series_id: series_id.or(info.series_id),
        description: info.match_desc.clone().unwrap_or_default(),
        format: info.match_format.clone().unwrap_or_default(),
        start_time: epoch_millis_to_utc(info.start_date),
        end_time: epoch_millis_to_utc(info.end_date),
        team1_id: team1.as_ref().map(|t| t.id),
        team2_id: team2.as_ref().map(|t| t.id),
        venue_id: venue.as_ref().map(|v| v.id),
        winner_id,
        toss_winner_id: None,
        toss_decision: None,
        status,
        state: info.state.clone().unwrap_or_default(),
    };

    Some(MatchCandidate {
        row,
        team1,
        team2,
        venue,
    })
}

/// All match candidates in a match-list payload.
pub fn match_candidates(payload: &MatchListPayload) -> Vec<MatchCandidate> {
    flatten_matches(payload)
        .into_iter()
        .filter_map(|(series_id, info)| candidate_from_info(series_id, info))
        .collect()
}

// ---------------------------------------------------------------------
// Winner and toss heuristics
// ---------------------------------------------------------------------

/// Infer the winner from a free-text status string: a team wins when
/// the status contains "won" and that team's display name.
///
/// Best-effort only. A team whose name is a substring of the opponent's
/// (or of unrelated status text) can produce a false positive, and
/// statuses phrased without "won" produce a false negative. Callers
/// must treat the result as provisional, not authoritative.
pub fn infer_winner(status: &str, competitors: &[(i64, &str)]) -> Option<i64> {
    if !status.contains("won") {
        return None;
    }
    competitors
        .iter()
        .find(|(_, name)| !name.is_empty() && status.contains(name))
        .map(|(id, _)| *id)
}

/// Parse a free-text toss status ("India opt to bat") against the two
/// competing teams.
///
/// The team prefix is matched case-insensitively by substring
/// containment against each competitor's name. When neither side
/// matches, the toss is skipped entirely: a wrong guess would be
/// indistinguishable from real data downstream.
pub fn parse_toss(
    toss_status: &str,
    team1: (Option<i64>, &str),
    team2: (Option<i64>, &str),
) -> Option<(i64, TossDecision)> {
    let lowered = toss_status.to_lowercase();

    let (decision, suffix) = if lowered.contains("opt to bowl") {
        (TossDecision::Bowl, " opt to bowl")
    } else if lowered.contains("opt to bat") {
        (TossDecision::Bat, " opt to bat")
    } else {
        return None;
    };

    let team_name = toss_status.replace(suffix, "");
    let team_name = team_name.trim().to_lowercase();
    if team_name.is_empty() {
        return None;
    }

    if team1.1.to_lowercase().contains(&team_name) {
        return team1.0.map(|id| (id, decision));
    }
    if team2.1.to_lowercase().contains(&team_name) {
        return team2.0.map(|id| (id, decision));
    }
    None
}

/// Resolve the toss from a match-center payload against its two
/// competitors.
pub fn toss_from_center(center: &MatchCenterPayload) -> Option<(i64, TossDecision)> {
    let toss_status = center.toss_status.as_deref()?;
    let team1 = center.team1.as_ref();
    let team2 = center.team2.as_ref();
    parse_toss(
        toss_status,
        (
            team1.and_then(|t| t.team_id),
            team1.and_then(|t| t.team_name.as_deref()).unwrap_or(""),
        ),
        (
            team2.and_then(|t| t.team_id),
            team2.and_then(|t| t.team_name.as_deref()).unwrap_or(""),
        ),
    )
}

// ---------------------------------------------------------------------
// Series
// ---------------------------------------------------------------------

/// Host country, derived from the series name by splitting on the
/// literal " in " and taking the trailing segment. Not a taxonomy;
/// downstream reports are tuned to exactly this output.
pub fn derive_host_country(name: &str) -> String {
    if name.contains(" in ") {
        if let Some(tail) = name.rsplit(" in ").next() {
            return tail.trim().to_string();
        }
    }
    if name.contains(" vs ") {
        return "Multiple Countries".to_string();
    }
    "Unknown".to_string()
}

/// Competition type, derived by substring match against the series
/// name.
pub fn derive_series_type(name: &str) -> String {
    if name.contains("T20") {
        "T20I".to_string()
    } else if name.contains("ODI") {
        "ODI".to_string()
    } else if name.contains("Test") {
        "Test".to_string()
    } else {
        "International".to_string()
    }
}

/// Build a series row from an archive entry.
pub fn series_from_entry(entry: &SeriesEntry) -> Option<Series> {
    let id = entry.id?;
    let name = entry
        .name
        .clone()
        .unwrap_or_else(|| "Unknown Series".to_string());

    let total_matches = entry
        .total_matches
        .unwrap_or(entry.matches.len() as i64);

    Some(Series {
        id,
        host_country: derive_host_country(&name),
        match_type: derive_series_type(&name),
        start_date: epoch_millis_to_utc(entry.start_dt.or(entry.start_date)),
        end_date: epoch_millis_to_utc(entry.end_dt.or(entry.end_date)),
        total_matches,
        name,
    })
}

/// Series rows from the flat archive shape.
pub fn series_candidates(payload: &SeriesArchivePayload) -> Vec<Series> {
    payload
        .series
        .iter()
        .filter_map(series_from_entry)
        .collect()
}

/// The archive entries bucketed under one year, for backfills.
pub fn series_for_year(payload: &SeriesArchivePayload, year: i32) -> Vec<&SeriesEntry> {
    let wanted = year.to_string();
    payload
        .series_map_proto
        .iter()
        .find(|bucket| bucket.date.as_deref() == Some(wanted.as_str()))
        .map(|bucket| bucket.series.iter().collect())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------
// Players and per-format stats
// ---------------------------------------------------------------------

pub fn player_candidates(payload: &PlayerListPayload) -> Vec<Player> {
    payload
        .player
        .iter()
        .filter_map(|entry| {
            let id = entry.id?;
            Some(Player {
                id,
                name: entry.name.clone().unwrap_or_default(),
                team_id: entry.team_id,
                role: entry.role.clone().unwrap_or_default(),
                batting_style: entry.batting_style.clone().unwrap_or_default(),
                bowling_style: entry.bowling_style.clone().unwrap_or_default(),
                country: entry.country.clone().unwrap_or_default(),
            })
        })
        .collect()
}

fn stat_from_block(player_id: i64, format: &str, block: &FormatStatsBlock) -> PlayerStat {
    PlayerStat {
        player_id,
        format: format.to_string(),
        matches: block.matches.unwrap_or(0),
        innings: block.innings.unwrap_or(0),
        runs: block.runs.unwrap_or(0),
        highest_score: block.highest_score.unwrap_or(0),
        average: block.average.unwrap_or(0.0),
        strike_rate: block.strike_rate.unwrap_or(0.0),
        centuries: block.centuries.unwrap_or(0),
        fifties: block.fifties.unwrap_or(0),
        wickets: block.wickets.unwrap_or(0),
        bowling_average: block.bowling_average.unwrap_or(0.0),
        economy_rate: block.economy_rate.unwrap_or(0.0),
    }
}

/// One stat row per format that has a non-empty career block. A player
/// with only a TEST block yields exactly one row, not four.
pub fn player_stat_candidates(payload: &PlayerListPayload) -> Vec<PlayerStat> {
    let mut stats = Vec::new();
    for entry in &payload.player {
        let Some(player_id) = entry.id else { continue };
        let blocks = [
            ("TEST", &entry.test),
            ("ODI", &entry.odi),
            ("T20", &entry.t20),
            ("IPL", &entry.ipl),
        ];
        for (format, block) in blocks {
            if let Some(block) = block {
                stats.push(stat_from_block(player_id, format, block));
            }
        }
    }
    stats
}

// ---------------------------------------------------------------------
// Scorecards
// ---------------------------------------------------------------------

/// One candidate per batsman per innings. Batting position is the
/// 1-based order within the innings card. Bowling blocks in the same
/// payload are not extracted; the schema has nowhere to put them.
pub fn scorecard_candidates(payload: &ScorecardPayload, match_id: i64) -> Vec<ScorecardCandidate> {
    let mut candidates = Vec::new();
    for innings in &payload.scorecard {
        let innings_id = innings.innings_id.unwrap_or(1);
        for (position, batsman) in innings.batsman.iter().enumerate() {
            let Some(player_id) = batsman.id else { continue };
            candidates.push(ScorecardCandidate {
                entry: ScorecardEntry {
                    match_id,
                    innings_id,
                    player_id,
                    runs: batsman.runs.unwrap_or(0),
                    balls: batsman.balls.unwrap_or(0),
                    fours: batsman.fours.unwrap_or(0),
                    sixes: batsman.sixes.unwrap_or(0),
                    strike_rate: batsman.strike_rate.unwrap_or(0.0),
                    batting_position: position as i64 + 1,
                    out_description: batsman.out_description.clone().unwrap_or_default(),
                    is_captain: batsman.is_captain,
                    is_keeper: batsman.is_keeper,
                },
                player_name: batsman.name.clone(),
            });
        }
    }
    candidates
}
