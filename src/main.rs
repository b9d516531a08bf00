// src/main.rs

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use log::info;

use cricstats::config::AppConfig;
use cricstats::db::{create_connection_pool, get_connection, initialize_database};
use cricstats::ingest::Orchestrator;
use cricstats::integrations::{CallBudget, CricbuzzClient};

const USAGE: &str = "usage: cricstats [--config <path>] <command>

commands:
  populate               full ingestion run (default)
  historical [years...]  backfill series/matches/scorecards per year
  worldcups              backfill the configured world cup years
  player-search <name>   look up a player upstream and print the result";

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();

    let mut config_path: Option<PathBuf> = None;
    if args.first().map(String::as_str) == Some("--config") {
        if args.len() < 2 {
            bail!("--config needs a path\n{}", USAGE);
        }
        config_path = Some(PathBuf::from(args.remove(1)));
        args.remove(0);
    }

    let config = AppConfig::load(config_path.as_deref()).context("loading configuration")?;

    // 1. INFRASTRUCTURE
    let db_path = config.database.resolve()?;
    let pool = Arc::new(create_connection_pool(&db_path)?);
    initialize_database(&*get_connection(&pool)?)?;
    info!("store: {}", db_path.display());

    let budget = Arc::new(CallBudget::new(config.ingest.call_budget));
    let client = Arc::new(CricbuzzClient::new(&config.provider, budget)?);

    // 2. PIPELINE
    let orchestrator = Orchestrator::new(client.clone(), pool, config.ingest.clone());

    match args.first().map(String::as_str) {
        None | Some("populate") => {
            let report = orchestrator.run_full().await?;
            println!("{}", report.summary());
        }
        Some("historical") => {
            let years = if args.len() > 1 {
                parse_years(&args[1..])?
            } else {
                config.ingest.historical_years.clone()
            };
            let report = orchestrator
                .run_historical(&years, config.ingest.historical_matches_per_year)
                .await?;
            println!("{}", report.summary());
        }
        Some("worldcups") => {
            let report = orchestrator
                .run_world_cups(&config.ingest.world_cup_years)
                .await?;
            println!("{}", report.summary());
        }
        Some("player-search") => {
            let Some(name) = args.get(1) else {
                bail!("player-search needs a name\n{}", USAGE);
            };
            player_search(&client, name).await?;
        }
        Some(other) => bail!("unknown command: {}\n{}", other, USAGE),
    }

    Ok(())
}

fn parse_years(raw: &[String]) -> Result<Vec<i32>> {
    raw.iter()
        .map(|s| s.parse::<i32>().with_context(|| format!("bad year: {}", s)))
        .collect()
}

/// Look a player up upstream and print their profile and career
/// figures, the same lookups the dashboard's player pages use.
async fn player_search(client: &CricbuzzClient, name: &str) -> Result<()> {
    let Some(results) = client.search_players(name).await else {
        bail!("player search failed (budget spent or provider unavailable)");
    };
    if results.player.is_empty() {
        println!("no players matched '{}'", name);
        return Ok(());
    }

    for entry in &results.player {
        println!(
            "{:>8}  {}  ({})",
            entry.id.map_or_else(|| "?".to_string(), |id| id.to_string()),
            entry.name.as_deref().unwrap_or("?"),
            entry.team_name.as_deref().unwrap_or("unknown team"),
        );
    }

    // Detail lookups for the best match
    if let Some(player_id) = results.player.first().and_then(|entry| entry.id) {
        if let Some(info) = client.player_info(player_id).await {
            println!("\nprofile:\n{}", serde_json::to_string_pretty(&info)?);
        }
        if let Some(batting) = client.player_batting(player_id).await {
            println!("\nbatting:\n{}", serde_json::to_string_pretty(&batting)?);
        }
        if let Some(bowling) = client.player_bowling(player_id).await {
            println!("\nbowling:\n{}", serde_json::to_string_pretty(&bowling)?);
        }
    }

    Ok(())
}
