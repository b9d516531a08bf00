// src/lib.rs
// cricstats - Cricket match and player statistics ingestion pipeline
//
// Architecture:
// - Domain entities keyed by the provider's external ids
// - Repositories: explicit SQL over a pooled SQLite store, one uniform
//   upsert interface
// - Integrations: the rate-limited gateway to the upstream provider
// - Ingest: extractors, upsert writer, reconciliation and the stage
//   orchestrator

pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod ingest;
pub mod integrations;
pub mod repositories;

// ============================================================================
// PUBLIC API - Domain Entities
// ============================================================================

pub use domain::{Match, Player, PlayerStat, ScorecardEntry, Series, Team, TossDecision, Venue};

// ============================================================================
// PUBLIC API - Error Types
// ============================================================================

pub use error::{AppError, AppResult};

// ============================================================================
// PUBLIC API - Database
// ============================================================================

pub use db::{create_connection_pool, initialize_database, raw_query, ConnectionPool};

// ============================================================================
// PUBLIC API - Configuration
// ============================================================================

pub use config::{AppConfig, DatabaseConfig, IngestOptions, ProviderConfig};

// ============================================================================
// PUBLIC API - Repositories
// ============================================================================

pub use repositories::{
    MatchRepository, PlayerRepository, PlayerStatRepository, Repositories, Repository,
    ScorecardRepository, SeriesRepository, TeamRepository, UpsertOutcome, VenueRepository,
};

// ============================================================================
// PUBLIC API - Integrations
// ============================================================================

pub use integrations::{CallBudget, CricbuzzClient, CricketApi};

// ============================================================================
// PUBLIC API - Ingestion Pipeline
// ============================================================================

pub use ingest::{BackfillReport, IngestReport, Orchestrator, ReconcileReport, Stage};
