// src/integrations/cricbuzz/client.rs
//
// Rate-limited gateway to the upstream provider
//
// CRITICAL RULES:
// - This is INFRASTRUCTURE, not DOMAIN
// - Fail-closed: once the call budget is spent, no request leaves the
//   process and callers see the `None` sentinel
// - An attempt is counted against the budget whatever its outcome
// - No retries; a failed call is logged and reported as `None`

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ProviderConfig;
use crate::error::AppResult;

use super::budget::CallBudget;
use super::payloads::{
    MatchCenterPayload, MatchListPayload, PlayerListPayload, PlayerSearchPayload,
    ScorecardPayload, SeriesArchivePayload, SeriesMatchesPayload,
};
use super::CricketApi;

/// Client for the keyed REST provider.
///
/// The budget is injected rather than owned: it is the single piece of
/// state shared across the whole run, and the orchestrator needs to
/// read it for reporting and for the backfill early-halt guard.
pub struct CricbuzzClient {
    base_url: String,
    api_key: String,
    api_host: String,
    http_client: Client,
    budget: Arc<CallBudget>,
}

impl CricbuzzClient {
    pub fn new(provider: &ProviderConfig, budget: Arc<CallBudget>) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(provider.timeout_secs))
            .build()?;

        Ok(Self {
            base_url: provider.base_url.trim_end_matches('/').to_string(),
            api_key: provider.api_key.clone(),
            api_host: provider.api_host.clone(),
            http_client,
            budget,
        })
    }

    /// Issue one GET against the provider.
    ///
    /// Returns the decoded body on a 200 response; `None` on budget
    /// exhaustion (without touching the network) and on every failure
    /// mode. Callers treat `None` as "skip this stage", not as an
    /// error.
    pub async fn call(&self, endpoint: &str, params: &[(&str, String)]) -> Option<Value> {
        if !self.budget.try_acquire() {
            debug!(
                "call budget exhausted ({} calls), skipping {}",
                self.budget.limit(),
                endpoint
            );
            return None;
        }

        let url = format!("{}{}", self.base_url, endpoint);
        let request = self
            .http_client
            .get(&url)
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", &self.api_host)
            .query(params);

        match request.send().await {
            Ok(response) if response.status().is_success() => {
                match response.json::<Value>().await {
                    Ok(body) => Some(body),
                    Err(e) => {
                        warn!("non-JSON body from {}: {}", endpoint, e);
                        None
                    }
                }
            }
            Ok(response) => {
                warn!("provider returned {} for {}", response.status(), endpoint);
                None
            }
            Err(e) => {
                warn!("call to {} failed: {}", endpoint, e);
                None
            }
        }
    }

    async fn call_typed<T>(&self, endpoint: &str, params: &[(&str, String)]) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let body = self.call(endpoint, params).await?;
        match serde_json::from_value(body) {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!("unexpected payload shape from {}: {}", endpoint, e);
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Endpoints consumed by the dashboard / query layer
    // ------------------------------------------------------------------

    /// Search players by name.
    pub async fn search_players(&self, name: &str) -> Option<PlayerSearchPayload> {
        self.call_typed("/stats/v1/player/search", &[("plrN", name.to_string())])
            .await
    }

    /// Raw per-player profile.
    pub async fn player_info(&self, player_id: i64) -> Option<Value> {
        self.call(&format!("/stats/v1/player/{}", player_id), &[])
            .await
    }

    /// Raw per-player batting career figures.
    pub async fn player_batting(&self, player_id: i64) -> Option<Value> {
        self.call(&format!("/stats/v1/player/{}/batting", player_id), &[])
            .await
    }

    /// Raw per-player bowling career figures.
    pub async fn player_bowling(&self, player_id: i64) -> Option<Value> {
        self.call(&format!("/stats/v1/player/{}/bowling", player_id), &[])
            .await
    }
}

#[async_trait]
impl CricketApi for CricbuzzClient {
    fn budget(&self) -> &CallBudget {
        &self.budget
    }

    async fn recent_matches(&self) -> Option<MatchListPayload> {
        self.call_typed("/matches/v1/recent", &[]).await
    }

    async fn live_matches(&self) -> Option<MatchListPayload> {
        self.call_typed("/matches/v1/live", &[]).await
    }

    async fn upcoming_matches(&self) -> Option<MatchListPayload> {
        self.call_typed("/matches/v1/upcoming", &[]).await
    }

    async fn player_list(&self) -> Option<PlayerListPayload> {
        self.call_typed("/stats/v1/player", &[]).await
    }

    async fn series_archives(&self, year: Option<i32>) -> Option<SeriesArchivePayload> {
        let params: Vec<(&str, String)> = match year {
            Some(year) => vec![("year", year.to_string())],
            None => Vec::new(),
        };
        self.call_typed("/series/v1/archives/international", &params)
            .await
    }

    async fn series_matches(&self, series_id: i64) -> Option<SeriesMatchesPayload> {
        self.call_typed(&format!("/series/v1/{}", series_id), &[])
            .await
    }

    async fn match_center(&self, match_id: i64) -> Option<MatchCenterPayload> {
        self.call_typed(&format!("/mcenter/v1/{}", match_id), &[])
            .await
    }

    async fn match_scorecard(&self, match_id: i64) -> Option<ScorecardPayload> {
        self.call_typed(&format!("/mcenter/v1/{}/scard", match_id), &[])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(budget: Arc<CallBudget>) -> CricbuzzClient {
        let provider = ProviderConfig {
            api_key: "test-key".to_string(),
            api_host: "example.invalid".to_string(),
            // Nothing listens here; any attempted call fails fast
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_secs: 1,
        };
        CricbuzzClient::new(&provider, budget).unwrap()
    }

    #[tokio::test]
    async fn test_exhausted_budget_skips_the_network() {
        let budget = Arc::new(CallBudget::new(0));
        let client = test_client(budget.clone());

        assert!(client.call("/matches/v1/recent", &[]).await.is_none());
        // No attempt was counted, because none was made
        assert_eq!(budget.used(), 0);
    }

    #[tokio::test]
    async fn test_failed_calls_still_consume_budget() {
        let budget = Arc::new(CallBudget::new(2));
        let client = test_client(budget.clone());

        assert!(client.call("/matches/v1/recent", &[]).await.is_none());
        assert!(client.recent_matches().await.is_none());
        assert_eq!(budget.used(), 2);

        // Third attempt is refused before reaching the transport
        assert!(client.call("/matches/v1/live", &[]).await.is_none());
        assert_eq!(budget.used(), 2);
    }
}
