//! OpenDota statistics client.
//!
//! Two calls drive the watcher: a cheap "latest match id" lookup and a
//! detailed match fetch. Every failure is classified into a `StatsError`
//! so the poll loop can tell a batch-wide rate limit from a per-player skip.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::models::{AccountId, HeroInfo, MatchDetail, MatchId, PlayerProfile, RecentMatch};

pub const DEFAULT_BASE_URL: &str = "https://api.opendota.com/api/";

/// Fallback wait when a 429 carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Classified outcome of a failed stats call.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum StatsError {
    /// Retryable; aborts the remainder of a poll batch.
    #[error("Rate limited by OpenDota, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// The account has no recent matches. Expected for inactive players.
    #[error("No recent matches for account {0}")]
    NoMatches(AccountId),

    /// Malformed payload, unknown account, or a non-429 HTTP error.
    #[error("Player data error: {0}")]
    PlayerData(String),

    /// Transport failures and anything else.
    #[error("Request failed: {0}")]
    Unclassified(String),
}

impl StatsError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, StatsError::RateLimited { .. })
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            StatsError::RateLimited { .. } => "RATE_LIMITED",
            StatsError::NoMatches(_) => "NO_MATCHES",
            StatsError::PlayerData(_) => "PLAYER_DATA",
            StatsError::Unclassified(_) => "UNCLASSIFIED",
        }
    }
}

impl From<reqwest::Error> for StatsError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            StatsError::PlayerData(e.to_string())
        } else {
            StatsError::Unclassified(e.to_string())
        }
    }
}

/// Map an HTTP status to an error, `None` for success.
fn classify_status(status: StatusCode, retry_after: Option<&str>) -> Option<StatsError> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = retry_after
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
        return Some(StatsError::RateLimited { retry_after_secs });
    }

    if status == StatusCode::NOT_FOUND {
        return Some(StatsError::PlayerData("not found".to_string()));
    }

    if !status.is_success() {
        return Some(StatsError::PlayerData(format!(
            "API error (status {})",
            status.as_u16()
        )));
    }

    None
}

/// Most recent match id from a `recentMatches` payload (newest first).
fn latest_match_id(account_id: AccountId, matches: &[RecentMatch]) -> Result<MatchId, StatsError> {
    matches
        .first()
        .map(|m| m.match_id)
        .ok_or(StatsError::NoMatches(account_id))
}

/// Remote statistics API used by the poll loop.
#[async_trait]
pub trait StatsClient: Send + Sync {
    /// Client name for logging.
    fn name(&self) -> &'static str;

    /// Latest match id for an account (cheap call).
    async fn fetch_recent_match_id(&self, account_id: AccountId) -> Result<MatchId, StatsError>;

    /// Full per-player statistics for a match.
    async fn fetch_match_detail(&self, match_id: MatchId) -> Result<MatchDetail, StatsError>;
}

/// Configuration for the OpenDota client.
#[derive(Debug, Clone)]
pub struct StatsClientConfig {
    /// API root, must end with `/`
    pub base_url: Url,

    /// Per-request timeout
    pub timeout: Duration,

    pub user_agent: String,

    /// Optional OpenDota API key (raises rate limits)
    pub api_key: Option<String>,
}

impl Default for StatsClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            timeout: Duration::from_secs(10),
            user_agent: concat!("dota-watch/", env!("CARGO_PKG_VERSION")).to_string(),
            api_key: None,
        }
    }
}

/// reqwest-backed OpenDota client.
pub struct OpenDotaClient {
    client: Client,
    config: StatsClientConfig,
}

impl OpenDotaClient {
    pub fn new(config: StatsClientConfig) -> Result<Self, StatsError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("dota-watch")),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    pub fn with_defaults() -> Result<Self, StatsError> {
        Self::new(StatsClientConfig::default())
    }

    /// Build an endpoint URL under the API root.
    fn endpoint(&self, path: &str) -> Result<Url, StatsError> {
        let mut url = self
            .config
            .base_url
            .join(path)
            .map_err(|e| StatsError::Unclassified(format!("Invalid URL for {}: {}", path, e)))?;

        if let Some(key) = &self.config.api_key {
            url.query_pairs_mut().append_pair("api_key", key);
        }

        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, StatsError> {
        debug!("GET {}", url.path());

        let response = self.client.get(url).send().await?;

        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        if let Some(err) = classify_status(response.status(), retry_after.as_deref()) {
            return Err(err);
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|e| StatsError::PlayerData(format!("Malformed payload: {}", e)))
    }

    /// All heroes, for id → name lookups.
    pub async fn fetch_heroes(&self) -> Result<Vec<HeroInfo>, StatsError> {
        let heroes: Vec<HeroInfo> = self.get_json(self.endpoint("heroes")?).await?;
        info!("Loaded {} heroes", heroes.len());
        Ok(heroes)
    }

    /// Profile and rank for an account.
    pub async fn fetch_player_profile(
        &self,
        account_id: AccountId,
    ) -> Result<PlayerProfile, StatsError> {
        let url = self.endpoint(&format!("players/{}", account_id))?;
        self.get_json(url).await
    }
}

#[async_trait]
impl StatsClient for OpenDotaClient {
    fn name(&self) -> &'static str {
        "opendota"
    }

    async fn fetch_recent_match_id(&self, account_id: AccountId) -> Result<MatchId, StatsError> {
        let url = self.endpoint(&format!("players/{}/recentMatches", account_id))?;
        let matches: Vec<RecentMatch> = self.get_json(url).await?;
        latest_match_id(account_id, &matches)
    }

    async fn fetch_match_detail(&self, match_id: MatchId) -> Result<MatchDetail, StatsError> {
        let url = self.endpoint(&format!("matches/{}", match_id))?;
        self.get_json(url).await
    }
}

/// Scripted client for tests.
///
/// Each account has a queue of latest-match answers; the last answer repeats
/// once the queue is down to one entry. Unscripted accounts report no matches.
#[cfg(test)]
pub struct MockStatsClient {
    recent: std::sync::Mutex<
        std::collections::HashMap<AccountId, std::collections::VecDeque<Result<MatchId, StatsError>>>,
    >,
    details: std::sync::Mutex<std::collections::HashMap<MatchId, Result<MatchDetail, StatsError>>>,
    recent_calls: std::sync::Mutex<Vec<AccountId>>,
    detail_calls: std::sync::Mutex<Vec<MatchId>>,
}

#[cfg(test)]
impl MockStatsClient {
    pub fn new() -> Self {
        Self {
            recent: Default::default(),
            details: Default::default(),
            recent_calls: Default::default(),
            detail_calls: Default::default(),
        }
    }

    pub fn push_recent(&self, account_id: AccountId, answer: Result<MatchId, StatsError>) {
        self.recent
            .lock()
            .unwrap()
            .entry(account_id)
            .or_default()
            .push_back(answer);
    }

    pub fn set_detail(&self, match_id: MatchId, answer: Result<MatchDetail, StatsError>) {
        self.details.lock().unwrap().insert(match_id, answer);
    }

    pub fn recent_calls(&self) -> Vec<AccountId> {
        self.recent_calls.lock().unwrap().clone()
    }

    pub fn detail_calls(&self) -> Vec<MatchId> {
        self.detail_calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl StatsClient for MockStatsClient {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn fetch_recent_match_id(&self, account_id: AccountId) -> Result<MatchId, StatsError> {
        self.recent_calls.lock().unwrap().push(account_id);

        let mut recent = self.recent.lock().unwrap();
        match recent.get_mut(&account_id) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue
                .front()
                .cloned()
                .unwrap_or(Err(StatsError::NoMatches(account_id))),
            None => Err(StatsError::NoMatches(account_id)),
        }
    }

    async fn fetch_match_detail(&self, match_id: MatchId) -> Result<MatchDetail, StatsError> {
        self.detail_calls.lock().unwrap().push(match_id);

        self.details
            .lock()
            .unwrap()
            .get(&match_id)
            .cloned()
            .unwrap_or_else(|| Err(StatsError::PlayerData(format!("match {} not found", match_id))))
    }
}
