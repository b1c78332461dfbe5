use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::{AccountId, AnalysisResult, TrackedPlayer};
use crate::poll::{PlayerState, PollReport};
use crate::report::match_summary;
use crate::suggest::{suggest_hero, HeroSuggestion, Position};

#[derive(Debug, Serialize)]
pub struct PlayerEntry {
    #[serde(flatten)]
    pub player: TrackedPlayer,
    pub dedup: PlayerState,
}

#[derive(Debug, Serialize)]
pub struct PlayersResponse {
    pub players: Vec<PlayerEntry>,
    pub total: usize,
}

/// An analysis plus the display strings derived from it.
#[derive(Debug, Serialize)]
pub struct MatchResponse {
    /// Roster entry, when the account is tracked
    pub player: Option<TrackedPlayer>,
    pub hero: String,
    pub summary: String,
    /// Headline for the status category, e.g. `SMURF ALERT`
    pub title: &'static str,
    /// Lookup key for the caller's message templates
    pub message_key: &'static str,
    /// Embed color as `0xRRGGBB`
    pub color: u32,
    pub result: AnalysisResult,
}

fn parse_account(raw: &str) -> Result<AccountId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid account id: {}", raw)))
}

fn describe(state: &AppState, result: AnalysisResult) -> MatchResponse {
    let status = result.analysis.status;
    MatchResponse {
        player: state.poller.find_player(result.account_id).cloned(),
        hero: state.heroes.name(result.hero_id).to_string(),
        summary: match_summary(&result, &state.heroes),
        title: status.title(),
        message_key: status.message_key(),
        color: status.color(),
        result,
    }
}

pub async fn list_players(State(state): State<AppState>) -> Json<PlayersResponse> {
    let mut players = Vec::with_capacity(state.poller.roster().len());
    for player in state.poller.roster() {
        players.push(PlayerEntry {
            player: player.clone(),
            dedup: state.poller.player_state(player.account_id).await,
        });
    }

    let total = players.len();
    Json(PlayersResponse { players, total })
}

/// Fresh fetch of an account's latest match. Does not touch dedup state.
pub async fn last_match(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> Result<Json<MatchResponse>, ApiError> {
    let account_id = parse_account(&account_id)?;
    let result = state.poller.check_one(account_id).await?;
    Ok(Json(describe(&state, result)))
}

/// Most recent analysis held in the poller's cache.
pub async fn cached_status(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> Result<Json<MatchResponse>, ApiError> {
    let account_id = parse_account(&account_id)?;
    let result = state
        .poller
        .latest_analysis(account_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("No analyzed match for {}", account_id)))?;
    Ok(Json(describe(&state, result)))
}

#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    pub position: Option<String>,
}

/// Random hero for the account, annotated with its last match.
///
/// Uses the cached analysis when there is one, otherwise fetches. A failed
/// fetch only drops the annotation.
pub async fn suggest(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    Query(query): Query<SuggestQuery>,
) -> Result<Json<HeroSuggestion>, ApiError> {
    let account_id = parse_account(&account_id)?;
    let position = query
        .position
        .as_deref()
        .map(str::parse::<Position>)
        .transpose()?;

    let latest = match state.poller.latest_analysis(account_id).await {
        Some(result) => Some(result),
        None => match state.poller.check_one(account_id).await {
            Ok(result) => Some(result),
            Err(e) => {
                warn!("No last match for suggestion to {}: {}", account_id, e);
                None
            }
        },
    };

    Ok(Json(suggest_hero(&state.heroes, position, latest.as_ref())?))
}

pub async fn check_all(State(state): State<AppState>) -> Json<PollReport> {
    Json(state.poller.check_all().await)
}

pub async fn tick(State(state): State<AppState>) -> Json<PollReport> {
    Json(state.poller.tick().await)
}
