pub mod players;

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub players: usize,
    pub heroes: usize,
    pub tick: u64,
    pub last_tick_started: Option<DateTime<Utc>>,
    pub last_tick_completed: Option<DateTime<Utc>>,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        players: state.poller.roster().len(),
        heroes: state.heroes.len(),
        tick: state.poller.current_tick().await,
        last_tick_started: state.poller.last_tick_started().await,
        last_tick_completed: state.poller.last_tick_completed().await,
    })
}
