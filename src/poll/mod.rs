//! Poll/dedup loop.
//!
//! For each tracked player, per tick:
//! 1. Fetch the latest match id (cheap call)
//! 2. Compare it with the last id already seen for that player
//! 3. Only on a change from a known id, fetch the match, analyze it and report
//!
//! The first id ever observed for a player is a baseline and is never
//! announced. Reporting is at-most-once: the seen id advances before the
//! detail fetch, so a match whose detail fails is not retried.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::calculate::analyze_detail;
use crate::fetch::{StatsClient, StatsError};
use crate::models::{AccountId, AnalysisResult, MatchId, TrackedPlayer};
use crate::storage::{SeenMap, SeenStore};

/// Last match fully processed for a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchSummaryRef {
    pub match_id: MatchId,
    /// Tick on which the id was recorded (0 for restored or on-demand entries)
    pub fetched_at_tick: u64,
}

/// Dedup state of one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PlayerState {
    Unknown,
    Seen(MatchSummaryRef),
}

/// What a freshly fetched id means for a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Baseline,
    Unchanged,
    New,
}

/// State shared by the background loop and on-demand queries.
#[derive(Debug, Default)]
struct PollState {
    seen: HashMap<AccountId, MatchSummaryRef>,
    /// Most recent analysis per account
    latest: HashMap<AccountId, AnalysisResult>,
    tick: u64,
    last_tick_started: Option<DateTime<Utc>>,
    last_tick_completed: Option<DateTime<Utc>>,
}

impl PollState {
    /// Classify and record an observed id in one step.
    fn observe(&mut self, account_id: AccountId, match_id: MatchId, tick: u64) -> Transition {
        let next = MatchSummaryRef {
            match_id,
            fetched_at_tick: tick,
        };

        match self.seen.insert(account_id, next) {
            None => Transition::Baseline,
            Some(prev) if prev.match_id == match_id => {
                // keep the tick the id was first recorded on
                self.seen.insert(account_id, prev);
                Transition::Unchanged
            }
            Some(_) => Transition::New,
        }
    }
}

/// Result of polling one player.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PollOutcome {
    /// First observation; recorded, not announced
    Baseline { match_id: MatchId },
    /// Same match as last time
    Unchanged { match_id: MatchId },
    /// New match analyzed and announced
    Reported { result: Box<AnalysisResult> },
    /// Skipped for this round
    Failed { error: StatsError },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerPoll {
    pub player: TrackedPlayer,
    #[serde(flatten)]
    pub outcome: PollOutcome,
}

/// Which suppression policy a pass ran with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PollMode {
    /// Background tick: baseline suppression on, dedup state advanced
    Tick,
    /// Manual check: always reports the latest match
    ForceCheck,
}

/// Outcome of one pass over the roster.
#[derive(Debug, Clone, Serialize)]
pub struct PollReport {
    pub mode: PollMode,
    /// Tick number, `None` for force checks
    pub tick: Option<u64>,
    /// Players handled before the pass ended, in roster order
    pub polled: Vec<PlayerPoll>,
    /// Set when a rate limit ended the pass early
    pub rate_limited: Option<StatsError>,
    pub duration_ms: u64,
}

impl PollReport {
    fn new(mode: PollMode, tick: Option<u64>) -> Self {
        Self {
            mode,
            tick,
            polled: Vec::new(),
            rate_limited: None,
            duration_ms: 0,
        }
    }

    pub fn aborted(&self) -> bool {
        self.rate_limited.is_some()
    }

    /// Analyses to announce.
    pub fn notifications(&self) -> impl Iterator<Item = &AnalysisResult> {
        self.polled.iter().filter_map(|p| match &p.outcome {
            PollOutcome::Reported { result } => Some(result.as_ref()),
            _ => None,
        })
    }

    fn push(&mut self, player: &TrackedPlayer, outcome: PollOutcome) {
        self.polled.push(PlayerPoll {
            player: player.clone(),
            outcome,
        });
    }
}

/// Configuration for the poller.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Players to watch, in poll order
    pub roster: Vec<TrackedPlayer>,

    /// Time between background ticks
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            roster: Vec::new(),
            interval: Duration::from_secs(300),
        }
    }
}

/// Owns the dedup state and drives the fetch → analyze pipeline.
pub struct MatchPoller {
    config: PollConfig,
    client: Arc<dyn StatsClient>,
    state: Mutex<PollState>,
    /// Serializes ticks so two never overlap
    tick_guard: Mutex<()>,
    store: Option<SeenStore>,
    cancel_token: RwLock<bool>,
}

impl MatchPoller {
    pub fn new(config: PollConfig, client: Arc<dyn StatsClient>) -> Self {
        Self {
            config,
            client,
            state: Mutex::new(PollState::default()),
            tick_guard: Mutex::new(()),
            store: None,
            cancel_token: RwLock::new(false),
        }
    }

    /// Persist the dedup map to `store` after every tick.
    pub fn with_store(mut self, store: SeenStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn roster(&self) -> &[TrackedPlayer] {
        &self.config.roster
    }

    pub fn interval(&self) -> Duration {
        self.config.interval
    }

    pub fn find_player(&self, account_id: AccountId) -> Option<&TrackedPlayer> {
        self.config.roster.iter().find(|p| p.account_id == account_id)
    }

    pub async fn player_state(&self, account_id: AccountId) -> PlayerState {
        match self.state.lock().await.seen.get(&account_id) {
            Some(summary) => PlayerState::Seen(*summary),
            None => PlayerState::Unknown,
        }
    }

    /// Cached analysis from the last report or on-demand check.
    pub async fn latest_analysis(&self, account_id: AccountId) -> Option<AnalysisResult> {
        self.state.lock().await.latest.get(&account_id).cloned()
    }

    pub async fn current_tick(&self) -> u64 {
        self.state.lock().await.tick
    }

    pub async fn last_tick_started(&self) -> Option<DateTime<Utc>> {
        self.state.lock().await.last_tick_started
    }

    pub async fn last_tick_completed(&self) -> Option<DateTime<Utc>> {
        self.state.lock().await.last_tick_completed
    }

    /// Copy of the dedup map, suitable for persisting.
    pub async fn seen_snapshot(&self) -> SeenMap {
        self.state
            .lock()
            .await
            .seen
            .iter()
            .map(|(account, summary)| (*account, summary.match_id))
            .collect()
    }

    /// Seed the dedup map, e.g. from a previous run.
    pub async fn restore_seen(&self, seen: SeenMap) {
        let mut state = self.state.lock().await;
        for (account_id, match_id) in seen {
            state.seen.insert(
                account_id,
                MatchSummaryRef {
                    match_id,
                    fetched_at_tick: 0,
                },
            );
        }
        info!("Restored {} seen matches", state.seen.len());
    }

    /// Fetch, analyze and cache a specific match for an account.
    async fn analyze(
        &self,
        account_id: AccountId,
        match_id: MatchId,
    ) -> Result<AnalysisResult, StatsError> {
        let detail = self.client.fetch_match_detail(match_id).await?;

        let result = analyze_detail(&detail, account_id).ok_or_else(|| {
            StatsError::PlayerData(format!(
                "Account {} not found in match {}",
                account_id, match_id
            ))
        })?;

        self.state
            .lock()
            .await
            .latest
            .insert(account_id, result.clone());

        Ok(result)
    }

    /// Analyze an account's latest match regardless of dedup state.
    pub async fn check_one(&self, account_id: AccountId) -> Result<AnalysisResult, StatsError> {
        let match_id = self.client.fetch_recent_match_id(account_id).await?;
        self.analyze(account_id, match_id).await
    }

    /// Manual force check of the whole roster.
    ///
    /// Reports every player's latest match, including never-seen ones. The dedup
    /// map is left alone so the background loop still announces new matches.
    pub async fn check_all(&self) -> PollReport {
        let start = Instant::now();
        let mut report = PollReport::new(PollMode::ForceCheck, None);

        info!("Force check of {} players", self.config.roster.len());

        for player in &self.config.roster {
            match self.check_one(player.account_id).await {
                Ok(result) => report.push(
                    player,
                    PollOutcome::Reported {
                        result: Box::new(result),
                    },
                ),
                Err(e) if e.is_rate_limited() => {
                    warn!("Rate limited during force check at {}", player.account_id);
                    report.rate_limited = Some(e);
                    break;
                }
                Err(e) => {
                    warn!("Force check skipped {}: {}", player.account_id, e);
                    report.push(player, PollOutcome::Failed { error: e });
                }
            }
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        report
    }

    /// One background pass with baseline suppression.
    ///
    /// A rate limit stops the pass; the remaining players wait for the next tick.
    pub async fn tick(&self) -> PollReport {
        let _guard = self.tick_guard.lock().await;
        let start = Instant::now();

        let tick = {
            let mut state = self.state.lock().await;
            state.tick += 1;
            state.last_tick_started = Some(Utc::now());
            state.tick
        };
        let mut report = PollReport::new(PollMode::Tick, Some(tick));

        debug!("Tick {} over {} players", tick, self.config.roster.len());

        for player in &self.config.roster {
            let account_id = player.account_id;

            let match_id = match self.client.fetch_recent_match_id(account_id).await {
                Ok(id) => id,
                Err(e) if e.is_rate_limited() => {
                    warn!("Rate limited at {}; skipping rest of tick {}", account_id, tick);
                    report.rate_limited = Some(e);
                    break;
                }
                Err(e) => {
                    warn!("Skipping {} in tick {}: {}", account_id, tick, e);
                    report.push(player, PollOutcome::Failed { error: e });
                    continue;
                }
            };

            let transition = self.state.lock().await.observe(account_id, match_id, tick);

            match transition {
                Transition::Baseline => {
                    info!("Baseline for {}: match {}", account_id, match_id);
                    report.push(player, PollOutcome::Baseline { match_id });
                }
                Transition::Unchanged => {
                    debug!("No new match for {}", account_id);
                    report.push(player, PollOutcome::Unchanged { match_id });
                }
                Transition::New => match self.analyze(account_id, match_id).await {
                    Ok(result) => {
                        info!(
                            "New match {} for {}: {}",
                            match_id,
                            account_id,
                            result.analysis.status.title()
                        );
                        report.push(
                            player,
                            PollOutcome::Reported {
                                result: Box::new(result),
                            },
                        );
                    }
                    Err(e) => {
                        // The id stays recorded as seen; this match will not be retried.
                        error!("Dropping match {} for {}: {}", match_id, account_id, e);
                        let rate_limited = e.is_rate_limited();
                        report.push(player, PollOutcome::Failed { error: e.clone() });
                        if rate_limited {
                            report.rate_limited = Some(e);
                            break;
                        }
                    }
                },
            }
        }

        self.state.lock().await.last_tick_completed = Some(Utc::now());
        self.persist().await;

        report.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            "Tick {} done: {} polled, {} reported{} in {}ms",
            tick,
            report.polled.len(),
            report.notifications().count(),
            if report.aborted() { " (rate limited)" } else { "" },
            report.duration_ms
        );

        report
    }

    async fn persist(&self) {
        let Some(store) = &self.store else {
            return;
        };

        let snapshot = self.seen_snapshot().await;
        if let Err(e) = store.save(&snapshot) {
            error!("Failed to persist seen matches: {}", e);
        }
    }

    /// Stop the periodic loop after its current tick.
    pub async fn cancel(&self) {
        *self.cancel_token.write().await = true;
    }

    pub async fn is_cancelled(&self) -> bool {
        *self.cancel_token.read().await
    }

    /// Run ticks forever, sending every reported analysis to `notify`.
    ///
    /// A tick that overruns the interval delays the next one.
    pub async fn run_periodic(self: Arc<Self>, notify: mpsc::Sender<AnalysisResult>) {
        let mut ticker = interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Watching {} players every {:?} via {}",
            self.config.roster.len(),
            self.config.interval,
            self.client.name()
        );

        loop {
            ticker.tick().await;

            if self.is_cancelled().await {
                info!("Periodic polling stopped");
                break;
            }

            let report = self.tick().await;
            for result in report.notifications() {
                if notify.send(result.clone()).await.is_err() {
                    warn!("Notification receiver dropped; stopping periodic polling");
                    return;
                }
            }
        }
    }
}
