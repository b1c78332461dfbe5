//! # Dota Watch
//!
//! Watches a roster of Dota 2 players through OpenDota and grades every
//! new match they finish.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (ids, players, match records, analysis results)
//! - **fetch**: OpenDota client and error classification
//! - **calculate**: Team metrics, match analysis and grading
//! - **poll**: Periodic poll/dedup loop and on-demand checks
//! - **storage**: Optional snapshot of the dedup map
//! - **report**: Plain-text rendering of analyses
//! - **suggest**: Random hero picks for a lane position
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod fetch;
pub mod models;
pub mod poll;
pub mod report;
pub mod storage;
pub mod suggest;

pub use models::*;

use std::time::Duration;

/// Parse a human-friendly duration string (e.g., "5m", "90s", "1h").
///
/// A bare number is taken as seconds. Used for `watch --interval`.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('h') {
        (n, 3600)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else {
        // Default to seconds
        (s, 1)
    };

    let num: u64 = num_str.trim().parse().ok()?;
    num.checked_mul(multiplier).map(Duration::from_secs)
}
