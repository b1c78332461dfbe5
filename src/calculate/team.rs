//! Team metrics aggregation.

use serde::Serialize;

use crate::models::PlayerMatchRecord;

/// Totals and averages over one side of a match.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamMetrics {
    pub total_kills: u64,
    pub total_gpm: u64,
    pub total_xpm: u64,
    pub total_last_hits: u64,
    pub total_hero_damage: u64,

    pub avg_gpm: f64,
    pub avg_xpm: f64,
    pub avg_last_hits: f64,
    pub avg_hero_damage: f64,

    /// The team's records, kept for rank lookups
    pub players: Vec<PlayerMatchRecord>,
}

impl TeamMetrics {
    /// Highest value of a stat on this team, `None` for an empty team.
    pub fn max_of(&self, stat: impl Fn(&PlayerMatchRecord) -> u32) -> Option<u32> {
        self.players.iter().map(stat).max()
    }
}

fn average(total: u64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

/// Aggregate a team's records. An empty team yields all zeros.
pub fn calculate_team_metrics(players: &[PlayerMatchRecord]) -> TeamMetrics {
    let mut metrics = TeamMetrics {
        players: players.to_vec(),
        ..Default::default()
    };

    for p in players {
        metrics.total_kills += u64::from(p.kills);
        metrics.total_gpm += u64::from(p.gold_per_min);
        metrics.total_xpm += u64::from(p.xp_per_min);
        metrics.total_last_hits += u64::from(p.last_hits);
        metrics.total_hero_damage += u64::from(p.hero_damage);
    }

    let count = players.len();
    metrics.avg_gpm = average(metrics.total_gpm, count);
    metrics.avg_xpm = average(metrics.total_xpm, count);
    metrics.avg_last_hits = average(metrics.total_last_hits, count);
    metrics.avg_hero_damage = average(metrics.total_hero_damage, count);

    metrics
}
