//! Grading engine: match-wide stat ranks and a role-weighted letter grade.

use crate::models::{Grade, GradeLetter, PlayerMatchRecord, Role, Stat, StatRank};

/// Stats averaged into the composite rank for a role.
pub fn role_stats(role: Role) -> &'static [Stat] {
    match role {
        Role::Offlaner => &[
            Stat::XpPerMin,
            Stat::HeroDamage,
            Stat::TowerDamage,
            Stat::GoldPerMin,
            Stat::Assists,
        ],
        Role::Support => &[Stat::Assists, Stat::Deaths, Stat::HeroDamage, Stat::XpPerMin],
        Role::Carry | Role::Midlaner | Role::Unknown => &[
            Stat::GoldPerMin,
            Stat::XpPerMin,
            Stat::HeroDamage,
            Stat::TowerDamage,
            Stat::LastHits,
        ],
    }
}

/// Rank the subject among all participants for one stat.
///
/// The subject is matched by `player_slot`. Equal values keep participant order.
pub fn rank_stat(
    subject: &PlayerMatchRecord,
    participants: &[PlayerMatchRecord],
    stat: Stat,
) -> Option<StatRank> {
    let mut sorted: Vec<&PlayerMatchRecord> = participants.iter().collect();
    if stat.lower_is_better() {
        sorted.sort_by_key(|p| stat.value(p));
    } else {
        sorted.sort_by(|a, b| stat.value(b).cmp(&stat.value(a)));
    }

    let top = sorted.first()?;
    let position = sorted
        .iter()
        .position(|p| p.player_slot == subject.player_slot)?;

    Some(StatRank {
        stat,
        value: stat.value(subject),
        rank: position + 1,
        top_value: stat.value(top),
        top_hero_id: top.hero_id,
    })
}

/// Grade the subject. `None` when the subject is not among `participants`.
pub fn grade_player(
    subject: &PlayerMatchRecord,
    role: Role,
    participants: &[PlayerMatchRecord],
) -> Option<Grade> {
    let ranks = Stat::ALL
        .iter()
        .map(|stat| rank_stat(subject, participants, *stat))
        .collect::<Option<Vec<_>>>()?;

    let selected = role_stats(role);
    let sum: usize = ranks
        .iter()
        .filter(|r| selected.contains(&r.stat))
        .map(|r| r.rank)
        .sum();
    let average_rank = sum as f64 / selected.len() as f64;

    Some(Grade {
        average_rank,
        letter: GradeLetter::from_average_rank(average_rank),
        ranks,
    })
}
