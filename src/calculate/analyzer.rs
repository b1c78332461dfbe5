//! Match analyzer: status category, approximate role and team highlights.

use crate::models::{Highlight, MatchAnalysis, PlayerMatchRecord, Role, StatusCategory};

use super::team::TeamMetrics;

/// Kill participation must exceed this share to be highlighted.
pub const KILL_PARTICIPATION_THRESHOLD: f64 = 0.65;

/// `(kills + assists) / max(1, deaths)`.
pub fn calculate_kda(kills: u32, deaths: u32, assists: u32) -> f64 {
    (u64::from(kills) + u64::from(assists)) as f64 / f64::from(deaths.max(1))
}

/// Pick the status category. Rules overlap, so order matters: first match wins.
pub fn classify_status(won: bool, kda: f64, assists: u32, deaths: u32) -> StatusCategory {
    if !won {
        if kda >= 2.5 {
            StatusCategory::Uncarryable
        } else if kda >= 1.4 {
            StatusCategory::TriedHard
        } else {
            StatusCategory::Feeder
        }
    } else if kda >= 3.5 {
        StatusCategory::Smurf
    } else if assists >= 23 && deaths <= 6 {
        StatusCategory::SupportSmurf
    } else if kda >= 1.4 {
        StatusCategory::SolidPerformance
    } else {
        StatusCategory::Carried
    }
}

/// Approximate position from farm priority: rank within the team by
/// `(last_hits, denies)` descending. Equal farm keeps API order (stable sort).
pub fn approximate_role(subject: &PlayerMatchRecord, team: &[PlayerMatchRecord]) -> Role {
    let Some(account_id) = subject.account_id else {
        return Role::Unknown;
    };

    let mut by_farm: Vec<&PlayerMatchRecord> = team.iter().collect();
    by_farm.sort_by(|a, b| (b.last_hits, b.denies).cmp(&(a.last_hits, a.denies)));

    by_farm
        .iter()
        .position(|p| p.is_account(account_id))
        .map(|i| Role::from_farm_rank(i + 1))
        .unwrap_or(Role::Unknown)
}

/// Team-relative highlights, in a fixed order.
///
/// GPM, hero damage and kills count ties as "top"; tower damage requires a
/// strict lead. The asymmetry is long-standing observable behaviour.
pub fn team_highlights(subject: &PlayerMatchRecord, team: &TeamMetrics) -> Vec<Highlight> {
    let mut highlights = Vec::new();

    if let Some(max_gpm) = team.max_of(|p| p.gold_per_min) {
        if subject.gold_per_min >= max_gpm {
            highlights.push(Highlight::TopGpm);
        }
    }
    if let Some(max_hd) = team.max_of(|p| p.hero_damage) {
        if subject.hero_damage >= max_hd {
            highlights.push(Highlight::TopHeroDamage);
        }
    }
    if let Some(max_td) = team.max_of(|p| p.tower_damage) {
        if subject.tower_damage > max_td {
            highlights.push(Highlight::TopTowerDamage);
        }
    }
    if let Some(max_kills) = team.max_of(|p| p.kills) {
        if subject.kills >= max_kills {
            highlights.push(Highlight::MostKills);
        }
    }

    if team.total_kills > 0 {
        let involvement = (u64::from(subject.kills) + u64::from(subject.assists)) as f64;
        let share = (involvement / team.total_kills as f64).min(1.0);
        if share > KILL_PARTICIPATION_THRESHOLD {
            highlights.push(Highlight::KillParticipation { share });
        }
    }

    highlights
}

/// Analyze one player's match against their own team.
///
/// `_enemy` is accepted so callers pass both sides; none of the current rules
/// look at the opposing team.
pub fn analyze_match(
    subject: &PlayerMatchRecord,
    won: bool,
    team: &TeamMetrics,
    _enemy: &TeamMetrics,
) -> MatchAnalysis {
    let kda = calculate_kda(subject.kills, subject.deaths, subject.assists);

    MatchAnalysis {
        status: classify_status(won, kda, subject.assists, subject.deaths),
        kda,
        role: approximate_role(subject, &team.players),
        highlights: team_highlights(subject, team),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::calculate_team_metrics;
    use crate::models::AccountId;
    use pretty_assertions::assert_eq;

    fn farmer(account: u64, last_hits: u32, denies: u32) -> PlayerMatchRecord {
        PlayerMatchRecord {
            account_id: Some(AccountId::new(account)),
            last_hits,
            denies,
            ..Default::default()
        }
    }

    #[test]
    fn test_kda() {
        assert!((calculate_kda(2, 12, 3) - 0.4167).abs() < 0.001);
        assert_eq!(calculate_kda(5, 0, 3), 8.0);
        assert_eq!(calculate_kda(0, 0, 0), 0.0);
    }

    #[test]
    fn test_kda_does_not_overflow() {
        let kda = calculate_kda(u32::MAX, 1, u32::MAX);
        assert_eq!(kda, 2.0 * u32::MAX as f64);
    }

    #[test]
    fn test_classify_lost() {
        assert_eq!(classify_status(false, 2.5, 0, 0), StatusCategory::Uncarryable);
        assert_eq!(classify_status(false, 2.49, 0, 0), StatusCategory::TriedHard);
        assert_eq!(classify_status(false, 1.4, 0, 0), StatusCategory::TriedHard);
        assert_eq!(classify_status(false, 1.39, 30, 0), StatusCategory::Feeder);
    }

    #[test]
    fn test_classify_fed_example() {
        let kda = calculate_kda(2, 12, 3);
        assert_eq!(classify_status(false, kda, 3, 12), StatusCategory::Feeder);
    }

    #[test]
    fn test_classify_won() {
        // kda 4.0 is dominant regardless of assists
        assert_eq!(classify_status(true, 4.0, 5, 2), StatusCategory::Smurf);
        assert_eq!(classify_status(true, 4.0, 30, 2), StatusCategory::Smurf);
        assert_eq!(classify_status(true, 3.4, 23, 6), StatusCategory::SupportSmurf);
        assert_eq!(classify_status(true, 3.4, 23, 7), StatusCategory::SolidPerformance);
        assert_eq!(classify_status(true, 1.4, 22, 6), StatusCategory::SolidPerformance);
        assert_eq!(classify_status(true, 1.0, 10, 10), StatusCategory::Carried);
    }

    #[test]
    fn test_support_rule_precedes_kda_floor() {
        // the support rule is checked before the kda >= 1.4 floor
        assert_eq!(classify_status(true, 1.2, 23, 6), StatusCategory::SupportSmurf);
    }

    #[test]
    fn test_role_by_farm_rank() {
        let team = vec![
            farmer(1, 50, 2),
            farmer(2, 400, 10),
            farmer(3, 250, 20),
            farmer(4, 300, 5),
            farmer(5, 20, 0),
        ];

        assert_eq!(approximate_role(&team[1], &team), Role::Carry);
        assert_eq!(approximate_role(&team[3], &team), Role::Midlaner);
        assert_eq!(approximate_role(&team[2], &team), Role::Offlaner);
        assert_eq!(approximate_role(&team[0], &team), Role::Support);
        assert_eq!(approximate_role(&team[4], &team), Role::Support);
    }

    #[test]
    fn test_role_rank_one_is_carry_regardless_of_values() {
        let team = vec![farmer(1, 3, 0), farmer(2, 1, 0), farmer(3, 0, 0)];
        assert_eq!(approximate_role(&team[0], &team), Role::Carry);
    }

    #[test]
    fn test_role_denies_break_last_hit_ties() {
        let team = vec![farmer(1, 200, 5), farmer(2, 200, 15)];
        assert_eq!(approximate_role(&team[1], &team), Role::Carry);
        assert_eq!(approximate_role(&team[0], &team), Role::Midlaner);
    }

    #[test]
    fn test_role_full_tie_keeps_list_order() {
        let team = vec![farmer(1, 100, 0), farmer(2, 100, 0)];
        assert_eq!(approximate_role(&team[0], &team), Role::Carry);
        assert_eq!(approximate_role(&team[1], &team), Role::Midlaner);
    }

    #[test]
    fn test_role_unknown_when_missing() {
        let team = vec![farmer(1, 100, 0)];
        assert_eq!(approximate_role(&farmer(9, 500, 0), &team), Role::Unknown);

        let anonymous = PlayerMatchRecord::default();
        assert_eq!(approximate_role(&anonymous, &team), Role::Unknown);
        assert_eq!(approximate_role(&team[0], &[]), Role::Unknown);
    }

    #[test]
    fn test_highlights_ties_count_except_tower_damage() {
        let subject = PlayerMatchRecord {
            account_id: Some(AccountId::new(1)),
            kills: 5,
            gold_per_min: 600,
            hero_damage: 20000,
            tower_damage: 3000,
            ..Default::default()
        };
        let mate = PlayerMatchRecord {
            account_id: Some(AccountId::new(2)),
            kills: 5,
            gold_per_min: 600,
            hero_damage: 20000,
            tower_damage: 3000,
            ..Default::default()
        };
        let team = calculate_team_metrics(&[subject.clone(), mate]);

        let highlights = team_highlights(&subject, &team);

        // Tower damage uses a strict comparison, so a tie does not qualify.
        assert_eq!(
            highlights,
            vec![Highlight::TopGpm, Highlight::TopHeroDamage, Highlight::MostKills]
        );
    }

    #[test]
    fn test_highlight_tower_damage_strict_lead() {
        let subject = PlayerMatchRecord {
            tower_damage: 5000,
            ..Default::default()
        };
        let mate = PlayerMatchRecord {
            gold_per_min: 100,
            hero_damage: 100,
            kills: 1,
            tower_damage: 0,
            ..Default::default()
        };
        // The subject is excluded from the team list here, so a strict lead is possible.
        let team = calculate_team_metrics(&[mate]);

        assert_eq!(team_highlights(&subject, &team), vec![Highlight::TopTowerDamage]);
    }

    #[test]
    fn test_kill_participation_seventy_percent() {
        let subject = PlayerMatchRecord {
            kills: 6,
            assists: 8,
            ..Default::default()
        };
        let others = PlayerMatchRecord {
            kills: 14,
            gold_per_min: 1,
            hero_damage: 1,
            ..Default::default()
        };
        let team = calculate_team_metrics(&[subject.clone(), others]);
        assert_eq!(team.total_kills, 20);

        let highlights = team_highlights(&subject, &team);
        let participation = highlights
            .iter()
            .find(|h| matches!(h, Highlight::KillParticipation { .. }))
            .unwrap();
        assert!(participation.to_string().contains("70%"));
    }

    #[test]
    fn test_kill_participation_capped_and_thresholded() {
        let subject = PlayerMatchRecord {
            kills: 1,
            assists: 30,
            ..Default::default()
        };
        let team = TeamMetrics {
            total_kills: 10,
            ..Default::default()
        };
        assert_eq!(
            team_highlights(&subject, &team),
            vec![Highlight::KillParticipation { share: 1.0 }]
        );

        let team = TeamMetrics {
            total_kills: 100,
            ..Default::default()
        };
        assert!(team_highlights(&subject, &team).is_empty());
    }

    #[test]
    fn test_kill_participation_huge_values() {
        let subject = PlayerMatchRecord {
            kills: u32::MAX,
            assists: u32::MAX,
            ..Default::default()
        };
        let team = TeamMetrics {
            total_kills: 10,
            ..Default::default()
        };

        assert!(team_highlights(&subject, &team)
            .contains(&Highlight::KillParticipation { share: 1.0 }));
    }

    #[test]
    fn test_no_participation_without_team_kills() {
        let subject = PlayerMatchRecord {
            kills: 0,
            assists: 0,
            ..Default::default()
        };
        let team = calculate_team_metrics(&[subject.clone()]);
        assert_eq!(team.total_kills, 0);

        let highlights = team_highlights(&subject, &team);
        assert!(!highlights
            .iter()
            .any(|h| matches!(h, Highlight::KillParticipation { .. })));
    }

    #[test]
    fn test_analyze_match() {
        let subject = PlayerMatchRecord {
            account_id: Some(AccountId::new(1)),
            kills: 8,
            deaths: 2,
            assists: 0,
            last_hits: 300,
            gold_per_min: 650,
            ..Default::default()
        };
        let mate = PlayerMatchRecord {
            account_id: Some(AccountId::new(2)),
            kills: 2,
            deaths: 5,
            last_hits: 80,
            gold_per_min: 300,
            hero_damage: 9000,
            ..Default::default()
        };
        let team = calculate_team_metrics(&[subject.clone(), mate]);
        let enemy = calculate_team_metrics(&[]);

        let analysis = analyze_match(&subject, true, &team, &enemy);

        assert_eq!(analysis.kda, 4.0);
        assert_eq!(analysis.status, StatusCategory::Smurf);
        assert_eq!(analysis.role, Role::Carry);
        assert_eq!(
            analysis.highlights,
            vec![
                Highlight::TopGpm,
                Highlight::MostKills,
                Highlight::KillParticipation { share: 0.8 }
            ]
        );
    }
}
