//! Plain-text rendering of analysis results.

use std::fmt;

use crate::models::{AnalysisResult, HeroCatalog, Stat, StatRank};
use crate::poll::{PollOutcome, PollReport};
use crate::suggest::HeroSuggestion;

/// Stats shown in the grade table, in display order.
const TABLE_STATS: [Stat; 5] = [
    Stat::GoldPerMin,
    Stat::XpPerMin,
    Stat::HeroDamage,
    Stat::TowerDamage,
    Stat::LastHits,
];

/// `Last Game: Juggernaut, WON, 720 GPM, 650 XPM, KDA: 12/3/8`
pub fn match_summary(result: &AnalysisResult, heroes: &HeroCatalog) -> String {
    format!(
        "Last Game: {}, {}, {} GPM, {} XPM, KDA: {}",
        heroes.name(result.hero_id),
        if result.won { "WON" } else { "LOST" },
        result.gold_per_min,
        result.xp_per_min,
        result.kda_line()
    )
}

/// One cell of the grade table.
pub fn format_stat(rank: &StatRank, heroes: &HeroCatalog) -> String {
    if rank.rank == 1 {
        format!("{} - Match Leader!", rank.value)
    } else {
        format!(
            "{} - Rank #{} (Top: {} by {})",
            rank.value,
            rank.rank,
            rank.top_value,
            heroes.name(rank.top_hero_id)
        )
    }
}

/// Multi-line announcement for one analyzed match.
pub struct AnalysisView<'a> {
    pub player: &'a str,
    pub result: &'a AnalysisResult,
    pub heroes: &'a HeroCatalog,
}

impl fmt::Display for AnalysisView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.result;
        let analysis = &result.analysis;

        writeln!(f, "{}: {}", analysis.status.title(), self.player)?;
        writeln!(f, "{}", match_summary(result, self.heroes))?;
        writeln!(
            f,
            "Role: {} | KDA ratio: {:.2} | Match {}",
            analysis.role, analysis.kda, result.match_id
        )?;

        match &result.grade {
            Some(grade) => {
                writeln!(
                    f,
                    "Grade: {} (Avg Rank: #{:.1}/10)",
                    grade.letter, grade.average_rank
                )?;
                for stat in TABLE_STATS {
                    if let Some(rank) = grade.rank_of(stat) {
                        writeln!(f, "  {:<13}{}", stat.label(), format_stat(rank, self.heroes))?;
                    }
                }
            }
            None => writeln!(
                f,
                "Performance: {} GPM, {} XPM, {} LH, {} HD, {} TD",
                result.gold_per_min,
                result.xp_per_min,
                result.last_hits,
                result.hero_damage,
                result.tower_damage
            )?,
        }

        if !analysis.highlights.is_empty() {
            writeln!(f, "Highlights:")?;
            for highlight in &analysis.highlights {
                writeln!(f, "  - {}", highlight)?;
            }
        }

        Ok(())
    }
}

pub fn render_analysis(player: &str, result: &AnalysisResult, heroes: &HeroCatalog) -> String {
    AnalysisView {
        player,
        result,
        heroes,
    }
    .to_string()
}

/// One line per player in a pass, for `check` and `watch --once`.
pub struct PollReportView<'a> {
    pub report: &'a PollReport,
    pub heroes: &'a HeroCatalog,
}

impl fmt::Display for PollReportView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.report.polled {
            let name = entry.player.display_name();
            let line = match &entry.outcome {
                PollOutcome::Baseline { match_id } => format!("baseline at match {}", match_id),
                PollOutcome::Unchanged { match_id } => format!("no new match (last {})", match_id),
                PollOutcome::Reported { result } => format!(
                    "{} | {}",
                    result.analysis.status.title(),
                    match_summary(result, self.heroes)
                ),
                PollOutcome::Failed { error } => format!("skipped: {}", error),
            };
            writeln!(f, "{:<20} {}", name, line)?;
        }

        if let Some(error) = &self.report.rate_limited {
            writeln!(f, "Pass stopped early: {}", error)?;
        }

        Ok(())
    }
}

pub fn render_poll_report(report: &PollReport, heroes: &HeroCatalog) -> String {
    PollReportView { report, heroes }.to_string()
}

impl fmt::Display for HeroSuggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(position) => writeln!(f, "Suggested {} hero: {}", position, self.hero_name)?,
            None => writeln!(f, "Suggested hero: {}", self.hero_name)?,
        }

        if let Some(note) = &self.last_match {
            writeln!(
                f,
                "Last match {}: {}, {} kills / {} deaths ({})",
                note.match_id, note.role, note.kills, note.deaths, note.verdict
            )?;
        }
        if let (Some(role), Some(position)) = (self.switching_from, self.position) {
            writeln!(f, "Switching from {} to {}", role, position)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::analyze_detail;
    use crate::calculate::fixtures::sample_detail;
    use crate::fetch::StatsError;
    use crate::models::{AccountId, HeroInfo, MatchId, TrackedPlayer};
    use crate::poll::{PlayerPoll, PollMode};
    use pretty_assertions::assert_eq;

    fn heroes() -> HeroCatalog {
        HeroCatalog::new(vec![
            HeroInfo {
                id: 1,
                name: "npc_dota_hero_antimage".to_string(),
                localized_name: "Anti-Mage".to_string(),
                roles: vec!["Carry".to_string()],
            },
            HeroInfo {
                id: 8,
                name: "npc_dota_hero_juggernaut".to_string(),
                localized_name: "Juggernaut".to_string(),
                roles: vec!["Carry".to_string()],
            },
        ])
    }

    fn carry_result() -> AnalysisResult {
        analyze_detail(&sample_detail(100), AccountId::new(1001)).unwrap()
    }

    #[test]
    fn test_match_summary() {
        let mut result = carry_result();
        result.hero_id = 8;

        assert_eq!(
            match_summary(&result, &heroes()),
            format!(
                "Last Game: Juggernaut, WON, {} GPM, {} XPM, KDA: 12/3/8",
                result.gold_per_min, result.xp_per_min
            )
        );
    }

    #[test]
    fn test_match_summary_unknown_hero() {
        let mut result = carry_result();
        result.hero_id = 9999;
        result.won = false;

        let line = match_summary(&result, &heroes());
        assert!(line.starts_with("Last Game: Unknown Hero, LOST,"));
    }

    #[test]
    fn test_format_stat_leader() {
        let rank = StatRank {
            stat: Stat::GoldPerMin,
            value: 720,
            rank: 1,
            top_value: 720,
            top_hero_id: 8,
        };
        assert_eq!(format_stat(&rank, &heroes()), "720 - Match Leader!");
    }

    #[test]
    fn test_format_stat_ranked() {
        let rank = StatRank {
            stat: Stat::TowerDamage,
            value: 1200,
            rank: 3,
            top_value: 9000,
            top_hero_id: 1,
        };
        assert_eq!(
            format_stat(&rank, &heroes()),
            "1200 - Rank #3 (Top: 9000 by Anti-Mage)"
        );
    }

    #[test]
    fn test_render_analysis_with_grade() {
        let result = carry_result();
        let text = render_analysis("nhearyus", &result, &heroes());

        assert!(text.starts_with(&format!("{}: nhearyus\n", result.analysis.status.title())));
        assert!(text.contains("Role: Carry"));
        assert!(text.contains("Grade: "));
        assert!(text.contains("Avg Rank: #"));
        assert!(text.contains("GPM"));
        assert!(text.contains("Match Leader!"));
        assert!(text.contains("Highlights:\n  - Top GPM on team"));
    }

    #[test]
    fn test_analysis_view_lines() {
        let result = carry_result();
        let heroes = heroes();
        let view = AnalysisView {
            player: "carry",
            result: &result,
            heroes: &heroes,
        };
        let text = view.to_string();
        assert_eq!(text, render_analysis("carry", &result, &heroes));

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "SMURF ALERT: carry");
        assert_eq!(lines[1], match_summary(&result, &heroes));
        assert_eq!(lines[2], "Role: Carry | KDA ratio: 6.67 | Match 100");
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_render_analysis_without_grade() {
        let mut result = carry_result();
        result.grade = None;
        result.analysis.highlights.clear();

        let text = render_analysis("x", &result, &heroes());
        assert!(text.contains("Performance: "));
        assert!(!text.contains("Grade:"));
        assert!(!text.contains("Highlights:"));
    }

    #[test]
    fn test_render_poll_report() {
        let player = TrackedPlayer::new("u1", AccountId::new(1001)).with_name("carry");
        let other = TrackedPlayer::new("u2", AccountId::new(77));
        let report = PollReport {
            mode: PollMode::Tick,
            tick: Some(2),
            polled: vec![
                PlayerPoll {
                    player: player.clone(),
                    outcome: PollOutcome::Reported {
                        result: Box::new(carry_result()),
                    },
                },
                PlayerPoll {
                    player: other,
                    outcome: PollOutcome::Unchanged {
                        match_id: MatchId::new(55),
                    },
                },
            ],
            rate_limited: Some(StatsError::RateLimited {
                retry_after_secs: 60,
            }),
            duration_ms: 3,
        };

        let text = render_poll_report(&report, &heroes());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("carry"));
        assert!(lines[0].contains("Last Game:"));
        assert!(lines[1].starts_with("77"));
        assert!(lines[1].ends_with("no new match (last 55)"));
        assert!(lines[2].starts_with("Pass stopped early"));
    }

    #[test]
    fn test_render_suggestion() {
        use crate::suggest::{suggest_hero, Position};

        let result = carry_result();
        let suggestion = suggest_hero(&heroes(), Some(Position::Carry), Some(&result)).unwrap();
        let text = suggestion.to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Suggested carry hero: "));
        assert_eq!(lines[1], "Last match 100: Carry, 12 kills / 3 deaths (popped off)");

        let mut switched = suggestion.clone();
        switched.position = Some(Position::Support);
        switched.switching_from = Some(crate::models::Role::Carry);
        assert!(switched.to_string().ends_with("Switching from Carry to support\n"));

        let plain = suggest_hero(&heroes(), None, None).unwrap().to_string();
        assert_eq!(plain.lines().count(), 1);
        assert!(plain.starts_with("Suggested hero: "));
    }
}
