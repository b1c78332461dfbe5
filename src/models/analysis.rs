//! Derived match assessment: status, role, highlights and grade.

use serde::{Deserialize, Serialize};

use super::{AccountId, MatchId, PlayerMatchRecord};

/// Outcome category, picked by the first matching rule in the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    /// Lost with KDA >= 2.5
    Uncarryable,
    /// Lost with KDA >= 1.4
    TriedHard,
    /// Lost with KDA < 1.4
    Feeder,
    /// Won with KDA >= 3.5
    Smurf,
    /// Won with assists >= 23 and deaths <= 6
    SupportSmurf,
    /// Won with KDA >= 1.4
    SolidPerformance,
    /// Won, everything else
    Carried,
}

impl StatusCategory {
    pub fn title(&self) -> &'static str {
        match self {
            StatusCategory::Uncarryable => "ZOO KEEPER ALERT",
            StatusCategory::TriedHard => "TRIED THEIR BEST ALERT",
            StatusCategory::Feeder => "FEEDER ALERT",
            StatusCategory::Smurf => "SMURF ALERT",
            StatusCategory::SupportSmurf => "SUPPORT SMURF ALERT",
            StatusCategory::SolidPerformance => "SOLID PERFORMANCE ALERT",
            StatusCategory::Carried => "PASSENGER ALERT",
        }
    }

    /// Key into the flavour-message table.
    pub fn message_key(&self) -> &'static str {
        match self {
            StatusCategory::Uncarryable => "uncarryable",
            StatusCategory::TriedHard => "tried_hard",
            StatusCategory::Feeder => "feeder",
            StatusCategory::Smurf => "smurf_alert",
            StatusCategory::SupportSmurf => "super_support",
            StatusCategory::SolidPerformance => "solid_performance",
            StatusCategory::Carried => "carried",
        }
    }

    /// Embed colour as 0xRRGGBB.
    pub fn color(&self) -> u32 {
        match self {
            StatusCategory::Uncarryable => 0xf1c40f,
            StatusCategory::TriedHard => 0xe67e22,
            StatusCategory::Feeder => 0xe74c3c,
            StatusCategory::Smurf => 0x2ecc71,
            StatusCategory::SupportSmurf | StatusCategory::SolidPerformance => 0x1abc9c,
            StatusCategory::Carried => 0x3498db,
        }
    }
}

/// Position approximated from farm priority within the player's team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Carry,
    Midlaner,
    Offlaner,
    Support,
    Unknown,
}

impl Role {
    /// Map a 1-indexed farm rank to a role.
    pub fn from_farm_rank(rank: usize) -> Self {
        match rank {
            1 => Role::Carry,
            2 => Role::Midlaner,
            3 => Role::Offlaner,
            _ => Role::Support,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Carry => write!(f, "Carry"),
            Role::Midlaner => write!(f, "Midlaner"),
            Role::Offlaner => write!(f, "Offlaner"),
            Role::Support => write!(f, "Support"),
            Role::Unknown => write!(f, "Unknown"),
        }
    }
}

/// A notable achievement relative to the player's own team.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Highlight {
    TopGpm,
    TopHeroDamage,
    TopTowerDamage,
    MostKills,
    /// Share of team kills, already capped at 1.0
    KillParticipation { share: f64 },
}

impl std::fmt::Display for Highlight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Highlight::TopGpm => write!(f, "Top GPM on team"),
            Highlight::TopHeroDamage => write!(f, "Top hero damage on team"),
            Highlight::TopTowerDamage => write!(f, "Top tower damage on team"),
            Highlight::MostKills => write!(f, "Most kills on team"),
            Highlight::KillParticipation { share } => {
                write!(f, "Involved in {:.0}% of team's kills", share * 100.0)
            }
        }
    }
}

/// Result of the match analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchAnalysis {
    pub status: StatusCategory,
    pub kda: f64,
    pub role: Role,
    pub highlights: Vec<Highlight>,
}

/// Letter grade derived from the composite rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GradeLetter {
    #[serde(rename = "S+")]
    SPlus,
    S,
    A,
    B,
    C,
    D,
    F,
}

impl GradeLetter {
    /// Thresholds are inclusive upper bounds on the average rank (1 = best of ten).
    pub fn from_average_rank(average_rank: f64) -> Self {
        if average_rank <= 2.0 {
            GradeLetter::SPlus
        } else if average_rank <= 3.0 {
            GradeLetter::S
        } else if average_rank <= 4.0 {
            GradeLetter::A
        } else if average_rank <= 5.5 {
            GradeLetter::B
        } else if average_rank <= 7.0 {
            GradeLetter::C
        } else if average_rank <= 8.5 {
            GradeLetter::D
        } else {
            GradeLetter::F
        }
    }
}

impl std::fmt::Display for GradeLetter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GradeLetter::SPlus => write!(f, "S+"),
            GradeLetter::S => write!(f, "S"),
            GradeLetter::A => write!(f, "A"),
            GradeLetter::B => write!(f, "B"),
            GradeLetter::C => write!(f, "C"),
            GradeLetter::D => write!(f, "D"),
            GradeLetter::F => write!(f, "F"),
        }
    }
}

/// Statistics ranked across all ten participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    GoldPerMin,
    XpPerMin,
    HeroDamage,
    TowerDamage,
    LastHits,
    Assists,
    Deaths,
}

impl Stat {
    pub const ALL: [Stat; 7] = [
        Stat::GoldPerMin,
        Stat::XpPerMin,
        Stat::HeroDamage,
        Stat::TowerDamage,
        Stat::LastHits,
        Stat::Assists,
        Stat::Deaths,
    ];

    pub fn value(&self, record: &PlayerMatchRecord) -> u32 {
        match self {
            Stat::GoldPerMin => record.gold_per_min,
            Stat::XpPerMin => record.xp_per_min,
            Stat::HeroDamage => record.hero_damage,
            Stat::TowerDamage => record.tower_damage,
            Stat::LastHits => record.last_hits,
            Stat::Assists => record.assists,
            Stat::Deaths => record.deaths,
        }
    }

    /// Whether a smaller value ranks better.
    pub fn lower_is_better(&self) -> bool {
        matches!(self, Stat::Deaths)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Stat::GoldPerMin => "GPM",
            Stat::XpPerMin => "XPM",
            Stat::HeroDamage => "Hero Damage",
            Stat::TowerDamage => "Tower Damage",
            Stat::LastHits => "Last Hits",
            Stat::Assists => "Assists",
            Stat::Deaths => "Deaths",
        }
    }
}

/// Where the subject placed for one stat, plus who led it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatRank {
    pub stat: Stat,
    pub value: u32,
    /// 1-indexed position among all participants
    pub rank: usize,
    pub top_value: u32,
    pub top_hero_id: u32,
}

/// Composite grade over the role-relevant stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    pub average_rank: f64,
    pub letter: GradeLetter,
    /// Every ranked stat, in `Stat::ALL` order
    pub ranks: Vec<StatRank>,
}

impl Grade {
    pub fn rank_of(&self, stat: Stat) -> Option<&StatRank> {
        self.ranks.iter().find(|r| r.stat == stat)
    }
}

/// Everything the presentation side needs to announce one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub account_id: AccountId,
    pub match_id: MatchId,
    pub hero_id: u32,
    pub won: bool,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub gold_per_min: u32,
    pub xp_per_min: u32,
    pub last_hits: u32,
    pub hero_damage: u32,
    pub tower_damage: u32,
    pub analysis: MatchAnalysis,
    pub grade: Option<Grade>,
}

impl AnalysisResult {
    /// `kills/deaths/assists` as shown in match summaries.
    pub fn kda_line(&self) -> String {
        format!("{}/{}/{}", self.kills, self.deaths, self.assists)
    }
}
