//! Random hero picks, optionally narrowed to a lane position.
//!
//! The pick is annotated with how the player's last analyzed match went,
//! so callers can comment on it alongside the suggestion.

use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{AnalysisResult, HeroCatalog, MatchId, Role};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SuggestError {
    #[error("Unknown position '{0}', expected carry, mid, offlane or support")]
    UnknownPosition(String),

    #[error("No heroes available for {0}")]
    NoHeroes(String),
}

/// Lane position a suggestion can be narrowed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Carry,
    Mid,
    Offlane,
    Support,
}

impl Position {
    /// OpenDota hero roles that fit the position.
    pub fn hero_roles(&self) -> &'static [&'static str] {
        match self {
            Position::Carry => &["Carry"],
            Position::Mid => &["Nuker", "Disabler", "Escape"],
            Position::Offlane => &["Durable", "Initiator", "Disabler"],
            Position::Support => &["Support"],
        }
    }

    /// Whether the analyzer's farm-based role corresponds to this position.
    pub fn matches_role(&self, role: Role) -> bool {
        matches!(
            (self, role),
            (Position::Carry, Role::Carry)
                | (Position::Mid, Role::Midlaner)
                | (Position::Offlane, Role::Offlaner)
                | (Position::Support, Role::Support)
        )
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Carry => write!(f, "carry"),
            Position::Mid => write!(f, "mid"),
            Position::Offlane => write!(f, "offlane"),
            Position::Support => write!(f, "support"),
        }
    }
}

impl FromStr for Position {
    type Err = SuggestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "carry" => Ok(Position::Carry),
            "mid" => Ok(Position::Mid),
            "offlane" => Ok(Position::Offlane),
            "support" => Ok(Position::Support),
            _ => Err(SuggestError::UnknownPosition(s.trim().to_string())),
        }
    }
}

/// One-word read on the last match, from kills and deaths alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// More deaths than kills, and more than 8 deaths
    Fed,
    /// More kills than deaths, and more than 10 kills
    PoppedOff,
    Average,
}

impl Verdict {
    pub fn from_kills_deaths(kills: u32, deaths: u32) -> Self {
        if deaths > kills && deaths > 8 {
            Verdict::Fed
        } else if kills > deaths && kills > 10 {
            Verdict::PoppedOff
        } else {
            Verdict::Average
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Fed => write!(f, "fed"),
            Verdict::PoppedOff => write!(f, "popped off"),
            Verdict::Average => write!(f, "average"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastMatchNote {
    pub match_id: MatchId,
    pub role: Role,
    pub kills: u32,
    pub deaths: u32,
    pub verdict: Verdict,
}

impl LastMatchNote {
    pub fn from_result(result: &AnalysisResult) -> Self {
        Self {
            match_id: result.match_id,
            role: result.analysis.role,
            kills: result.kills,
            deaths: result.deaths,
            verdict: Verdict::from_kills_deaths(result.kills, result.deaths),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroSuggestion {
    pub hero_id: u32,
    pub hero_name: String,
    /// Portrait key, e.g. `antimage`
    pub image_key: String,
    pub position: Option<Position>,
    pub last_match: Option<LastMatchNote>,
    /// Role from the last match when it differs from the requested position
    pub switching_from: Option<Role>,
}

/// Pick a random hero for `position` (any hero when `None`).
pub fn suggest_hero(
    catalog: &HeroCatalog,
    position: Option<Position>,
    latest: Option<&AnalysisResult>,
) -> Result<HeroSuggestion, SuggestError> {
    suggest_hero_with(catalog, position, latest, &mut rand::thread_rng())
}

/// Same as [`suggest_hero`], drawing from the given generator.
pub fn suggest_hero_with<R: Rng + ?Sized>(
    catalog: &HeroCatalog,
    position: Option<Position>,
    latest: Option<&AnalysisResult>,
    rng: &mut R,
) -> Result<HeroSuggestion, SuggestError> {
    let roles = position.map(|p| p.hero_roles()).unwrap_or(&[]);
    let pool = catalog.ids_with_any_role(roles);

    let hero = pool
        .choose(rng)
        .and_then(|id| catalog.get(*id))
        .ok_or_else(|| {
            SuggestError::NoHeroes(
                position
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "any position".to_string()),
            )
        })?;

    let last_match = latest.map(LastMatchNote::from_result);
    let switching_from = match (position, &last_match) {
        (Some(p), Some(note)) if note.role != Role::Unknown && !p.matches_role(note.role) => {
            Some(note.role)
        }
        _ => None,
    };

    Ok(HeroSuggestion {
        hero_id: hero.id,
        hero_name: hero.localized_name.clone(),
        image_key: hero.image_key().to_string(),
        position,
        last_match,
        switching_from,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::analyze_detail;
    use crate::calculate::fixtures::sample_detail;
    use crate::models::{AccountId, HeroInfo};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn hero(id: u32, key: &str, name: &str, roles: &[&str]) -> HeroInfo {
        HeroInfo {
            id,
            name: format!("npc_dota_hero_{}", key),
            localized_name: name.to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    fn catalog() -> HeroCatalog {
        HeroCatalog::new(vec![
            hero(1, "antimage", "Anti-Mage", &["Carry", "Escape", "Nuker"]),
            hero(2, "axe", "Axe", &["Initiator", "Durable", "Disabler"]),
            hero(5, "crystal_maiden", "Crystal Maiden", &["Support", "Disabler", "Nuker"]),
            hero(8, "juggernaut", "Juggernaut", &["Carry", "Pusher", "Escape"]),
            hero(26, "lion", "Lion", &["Support", "Disabler", "Nuker", "Initiator"]),
        ])
    }

    fn draws(position: Option<Position>) -> HashSet<u32> {
        let catalog = catalog();
        let mut rng = StdRng::seed_from_u64(7);
        (0..200)
            .map(|_| {
                suggest_hero_with(&catalog, position, None, &mut rng)
                    .unwrap()
                    .hero_id
            })
            .collect()
    }

    #[test]
    fn test_position_parse() {
        assert_eq!("carry".parse::<Position>().unwrap(), Position::Carry);
        assert_eq!(" MID ".parse::<Position>().unwrap(), Position::Mid);
        assert_eq!("Offlane".parse::<Position>().unwrap(), Position::Offlane);
        assert_eq!("support".parse::<Position>().unwrap(), Position::Support);
    }

    #[test]
    fn test_unknown_position() {
        let err = "jungle".parse::<Position>().unwrap_err();
        assert_eq!(err, SuggestError::UnknownPosition("jungle".to_string()));
        assert!(err.to_string().contains("jungle"));
    }

    #[test]
    fn test_carry_pool() {
        assert_eq!(draws(Some(Position::Carry)), HashSet::from([1, 8]));
    }

    #[test]
    fn test_support_pool() {
        assert_eq!(draws(Some(Position::Support)), HashSet::from([5, 26]));
    }

    #[test]
    fn test_mid_pool_takes_any_listed_role() {
        // Nuker, Disabler or Escape
        assert_eq!(draws(Some(Position::Mid)), HashSet::from([1, 2, 5, 8, 26]));
    }

    #[test]
    fn test_offlane_pool() {
        assert_eq!(draws(Some(Position::Offlane)), HashSet::from([2, 5, 26]));
    }

    #[test]
    fn test_no_position_uses_every_hero() {
        assert_eq!(draws(None), HashSet::from([1, 2, 5, 8, 26]));
    }

    #[test]
    fn test_empty_pool_is_an_error() {
        let catalog = HeroCatalog::new(vec![hero(1, "antimage", "Anti-Mage", &["Carry"])]);
        let err = suggest_hero(&catalog, Some(Position::Support), None).unwrap_err();
        assert_eq!(err, SuggestError::NoHeroes("support".to_string()));

        let err = suggest_hero(&HeroCatalog::default(), None, None).unwrap_err();
        assert_eq!(err, SuggestError::NoHeroes("any position".to_string()));
    }

    #[test]
    fn test_suggestion_fields() {
        let catalog = HeroCatalog::new(vec![hero(1, "antimage", "Anti-Mage", &["Carry"])]);
        let s = suggest_hero(&catalog, Some(Position::Carry), None).unwrap();

        assert_eq!(s.hero_id, 1);
        assert_eq!(s.hero_name, "Anti-Mage");
        assert_eq!(s.image_key, "antimage");
        assert_eq!(s.position, Some(Position::Carry));
        assert!(s.last_match.is_none());
        assert!(s.switching_from.is_none());
    }

    #[test]
    fn test_verdict() {
        assert_eq!(Verdict::from_kills_deaths(2, 9), Verdict::Fed);
        assert_eq!(Verdict::from_kills_deaths(2, 8), Verdict::Average);
        assert_eq!(Verdict::from_kills_deaths(11, 3), Verdict::PoppedOff);
        assert_eq!(Verdict::from_kills_deaths(10, 3), Verdict::Average);
        assert_eq!(Verdict::from_kills_deaths(12, 12), Verdict::Average);
    }

    #[test]
    fn test_last_match_note_and_role_change() {
        let detail = sample_detail(100);
        let carry = analyze_detail(&detail, AccountId::new(1001)).unwrap();
        assert_eq!(carry.analysis.role, Role::Carry);

        let s = suggest_hero(&catalog(), Some(Position::Carry), Some(&carry)).unwrap();
        let note = s.last_match.unwrap();
        assert_eq!(note.match_id, MatchId::new(100));
        assert_eq!((note.kills, note.deaths), (12, 3));
        assert_eq!(note.verdict, Verdict::PoppedOff);
        assert_eq!(s.switching_from, None);

        let s = suggest_hero(&catalog(), Some(Position::Support), Some(&carry)).unwrap();
        assert_eq!(s.switching_from, Some(Role::Carry));

        // No position requested, nothing to switch to
        let s = suggest_hero(&catalog(), None, Some(&carry)).unwrap();
        assert_eq!(s.switching_from, None);
    }

    #[test]
    fn test_unknown_role_is_not_a_switch() {
        let detail = sample_detail(100);
        let mut result = analyze_detail(&detail, AccountId::new(1005)).unwrap();
        result.analysis.role = Role::Unknown;

        let s = suggest_hero(&catalog(), Some(Position::Mid), Some(&result)).unwrap();
        assert_eq!(s.last_match.unwrap().role, Role::Unknown);
        assert_eq!(s.switching_from, None);
    }
}
