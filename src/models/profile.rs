//! Player profile and rank medal rendering.

use serde::{Deserialize, Serialize};

/// Subset of `GET /players/{account_id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerProfile {
    /// Tens digit is the medal, units digit the stars
    #[serde(default)]
    pub rank_tier: Option<u32>,

    #[serde(default)]
    pub leaderboard_rank: Option<u32>,

    #[serde(default)]
    pub profile: Option<SteamProfile>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SteamProfile {
    #[serde(default)]
    pub personaname: Option<String>,

    #[serde(default)]
    pub avatarfull: Option<String>,

    #[serde(default)]
    pub profileurl: Option<String>,
}

impl PlayerProfile {
    pub fn rank_name(&self) -> String {
        rank_name(self.rank_tier, self.leaderboard_rank)
    }

    pub fn persona_name(&self) -> Option<&str> {
        self.profile.as_ref()?.personaname.as_deref()
    }
}

fn medal_name(tier: u32) -> &'static str {
    match tier {
        1 => "Herald",
        2 => "Guardian",
        3 => "Crusader",
        4 => "Archon",
        5 => "Legend",
        6 => "Ancient",
        7 => "Divine",
        8 => "Immortal",
        _ => "Unknown",
    }
}

/// Render a rank tier, e.g. `Legend 3`, `Immortal`, `Immortal (Rank 412)`.
pub fn rank_name(rank_tier: Option<u32>, leaderboard_rank: Option<u32>) -> String {
    if let Some(position) = leaderboard_rank.filter(|r| *r > 0) {
        return format!("Immortal (Rank {})", position);
    }

    let rank_tier = match rank_tier {
        Some(t) if t > 0 => t,
        _ => return "Unranked".to_string(),
    };

    let tier = rank_tier / 10;
    let stars = rank_tier % 10;

    // Immortal has no stars
    if tier == 8 {
        return "Immortal".to_string();
    }

    format!("{} {}", medal_name(tier), stars)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_name_medals() {
        assert_eq!(rank_name(Some(53), None), "Legend 3");
        assert_eq!(rank_name(Some(11), None), "Herald 1");
        assert_eq!(rank_name(Some(75), None), "Divine 5");
    }

    #[test]
    fn test_rank_name_immortal() {
        assert_eq!(rank_name(Some(80), None), "Immortal");
        assert_eq!(rank_name(Some(80), Some(412)), "Immortal (Rank 412)");
    }

    #[test]
    fn test_rank_name_unranked() {
        assert_eq!(rank_name(None, None), "Unranked");
        assert_eq!(rank_name(Some(0), None), "Unranked");
        assert_eq!(rank_name(Some(93), None), "Unknown 3");
    }

    #[test]
    fn test_profile_deserialize() {
        let json = r#"{
            "rank_tier": 62,
            "leaderboard_rank": null,
            "profile": {"personaname": "feeder", "avatarfull": null}
        }"#;
        let profile: PlayerProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.rank_name(), "Ancient 2");
        assert_eq!(profile.persona_name(), Some("feeder"));
    }
}
