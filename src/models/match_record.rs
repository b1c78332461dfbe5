//! Raw match data as returned by OpenDota.

use serde::{Deserialize, Deserializer, Serialize};

use super::{AccountId, MatchId};

/// Player slots below this value belong to Radiant, the rest to Dire.
pub const DIRE_SLOT_START: u8 = 128;

/// The two sides of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamSide {
    Radiant,
    Dire,
}

impl TeamSide {
    pub fn from_slot(player_slot: u8) -> Self {
        if player_slot < DIRE_SLOT_START {
            TeamSide::Radiant
        } else {
            TeamSide::Dire
        }
    }

    pub fn opponent(&self) -> Self {
        match self {
            TeamSide::Radiant => TeamSide::Dire,
            TeamSide::Dire => TeamSide::Radiant,
        }
    }
}

/// One participant's statistics for a single match.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerMatchRecord {
    /// Missing for anonymous profiles
    #[serde(default)]
    pub account_id: Option<AccountId>,

    #[serde(default, deserialize_with = "default_if_null")]
    pub player_slot: u8,

    #[serde(default, deserialize_with = "default_if_null")]
    pub hero_id: u32,

    #[serde(default, deserialize_with = "default_if_null")]
    pub kills: u32,

    #[serde(default, deserialize_with = "default_if_null")]
    pub deaths: u32,

    #[serde(default, deserialize_with = "default_if_null")]
    pub assists: u32,

    #[serde(default, deserialize_with = "default_if_null")]
    pub gold_per_min: u32,

    #[serde(default, deserialize_with = "default_if_null")]
    pub xp_per_min: u32,

    #[serde(default, deserialize_with = "default_if_null")]
    pub last_hits: u32,

    #[serde(default, deserialize_with = "default_if_null")]
    pub denies: u32,

    #[serde(default, deserialize_with = "default_if_null")]
    pub hero_damage: u32,

    #[serde(default, deserialize_with = "default_if_null")]
    pub tower_damage: u32,
}

impl PlayerMatchRecord {
    pub fn side(&self) -> TeamSide {
        TeamSide::from_slot(self.player_slot)
    }

    /// Whether this player's side is the recorded winner.
    pub fn won(&self, radiant_win: bool) -> bool {
        (self.side() == TeamSide::Radiant) == radiant_win
    }

    pub fn is_account(&self, account_id: AccountId) -> bool {
        self.account_id == Some(account_id)
    }
}

/// OpenDota sends `null` for fields it did not record (old or abandoned matches).
fn default_if_null<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Entry of `players/{account_id}/recentMatches`. Only the id is needed.
#[derive(Debug, Clone, Deserialize)]
pub struct RecentMatch {
    pub match_id: MatchId,
}

/// `matches/{match_id}` payload reduced to what the analysis uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDetail {
    pub match_id: MatchId,

    /// `false` when the result was not recorded
    #[serde(default, deserialize_with = "default_if_null")]
    pub radiant_win: bool,

    #[serde(default)]
    pub players: Vec<PlayerMatchRecord>,
}

impl MatchDetail {
    pub fn find_player(&self, account_id: AccountId) -> Option<&PlayerMatchRecord> {
        self.players.iter().find(|p| p.is_account(account_id))
    }

    /// Participants on one side, in API order.
    pub fn team(&self, side: TeamSide) -> Vec<PlayerMatchRecord> {
        self.players
            .iter()
            .filter(|p| p.side() == side)
            .cloned()
            .collect()
    }
}
