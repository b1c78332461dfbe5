//! Tracked roster entries.

use serde::{Deserialize, Serialize};

use super::AccountId;

/// A chat user linked to an OpenDota account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedPlayer {
    /// Chat-platform user id (opaque to the watcher)
    pub user_id: String,

    /// OpenDota / Steam32 account id
    pub account_id: AccountId,

    /// Friendly name for messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl TrackedPlayer {
    pub fn new(user_id: impl Into<String>, account_id: AccountId) -> Self {
        Self {
            user_id: user_id.into(),
            account_id,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name to show in messages, falling back to the account id.
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.account_id.to_string())
    }
}

/// Insert or overwrite a roster entry keyed by `user_id`.
///
/// Re-registration replaces the linked account in place so roster order is kept.
pub fn register(roster: &mut Vec<TrackedPlayer>, player: TrackedPlayer) {
    match roster.iter_mut().find(|p| p.user_id == player.user_id) {
        Some(existing) => *existing = player,
        None => roster.push(player),
    }
}
