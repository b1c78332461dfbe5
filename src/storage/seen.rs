//! Dedup map snapshot: `{ "<account_id>": <match_id>, ... }`.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use tracing::{debug, warn};

use super::{StorageConfig, StorageError};
use crate::models::{AccountId, MatchId};

pub type SeenMap = BTreeMap<AccountId, MatchId>;

/// JSON file holding the last reported match per account.
#[derive(Debug, Clone)]
pub struct SeenStore {
    path: PathBuf,
}

impl SeenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn for_config(config: &StorageConfig) -> Self {
        Self::new(config.seen_path())
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Load the snapshot. A missing or unreadable file starts from an empty map.
    pub fn load(&self) -> Result<SeenMap, StorageError> {
        if !self.path.exists() {
            return Ok(SeenMap::new());
        }

        let contents = fs::read_to_string(&self.path)?;
        match serde_json::from_str(&contents) {
            Ok(map) => Ok(map),
            Err(e) => {
                warn!("Ignoring corrupt seen-match file {:?}: {}", self.path, e);
                Ok(SeenMap::new())
            }
        }
    }

    /// Replace the snapshot. Writes to a sibling temp file and renames it into place.
    pub fn save(&self, map: &SeenMap) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(map)?)?;
        fs::rename(&tmp, &self.path)?;

        debug!("Saved {} seen matches to {:?}", map.len(), self.path);
        Ok(())
    }
}
