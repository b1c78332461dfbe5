//! Hero metadata from `GET /heroes`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Fallback name for ids missing from the catalog.
pub const UNKNOWN_HERO: &str = "Unknown Hero";

/// One hero as listed by OpenDota.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroInfo {
    pub id: u32,

    /// Internal name, e.g. `npc_dota_hero_antimage`
    pub name: String,

    /// Display name, e.g. `Anti-Mage`
    pub localized_name: String,

    #[serde(default)]
    pub roles: Vec<String>,
}

impl HeroInfo {
    /// Image key used by the hero portrait CDN (`antimage`).
    pub fn image_key(&self) -> &str {
        self.name
            .strip_prefix("npc_dota_hero_")
            .unwrap_or(&self.name)
    }
}

/// Id-indexed hero lookup.
#[derive(Debug, Clone, Default)]
pub struct HeroCatalog {
    by_id: HashMap<u32, HeroInfo>,
}

impl HeroCatalog {
    pub fn new(heroes: Vec<HeroInfo>) -> Self {
        Self {
            by_id: heroes.into_iter().map(|h| (h.id, h)).collect(),
        }
    }

    pub fn get(&self, hero_id: u32) -> Option<&HeroInfo> {
        self.by_id.get(&hero_id)
    }

    pub fn name(&self, hero_id: u32) -> &str {
        self.get(hero_id)
            .map(|h| h.localized_name.as_str())
            .unwrap_or(UNKNOWN_HERO)
    }

    /// Ids of heroes tagged with any of `roles`, ascending. An empty filter matches every hero.
    pub fn ids_with_any_role(&self, roles: &[&str]) -> Vec<u32> {
        let mut ids: Vec<u32> = self
            .by_id
            .values()
            .filter(|h| roles.is_empty() || h.roles.iter().any(|r| roles.contains(&r.as_str())))
            .map(|h| h.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
