//! Session-wide reviewer outfit overrides.
//!
//! Keyed by character name, not by item: choosing "formal" for Raka applies
//! to every later regeneration that includes Raka until it is cleared.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::scene::{CharacterName, CharacterRef, Outfit};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutfitOverrides {
    entries: BTreeMap<CharacterName, Outfit>,
}

impl OutfitOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the outfit for a character, returning the previous override.
    pub fn set(&mut self, name: CharacterName, outfit: Outfit) -> Option<Outfit> {
        self.entries.insert(name, outfit)
    }

    /// Drop the override so the detected outfit is used again.
    pub fn clear(&mut self, name: CharacterName) -> Option<Outfit> {
        self.entries.remove(&name)
    }

    pub fn get(&self, name: CharacterName) -> Option<Outfit> {
        self.entries.get(&name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CharacterName, Outfit)> + '_ {
        self.entries.iter().map(|(n, o)| (*n, *o))
    }

    /// Layer the overrides on top of a detected roster. Roster order and
    /// membership are unchanged; only outfits are replaced.
    pub fn resolve(&self, detected: &[CharacterRef]) -> Vec<CharacterRef> {
        detected
            .iter()
            .map(|c| CharacterRef {
                name: c.name,
                outfit: self.get(c.name).unwrap_or(c.outfit),
            })
            .collect()
    }
}
