//! Scene analysis over free-text prompts.
//!
//! Derives a setting tag and a character roster (with outfit) from prompt
//! text. All checks are substring tests on a lower-cased copy of the
//! prompt, evaluated in a fixed priority order. Keywords overlap (a VIP
//! prompt usually mentions the hospital too), so the order of the checks
//! is what makes the output reproducible.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Keywords
// ---------------------------------------------------------------------------

const VIP_KEYWORDS: &[&str] = &["vip"];
const HOSPITAL_KEYWORDS: &[&str] = &["hospital", "rumah sakit"];
const LIVING_ROOM_KEYWORDS: &[&str] = &["living", "ruang tamu"];
const BEDROOM_KEYWORDS: &[&str] = &["bedroom", "kamar tidur"];

const PATIENT_KEYWORDS: &[&str] = &["patient", "pasien"];
const FORMAL_KEYWORDS: &[&str] = &["formal"];
const CASUAL_KEYWORDS: &[&str] = &["casual"];
const SANTAI_KEYWORDS: &[&str] = &["santai"];

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

// ---------------------------------------------------------------------------
// Setting
// ---------------------------------------------------------------------------

/// Location a scene takes place in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Setting {
    #[serde(rename = "hospital_vip")]
    HospitalVip,
    #[serde(rename = "hospital")]
    Hospital,
    #[serde(rename = "apartment_living")]
    ApartmentLiving,
    #[serde(rename = "apartment_bedroom")]
    ApartmentBedroom,
    #[serde(rename = "generic")]
    Generic,
}

impl Setting {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HospitalVip => "hospital_vip",
            Self::Hospital => "hospital",
            Self::ApartmentLiving => "apartment_living",
            Self::ApartmentBedroom => "apartment_bedroom",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detect the setting of a prompt.
///
/// Priority: VIP hospital, hospital, living room, bedroom, generic.
pub fn detect_setting(text: &str) -> Setting {
    let lower = text.to_lowercase();

    if contains_any(&lower, VIP_KEYWORDS) {
        Setting::HospitalVip
    } else if contains_any(&lower, HOSPITAL_KEYWORDS) {
        Setting::Hospital
    } else if contains_any(&lower, LIVING_ROOM_KEYWORDS) {
        Setting::ApartmentLiving
    } else if contains_any(&lower, BEDROOM_KEYWORDS) {
        Setting::ApartmentBedroom
    } else {
        Setting::Generic
    }
}

// ---------------------------------------------------------------------------
// Characters and outfits
// ---------------------------------------------------------------------------

/// The fixed cast. Declaration order is the roster order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CharacterName {
    #[serde(rename = "MC")]
    Mc,
    Raka,
    Alina,
    Aruna,
}

impl CharacterName {
    /// Roster order.
    pub const ALL: [CharacterName; 4] = [Self::Mc, Self::Raka, Self::Alina, Self::Aruna];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mc => "MC",
            Self::Raka => "Raka",
            Self::Alina => "Alina",
            Self::Aruna => "Aruna",
        }
    }

    /// Lower-case substring searched for in prompt text.
    fn keyword(&self) -> &'static str {
        match self {
            Self::Mc => "mc",
            Self::Raka => "raka",
            Self::Alina => "alina",
            Self::Aruna => "aruna",
        }
    }

    /// Whether the outfit of this character is read from the prompt.
    /// Aruna always appears in her default outfit.
    fn detects_outfit(&self) -> bool {
        !matches!(self, Self::Aruna)
    }
}

impl fmt::Display for CharacterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CharacterName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Unknown character '{s}'. Must be one of: MC, Raka, Alina, Aruna"
                ))
            })
    }
}

/// Wardrobe variants the generation backend knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outfit {
    #[default]
    Default,
    Patient,
    Casual,
    Formal,
    Santai,
}

impl Outfit {
    pub const ALL: [Outfit; 5] = [
        Self::Default,
        Self::Patient,
        Self::Casual,
        Self::Formal,
        Self::Santai,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Patient => "patient",
            Self::Casual => "casual",
            Self::Formal => "formal",
            Self::Santai => "santai",
        }
    }
}

impl fmt::Display for Outfit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outfit {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|o| o.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid outfit '{s}'. Must be one of: default, patient, casual, formal, santai"
                ))
            })
    }
}

/// A character appearing in a scene, with the outfit they wear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRef {
    pub name: CharacterName,
    pub outfit: Outfit,
}

/// Detect the outfit worn in a scene.
///
/// Priority: patient wording, formal, casual, santai, default.
pub fn detect_outfit(text: &str) -> Outfit {
    outfit_from_lower(&text.to_lowercase())
}

fn outfit_from_lower(lower: &str) -> Outfit {
    if contains_any(lower, PATIENT_KEYWORDS) {
        Outfit::Patient
    } else if contains_any(lower, FORMAL_KEYWORDS) {
        Outfit::Formal
    } else if contains_any(lower, CASUAL_KEYWORDS) {
        Outfit::Casual
    } else if contains_any(lower, SANTAI_KEYWORDS) {
        Outfit::Santai
    } else {
        Outfit::Default
    }
}

/// Detect which characters appear in a prompt.
///
/// The result is always in roster order (MC, Raka, Alina, Aruna), never in
/// order of appearance, and contains each character at most once.
pub fn detect_characters(text: &str) -> Vec<CharacterRef> {
    let lower = text.to_lowercase();
    let outfit = outfit_from_lower(&lower);

    CharacterName::ALL
        .into_iter()
        .filter(|name| lower.contains(name.keyword()))
        .map(|name| CharacterRef {
            name,
            outfit: if name.detects_outfit() {
                outfit
            } else {
                Outfit::Default
            },
        })
        .collect()
}
