//! Static JSON resources consumed at environment setup.
//!
//! Three read-only files describe what the engine can instantiate: the
//! place library (room models and their components), the casting list
//! (character bodies and outfits), and the item library. Place names may
//! carry pipe-separated aliases, matched case-insensitively.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

use stagehand_core::error::{Result, StagehandError};

fn pipe_matches(field: &str, wanted: &str) -> bool {
    field
        .split('|')
        .any(|alt| alt.trim().eq_ignore_ascii_case(wanted))
}

// ---------------------------------------------------------------------------
// Places
// ---------------------------------------------------------------------------

/// One room component of a place model (door, table, shelf, …).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomComponent {
    /// Component name; the world entity becomes `<room>.<name>`.
    pub name: String,
    /// Attribute tags: `Open`, `Close`, `Surface`, `Furniture`, `Seat`,
    /// `EntryPoint`. Empty strings are allowed and ignored.
    #[serde(default)]
    pub attribute: Vec<String>,
}

/// One place model the engine can build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceSpec {
    /// Model name, possibly `a|b` aliases.
    pub name: String,
    /// Components present in every instance of this place.
    #[serde(default)]
    pub room_components: Vec<RoomComponent>,
}

/// The place library.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceList(pub Vec<PlaceSpec>);

impl PlaceList {
    /// Parse from the JSON resource text.
    ///
    /// # Errors
    /// JSON errors.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file.
    ///
    /// # Errors
    /// I/O and JSON errors.
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Find a place by name, alias-aware and case-insensitive.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&PlaceSpec> {
        self.0.iter().find(|p| pipe_matches(&p.name, name))
    }
}

// ---------------------------------------------------------------------------
// Casting
// ---------------------------------------------------------------------------

/// A character body model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyType {
    /// Engine body name.
    pub name: String,
}

/// Which bodies an outfit fits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Compatibility {
    /// `"all"`, or a single body name.
    Keyword(String),
    /// An explicit list of body names.
    Bodies(Vec<String>),
}

impl Compatibility {
    /// Whether the outfit fits the given body.
    #[must_use]
    pub fn allows(&self, body: &str) -> bool {
        match self {
            Self::Keyword(k) => k == "all" || k == body,
            Self::Bodies(bodies) => bodies.iter().any(|b| b == body),
        }
    }
}

/// An outfit model with its body compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outfit {
    /// Engine outfit name.
    pub name: String,
    /// Compatibility constraint.
    #[serde(rename = "Compatibility")]
    pub compatibility: Compatibility,
}

/// The casting list: bodies plus outfits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CastingList {
    /// Available bodies.
    #[serde(default)]
    pub body_type: Vec<BodyType>,
    /// Available outfits.
    #[serde(default)]
    pub outfit: Vec<Outfit>,
}

impl CastingList {
    /// Parse from the JSON resource text.
    ///
    /// # Errors
    /// JSON errors.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file.
    ///
    /// # Errors
    /// I/O and JSON errors.
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Draw a random body and a compatible outfit.
    ///
    /// # Errors
    /// [`StagehandError::Resource`] when the list has no bodies or no
    /// outfit fits the drawn body.
    pub fn cast(&self, rng: &mut impl Rng) -> Result<(String, String)> {
        let body = self
            .body_type
            .choose(rng)
            .ok_or_else(|| StagehandError::Resource("casting list has no bodies".to_string()))?;
        let fitting: Vec<&Outfit> = self
            .outfit
            .iter()
            .filter(|o| o.compatibility.allows(&body.name))
            .collect();
        let outfit = fitting.choose(rng).ok_or_else(|| {
            StagehandError::Resource(format!("no outfit compatible with body {:?}", body.name))
        })?;
        Ok((body.name.clone(), outfit.name.clone()))
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// The item library.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemList {
    /// Engine item model names.
    #[serde(default)]
    pub items: Vec<String>,
}

impl ItemList {
    /// Parse from the JSON resource text.
    ///
    /// # Errors
    /// JSON errors.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file.
    ///
    /// # Errors
    /// I/O and JSON errors.
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Resolve an entity name to its engine model, case-insensitively.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|i| i.eq_ignore_ascii_case(name))
            .map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
