//! Terrain vocabulary.
//!
//! Every tile carries exactly one [`TerrainKind`]. The store keeps its own
//! table of known terrain labels and display glyphs; [`TerrainRegistry`] is
//! the in-memory copy of that table and is consulted before any tile is
//! emitted.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{GenError, GenResult};

/// Discrete terrain category of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TerrainKind {
    /// Low elevation water.
    Ocean,
    /// High elevation rock.
    Mountain,
    /// Medium-high elevation with high moisture.
    Forest,
    /// Everything else on the exterior map.
    Plain,
    /// A house; entrance to an interior world.
    House,
    /// Interior floor.
    Floor,
    /// Interior door; exit back to the exterior.
    Door,
    /// Storage chest inside an interior.
    StorageChest,
}

impl TerrainKind {
    /// All terrain kinds in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Ocean,
        Self::Mountain,
        Self::Forest,
        Self::Plain,
        Self::House,
        Self::Floor,
        Self::Door,
        Self::StorageChest,
    ];

    /// Label used by the store.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ocean => "OCEAN",
            Self::Mountain => "MOUNTAIN",
            Self::Forest => "FOREST",
            Self::Plain => "PLAIN",
            Self::House => "HOUSE",
            Self::Floor => "FLOOR",
            Self::Door => "DOOR",
            Self::StorageChest => "STORAGE_CHEST",
        }
    }

    /// Parses a store label.
    pub fn from_label(label: &str) -> GenResult<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.label() == label)
            .ok_or_else(|| GenError::UnknownTerrainLabel(label.to_string()))
    }

    /// Glyph shown for this kind when the store has not provided one.
    #[must_use]
    pub const fn default_glyph(self) -> &'static str {
        match self {
            Self::Ocean => "🌊",
            Self::Mountain => "⛰",
            Self::Forest => "🌳",
            Self::Plain => "🌱",
            Self::House => "🏠",
            Self::Floor => "⬜",
            Self::Door => "🚪",
            Self::StorageChest => "📦",
        }
    }
}

impl fmt::Display for TerrainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TerrainKind {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s)
    }
}

/// Known terrain labels and their display glyphs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TerrainRegistry {
    glyphs: BTreeMap<String, String>,
}

impl TerrainRegistry {
    /// Builds a registry from a label → glyph table.
    #[must_use]
    pub fn from_map(glyphs: BTreeMap<String, String>) -> Self {
        Self { glyphs }
    }

    /// Returns the label → glyph table.
    #[must_use]
    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.glyphs
    }

    /// Number of registered labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Fails with `UnknownTerrainLabel` if `kind` is not registered.
    pub fn validate(&self, kind: TerrainKind) -> GenResult<()> {
        if self.glyphs.contains_key(kind.label()) {
            Ok(())
        } else {
            Err(GenError::UnknownTerrainLabel(kind.label().to_string()))
        }
    }

    /// Validates every kind yielded by `kinds`.
    pub fn validate_all(&self, kinds: impl IntoIterator<Item = TerrainKind>) -> GenResult<()> {
        kinds.into_iter().try_for_each(|kind| self.validate(kind))
    }
}

impl Default for TerrainRegistry {
    fn default() -> Self {
        Self::from_map(
            TerrainKind::ALL
                .into_iter()
                .map(|k| (k.label().to_string(), k.default_glyph().to_string()))
                .collect(),
        )
    }
}
