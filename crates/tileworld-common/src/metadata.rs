//! Per-tile metadata.
//!
//! One variant per feature kind. The same type is held in memory on a
//! feature and written to the store on its tile record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::coords::TilePos;
use crate::ids::WorldId;

/// Where a portal tile leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortalDestination {
    /// Destination world
    pub world_id: WorldId,
    /// Destination column
    pub x: u32,
    /// Destination row
    pub y: u32,
}

impl PortalDestination {
    /// Creates a destination from a world and a tile position.
    #[must_use]
    pub const fn new(world_id: WorldId, pos: TilePos) -> Self {
        Self {
            world_id,
            x: pos.x,
            y: pos.y,
        }
    }

    /// Destination tile position.
    #[must_use]
    pub const fn pos(&self) -> TilePos {
        TilePos::new(self.x, self.y)
    }
}

/// Descriptor of a placed structure such as a storage chest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageDescriptor {
    /// Unique structure id
    pub structure_id: Uuid,
    /// When the structure was built
    pub built_at: DateTime<Utc>,
    /// Owning player; `None` for public structures
    pub owner: Option<String>,
}

impl StorageDescriptor {
    /// A public (unowned) structure built now.
    #[must_use]
    pub fn public() -> Self {
        Self {
            structure_id: Uuid::new_v4(),
            built_at: Utc::now(),
            owner: None,
        }
    }
}

/// Metadata attached to a tile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TileMetadata {
    /// No metadata
    #[default]
    None,
    /// Portal to another world
    Portal(PortalDestination),
    /// Storage structure
    Storage(StorageDescriptor),
}

impl TileMetadata {
    /// Whether this is [`TileMetadata::None`].
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Portal destination, if this is a portal.
    #[must_use]
    pub const fn portal(&self) -> Option<&PortalDestination> {
        match self {
            Self::Portal(dest) => Some(dest),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portal_metadata_json_shape() {
        let id = WorldId::new();
        let meta = TileMetadata::Portal(PortalDestination::new(id, TilePos::new(4, 5)));
        let json = serde_json::to_value(&meta).expect("serialize failed");

        assert_eq!(json["kind"], "portal");
        assert_eq!(json["x"], 4);
        assert_eq!(json["y"], 5);
        assert_eq!(json["world_id"], id.to_string());
    }

    #[test]
    fn test_public_storage_has_no_owner() {
        let desc = StorageDescriptor::public();
        assert!(desc.owner.is_none());
        assert_ne!(desc.structure_id, StorageDescriptor::public().structure_id);
    }

    #[test]
    fn test_portal_accessor() {
        assert!(TileMetadata::None.portal().is_none());
        assert!(TileMetadata::Storage(StorageDescriptor::public()).portal().is_none());
    }
}
