//! Records exchanged with a World Store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tileworld_common::{PortalDestination, TerrainKind, TileMetadata, TilePos, WorldId};

/// Parameters for a new server record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSpec {
    /// Display name
    pub name: String,
    /// Player cap
    pub max_players: u32,
    /// Map width in tiles
    pub width: u32,
    /// Map height in tiles
    pub height: u32,
}

/// Lifecycle state of a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    /// Accepting players
    Active,
}

/// A persisted server (one world).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerRecord {
    /// Store-assigned id
    pub id: WorldId,
    /// Display name
    pub name: String,
    /// Lifecycle state
    pub status: ServerStatus,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last activity time
    pub last_active: DateTime<Utc>,
    /// Player cap
    pub max_players: u32,
    /// Map width in tiles
    pub width: u32,
    /// Map height in tiles
    pub height: u32,
}

impl ServerRecord {
    /// Creates an active record for `spec`, stamped now.
    #[must_use]
    pub fn new(id: WorldId, spec: &ServerSpec) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: spec.name.clone(),
            status: ServerStatus::Active,
            created_at: now,
            last_active: now,
            max_players: spec.max_players,
            width: spec.width,
            height: spec.height,
        }
    }
}

/// One persisted tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRecord {
    /// Column
    pub x: u32,
    /// Row
    pub y: u32,
    /// Current terrain
    pub terrain_type: TerrainKind,
    /// Terrain before any feature was placed
    pub original_terrain_type: TerrainKind,
    /// Feature metadata
    #[serde(default, skip_serializing_if = "TileMetadata::is_none")]
    pub metadata: TileMetadata,
}

impl TileRecord {
    /// Position of this tile.
    #[must_use]
    pub const fn pos(&self) -> TilePos {
        TilePos::new(self.x, self.y)
    }
}

/// Request to point a tile in one world at a tile in another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalRequest {
    /// World holding the portal tile
    pub server_id: WorldId,
    /// Portal column
    pub x: u32,
    /// Portal row
    pub y: u32,
    /// Destination world
    pub dest_server_id: WorldId,
    /// Destination column
    pub dest_x: u32,
    /// Destination row
    pub dest_y: u32,
}

impl PortalRequest {
    /// Builds a request from a source position and a destination.
    #[must_use]
    pub const fn new(server_id: WorldId, pos: TilePos, dest: PortalDestination) -> Self {
        Self {
            server_id,
            x: pos.x,
            y: pos.y,
            dest_server_id: dest.world_id,
            dest_x: dest.x,
            dest_y: dest.y,
        }
    }

    /// Destination of this request.
    #[must_use]
    pub const fn destination(&self) -> PortalDestination {
        PortalDestination {
            world_id: self.dest_server_id,
            x: self.dest_x,
            y: self.dest_y,
        }
    }
}

/// Store reply to a portal configuration request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalAck {
    /// Whether the portal was configured
    pub success: bool,
    /// Human-readable detail
    pub message: String,
}

impl PortalAck {
    /// A successful reply.
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// A failed reply.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
