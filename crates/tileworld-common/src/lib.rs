//! # Tileworld Common
//!
//! Common types shared by every Tileworld crate:
//! - Tile coordinates
//! - World identifiers
//! - The closed terrain vocabulary and its registry
//! - Per-tile metadata variants
//! - Error types for generation and storage

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod coords;
pub mod error;
pub mod ids;
pub mod metadata;
pub mod terrain;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::coords::*;
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::metadata::*;
    pub use crate::terrain::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_pos_index_roundtrip() {
        let pos = TilePos::new(7, 3);
        let index = pos.to_index(10);
        assert_eq!(index, 37);
        assert_eq!(TilePos::from_index(index, 10), pos);
    }

    #[test]
    fn test_world_ids_are_unique() {
        assert_ne!(WorldId::new(), WorldId::new());
    }

    #[test]
    fn test_default_registry_knows_every_kind() {
        let registry = TerrainRegistry::default();
        for kind in TerrainKind::ALL {
            assert!(registry.validate(kind).is_ok(), "{kind} missing");
        }
    }
}
