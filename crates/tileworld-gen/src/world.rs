//! Generated worlds and their features.

use std::collections::{BTreeSet, HashMap};

use tileworld_common::{GenResult, TerrainKind, TerrainRegistry, TileMetadata, TilePos, WorldId};
use tileworld_store::TileRecord;

use crate::grid::TerrainGrid;

/// A point-located overlay element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    /// Where the feature sits
    pub pos: TilePos,
    /// Terrain shown at `pos`
    pub kind: TerrainKind,
    /// Portal destination, structure descriptor, or nothing
    pub meta: TileMetadata,
}

impl Feature {
    /// A feature without metadata.
    #[must_use]
    pub const fn new(pos: TilePos, kind: TerrainKind) -> Self {
        Self {
            pos,
            kind,
            meta: TileMetadata::None,
        }
    }

    /// A feature with metadata.
    #[must_use]
    pub const fn with_meta(pos: TilePos, kind: TerrainKind, meta: TileMetadata) -> Self {
        Self { pos, kind, meta }
    }
}

/// A complete map: frozen terrain plus its features.
#[derive(Debug, Clone)]
pub struct World {
    id: WorldId,
    name: String,
    /// Terrain before feature placement.
    base: TerrainGrid,
    /// Terrain with features applied.
    terrain: TerrainGrid,
    features: Vec<Feature>,
}

impl World {
    /// Assembles a world. `base` and `terrain` must have the same shape.
    #[must_use]
    pub fn new(
        id: WorldId,
        name: impl Into<String>,
        base: TerrainGrid,
        terrain: TerrainGrid,
        features: Vec<Feature>,
    ) -> Self {
        debug_assert!(base.same_shape(&terrain));
        Self {
            id,
            name: name.into(),
            base,
            terrain,
            features,
        }
    }

    /// Store-assigned id.
    #[must_use]
    pub const fn id(&self) -> WorldId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Width in tiles.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.terrain.width()
    }

    /// Height in tiles.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.terrain.height()
    }

    /// Terrain with features applied.
    #[must_use]
    pub const fn terrain(&self) -> &TerrainGrid {
        &self.terrain
    }

    /// Terrain before feature placement.
    #[must_use]
    pub const fn base(&self) -> &TerrainGrid {
        &self.base
    }

    /// All features.
    #[must_use]
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Feature at `pos`, if any.
    #[must_use]
    pub fn feature_at(&self, pos: TilePos) -> Option<&Feature> {
        self.features.iter().find(|f| f.pos == pos)
    }

    /// Features of one kind.
    pub fn features_of(&self, kind: TerrainKind) -> impl Iterator<Item = &Feature> + '_ {
        self.features.iter().filter(move |f| f.kind == kind)
    }

    /// Replaces the metadata at `pos`.
    ///
    /// Updates the existing feature there, or adds one showing the tile's
    /// current terrain. Returns `false` if `pos` is outside the world.
    pub fn set_metadata(&mut self, pos: TilePos, meta: TileMetadata) -> bool {
        let Some(&kind) = self.terrain.get(pos) else {
            return false;
        };
        match self.features.iter_mut().find(|f| f.pos == pos) {
            Some(feature) => feature.meta = meta,
            None => self.features.push(Feature::with_meta(pos, kind, meta)),
        }
        true
    }

    /// Every terrain kind this world would emit.
    #[must_use]
    pub fn terrain_kinds(&self) -> BTreeSet<TerrainKind> {
        let mut kinds = self.terrain.kinds();
        kinds.extend(self.base.kinds());
        kinds
    }

    /// Checks every emitted label against the store's registry.
    pub fn validate_labels(&self, registry: &TerrainRegistry) -> GenResult<()> {
        registry.validate_all(self.terrain_kinds())
    }

    /// Tile records in row-major order.
    #[must_use]
    pub fn tile_records(&self) -> Vec<TileRecord> {
        let meta: HashMap<TilePos, &TileMetadata> =
            self.features.iter().map(|f| (f.pos, &f.meta)).collect();
        self.terrain
            .positions()
            .map(|pos| TileRecord {
                x: pos.x,
                y: pos.y,
                terrain_type: self.terrain[pos],
                original_terrain_type: self.base[pos],
                metadata: meta.get(&pos).map(|m| (*m).clone()).unwrap_or_default(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use tileworld_common::PortalDestination;

    fn small_world() -> World {
        let base = Grid::new(3, 2, TerrainKind::Plain).expect("valid dims");
        let mut terrain = base.clone();
        terrain.set(TilePos::new(1, 1), TerrainKind::House);
        World::new(
            WorldId::new(),
            "small",
            base,
            terrain,
            vec![Feature::new(TilePos::new(1, 1), TerrainKind::House)],
        )
    }

    #[test]
    fn test_tile_records_keep_original_terrain() {
        let world = small_world();
        let tiles = world.tile_records();
        assert_eq!(tiles.len(), 6);

        let house = &tiles[TilePos::new(1, 1).to_index(3)];
        assert_eq!(house.terrain_type, TerrainKind::House);
        assert_eq!(house.original_terrain_type, TerrainKind::Plain);
        assert!(tiles.iter().all(|t| t.metadata.is_none()));
    }

    #[test]
    fn test_set_metadata_overwrites() {
        let mut world = small_world();
        let pos = TilePos::new(1, 1);
        let first = PortalDestination::new(WorldId::new(), TilePos::new(0, 0));
        let second = PortalDestination::new(WorldId::new(), TilePos::new(2, 2));

        assert!(world.set_metadata(pos, TileMetadata::Portal(first)));
        assert!(world.set_metadata(pos, TileMetadata::Portal(second)));

        assert_eq!(world.features().len(), 1);
        assert_eq!(world.feature_at(pos).and_then(|f| f.meta.portal()), Some(&second));
    }

    #[test]
    fn test_set_metadata_adds_feature_for_plain_tile() {
        let mut world = small_world();
        assert!(world.set_metadata(TilePos::new(0, 0), TileMetadata::None));
        assert_eq!(world.features().len(), 2);
        assert_eq!(world.feature_at(TilePos::new(0, 0)).map(|f| f.kind), Some(TerrainKind::Plain));
        assert!(!world.set_metadata(TilePos::new(5, 5), TileMetadata::None));
    }

    #[test]
    fn test_validate_labels() {
        let world = small_world();
        assert!(world.validate_labels(&TerrainRegistry::default()).is_ok());

        let mut map = TerrainRegistry::default().as_map().clone();
        map.remove("HOUSE");
        assert!(world.validate_labels(&TerrainRegistry::from_map(map)).is_err());
    }
}
