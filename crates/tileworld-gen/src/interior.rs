//! Interior maps spawned by houses.
//!
//! An interior is a floor-filled room with a single door centered on the
//! bottom row. Storage chests are scattered along the left, right and top
//! walls; the door row never receives one.

use fastrand::Rng;
use tileworld_common::{
    GenError, GenResult, StorageDescriptor, TerrainKind, TerrainRegistry, TileMetadata, TilePos,
    WorldId,
};
use tracing::debug;

use crate::features::{scatter_at, STORAGE_PROBABILITY};
use crate::grid::Grid;
use crate::world::{Feature, World};

/// Default interior width.
pub const DEFAULT_INTERIOR_WIDTH: u32 = 8;

/// Default interior height.
pub const DEFAULT_INTERIOR_HEIGHT: u32 = 6;

/// Builds interior worlds of a fixed size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteriorBuilder {
    width: u32,
    height: u32,
    storage_probability: f64,
}

impl InteriorBuilder {
    /// Creates a builder for `width` x `height` interiors.
    pub fn new(width: u32, height: u32) -> GenResult<Self> {
        if width == 0 || height == 0 {
            return Err(GenError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            storage_probability: STORAGE_PROBABILITY,
        })
    }

    /// Overrides the per-cell storage chest chance.
    #[must_use]
    pub const fn with_storage_probability(mut self, probability: f64) -> Self {
        self.storage_probability = probability;
        self
    }

    /// Interior width.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Interior height.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Door position: centered on the bottom row.
    #[must_use]
    pub const fn door_position(&self) -> TilePos {
        TilePos::new(self.width / 2, self.height - 1)
    }

    /// Wall cells eligible for storage, in scatter order: left column,
    /// right column, then top row. The door row is excluded throughout.
    #[must_use]
    pub fn storage_cells(&self) -> Vec<TilePos> {
        let door_row = self.door_position().y;
        let left = (0..self.height).map(|y| TilePos::new(0, y));
        let right = (0..self.height).map(|y| TilePos::new(self.width - 1, y));
        let top = (0..self.width).map(|x| TilePos::new(x, 0));
        left.chain(right).chain(top).filter(|p| p.y != door_row).collect()
    }

    /// Builds the interior for world `id`.
    ///
    /// Every emitted label is checked against `registry`; an unknown label
    /// fails the build. The caller owns any store record already created for
    /// `id` and must delete it on failure.
    pub fn build(
        &self,
        id: WorldId,
        name: &str,
        registry: &TerrainRegistry,
        rng: &mut Rng,
    ) -> GenResult<(World, TilePos)> {
        let door = self.door_position();

        let mut base = Grid::new(self.width, self.height, TerrainKind::Floor)?;
        base.set(door, TerrainKind::Door);

        let mut terrain = base.clone();
        let chests = scatter_at(
            &mut terrain,
            self.storage_cells(),
            TerrainKind::StorageChest,
            &[TerrainKind::Floor],
            self.storage_probability,
            rng,
        );

        let mut features = Vec::with_capacity(chests.len() + 1);
        features.push(Feature::new(door, TerrainKind::Door));
        features.extend(chests.iter().map(|&pos| {
            Feature::with_meta(
                pos,
                TerrainKind::StorageChest,
                TileMetadata::Storage(StorageDescriptor::public()),
            )
        }));

        let world = World::new(id, name, base, terrain, features);
        world.validate_labels(registry)?;

        debug!(world = %id, chests = chests.len(), %door, "Built interior");
        Ok((world, door))
    }
}

impl Default for InteriorBuilder {
    fn default() -> Self {
        Self {
            width: DEFAULT_INTERIOR_WIDTH,
            height: DEFAULT_INTERIOR_HEIGHT,
            storage_probability: STORAGE_PROBABILITY,
        }
    }
}
