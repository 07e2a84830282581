//! Whole-world composition.
//!
//! [`WorldComposer`] runs the full pipeline for one exterior world and every
//! interior its houses spawn, persisting each through a [`WorldStore`].
//! Terrain is synthesized before the store is touched. Once the first server
//! record exists, any failure deletes every world created during the
//! attempt. The one exception is the return direction of a portal: a store
//! that refuses it produces a [`PortalWarning`] and the composition still
//! succeeds.

use std::collections::VecDeque;

use fastrand::Rng;
use serde::Serialize;
use thiserror::Error;
use tileworld_common::{GenError, GenResult, StoreError, TerrainKind, TerrainRegistry, TilePos, WorldId};
use tileworld_store::{insert_tiles_batched, load_registry, ServerSpec, WorldStore, DEFAULT_BATCH_SIZE};
use tracing::{debug, info, warn};

use crate::automaton::{smooth_cancellable, DEFAULT_ITERATIONS};
use crate::biome::classify_fields;
use crate::cancel::CancelToken;
use crate::features::{scatter, HOUSE_PROBABILITY, STORAGE_PROBABILITY};
use crate::grid::{ScalarField, TerrainGrid};
use crate::interior::{InteriorBuilder, DEFAULT_INTERIOR_HEIGHT, DEFAULT_INTERIOR_WIDTH};
use crate::noise::{NoiseFieldGenerator, DEFAULT_OCTAVES};
use crate::portal::{PendingLink, PortalLinker, PortalWarning};
use crate::world::{Feature, World};

/// Default exterior width and height.
pub const DEFAULT_MAP_SIZE: u32 = 120;

/// Largest accepted exterior width or height.
pub const MAX_MAP_SIZE: u32 = 4096;

/// Composition parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposeConfig {
    /// Exterior width
    pub width: u32,
    /// Exterior height
    pub height: u32,
    /// Noise octaves for elevation and moisture
    pub octaves: u32,
    /// Automaton iterations
    pub smoothing_iterations: u32,
    /// House chance per plain cell
    pub house_probability: f64,
    /// Storage chest chance per interior wall cell
    pub storage_probability: f64,
    /// Interior width
    pub interior_width: u32,
    /// Interior height
    pub interior_height: u32,
    /// Player cap of the exterior server
    pub max_players: u32,
    /// Player cap of each interior server
    pub interior_max_players: u32,
    /// Tile records per insert call
    pub batch_size: usize,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_MAP_SIZE,
            height: DEFAULT_MAP_SIZE,
            octaves: DEFAULT_OCTAVES,
            smoothing_iterations: DEFAULT_ITERATIONS,
            house_probability: HOUSE_PROBABILITY,
            storage_probability: STORAGE_PROBABILITY,
            interior_width: DEFAULT_INTERIOR_WIDTH,
            interior_height: DEFAULT_INTERIOR_HEIGHT,
            max_players: 100,
            interior_max_players: 10,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// One built interior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteriorSummary {
    /// Interior world id
    pub world_id: WorldId,
    /// Interior name
    pub name: String,
    /// House tile on the exterior
    pub house: TilePos,
    /// Door tile inside the interior
    pub door: TilePos,
    /// Storage chests placed
    pub storage_chests: usize,
    /// Tiles persisted
    pub tiles: usize,
}

/// Outcome of a successful composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompositionReport {
    /// Exterior world id
    pub world_id: WorldId,
    /// Exterior name
    pub name: String,
    /// Exterior width
    pub width: u32,
    /// Exterior height
    pub height: u32,
    /// Exterior tiles persisted
    pub tiles_created: usize,
    /// Houses placed
    pub houses: usize,
    /// One entry per house
    pub interiors: Vec<InteriorSummary>,
    /// Return portals the store did not configure
    pub portal_warnings: Vec<PortalWarning>,
}

/// Worlds produced by one composition.
#[derive(Debug, Clone)]
pub struct Composition {
    /// The exterior map
    pub exterior: World,
    /// Interiors in house order
    pub interiors: Vec<World>,
    /// Summary
    pub report: CompositionReport,
}

/// A failed composition, after cleanup.
#[derive(Debug, Error)]
#[error(
    "{cause} (rolled back {} world(s), {} cleanup failure(s))",
    .rolled_back.len(),
    .cleanup_failures.len()
)]
pub struct ComposeError {
    /// What went wrong
    #[source]
    pub cause: GenError,
    /// Worlds deleted during cleanup
    pub rolled_back: Vec<WorldId>,
    /// Worlds that could not be deleted
    pub cleanup_failures: Vec<(WorldId, StoreError)>,
}

#[derive(Debug, Clone, Copy)]
struct InteriorJob {
    house: TilePos,
}

/// Composes exterior worlds and their interiors.
pub struct WorldComposer<'s> {
    store: &'s dyn WorldStore,
    config: ComposeConfig,
    cancel: CancelToken,
}

impl<'s> WorldComposer<'s> {
    /// Creates a composer writing to `store`.
    #[must_use]
    pub fn new(store: &'s dyn WorldStore, config: ComposeConfig) -> Self {
        Self {
            store,
            config,
            cancel: CancelToken::new(),
        }
    }

    /// Uses `cancel` to abort between stages.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Generates, persists and links one exterior world and its interiors.
    pub fn compose(&self, name: &str, rng: &mut Rng) -> Result<Composition, ComposeError> {
        self.compose_inner(name, None, rng)
    }

    /// Like [`compose`](Self::compose), classifying the given fields instead
    /// of synthesizing noise. The exterior takes the fields' dimensions.
    pub fn compose_from_fields(
        &self,
        name: &str,
        elevation: &ScalarField,
        moisture: &ScalarField,
        rng: &mut Rng,
    ) -> Result<Composition, ComposeError> {
        self.compose_inner(name, Some((elevation, moisture)), rng)
    }

    /// Synthesizes elevation and moisture from independent forks of `rng`.
    pub fn generate_fields(&self, rng: &mut Rng) -> GenResult<(ScalarField, ScalarField)> {
        check_map_size(self.config.width, self.config.height)?;
        let noise = NoiseFieldGenerator::new(self.config.octaves);
        let mut elevation_rng = rng.fork();
        let mut moisture_rng = rng.fork();
        let elevation = noise.generate(self.config.width, self.config.height, &mut elevation_rng)?;
        let moisture = noise.generate(self.config.width, self.config.height, &mut moisture_rng)?;
        Ok((elevation, moisture))
    }

    fn compose_inner(
        &self,
        name: &str,
        fields: Option<(&ScalarField, &ScalarField)>,
        rng: &mut Rng,
    ) -> Result<Composition, ComposeError> {
        let mut created = Vec::new();
        self.run(name, fields, rng, &mut created)
            .map_err(|cause| self.rollback(cause, created))
    }

    fn run(
        &self,
        name: &str,
        fields: Option<(&ScalarField, &ScalarField)>,
        rng: &mut Rng,
        created: &mut Vec<WorldId>,
    ) -> GenResult<Composition> {
        let cfg = &self.config;
        let (width, height) = fields.map_or((cfg.width, cfg.height), |(e, _)| (e.width(), e.height()));
        check_map_size(width, height)?;
        let builder = InteriorBuilder::new(cfg.interior_width, cfg.interior_height)?
            .with_storage_probability(cfg.storage_probability);
        let registry = load_registry(self.store)?;
        self.cancel.check()?;

        let base = match fields {
            Some((elevation, moisture)) => self.terrain_from_fields(elevation, moisture)?,
            None => {
                let (elevation, moisture) = self.generate_fields(rng)?;
                self.terrain_from_fields(&elevation, &moisture)?
            },
        };
        let mut terrain = base.clone();
        let houses = scatter(
            &mut terrain,
            TerrainKind::House,
            &[TerrainKind::Plain],
            cfg.house_probability,
            rng,
        );
        self.cancel.check()?;

        let exterior_id = self.store.create_server(&ServerSpec {
            name: name.to_string(),
            max_players: cfg.max_players,
            width,
            height,
        })?;
        created.push(exterior_id);
        info!(world = %exterior_id, %name, width, height, houses = houses.len(), "Composing world");

        let features = houses
            .iter()
            .map(|&pos| Feature::new(pos, TerrainKind::House))
            .collect();
        let mut exterior = World::new(exterior_id, name, base, terrain, features);

        let mut queue: VecDeque<InteriorJob> = houses.iter().map(|&house| InteriorJob { house }).collect();
        let mut pending = Vec::with_capacity(queue.len());
        let mut interiors = Vec::with_capacity(queue.len());
        while let Some(job) = queue.pop_front() {
            self.cancel.check()?;
            let (interior, door) = self.build_interior(name, job, &builder, &registry, rng, created)?;
            pending.push(PendingLink {
                exterior_pos: job.house,
                interior_id: interior.id(),
                interior_door: door,
            });
            interiors.push(interior);
        }

        // Every interior exists from here on.
        let mut linker = PortalLinker::new(self.store);
        let portal_warnings: Vec<PortalWarning> = pending
            .iter()
            .zip(interiors.iter_mut())
            .filter_map(|(link, interior)| linker.link(&mut exterior, link, Some(interior)))
            .collect();

        // Tiles go out after linking so persisted doors and houses carry
        // the same portal metadata as the returned worlds.
        for interior in &interiors {
            insert_tiles_batched(self.store, interior.id(), &interior.tile_records(), cfg.batch_size)?;
        }
        exterior.validate_labels(&registry)?;
        let tiles_created = insert_tiles_batched(self.store, exterior_id, &exterior.tile_records(), cfg.batch_size)?;

        let summaries = pending
            .iter()
            .zip(&interiors)
            .map(|(link, interior)| InteriorSummary {
                world_id: interior.id(),
                name: interior.name().to_string(),
                house: link.exterior_pos,
                door: link.interior_door,
                storage_chests: interior.features_of(TerrainKind::StorageChest).count(),
                tiles: interior.terrain().len(),
            })
            .collect();

        info!(
            world = %exterior_id,
            tiles = tiles_created,
            houses = houses.len(),
            warnings = portal_warnings.len(),
            "Composed world"
        );

        Ok(Composition {
            report: CompositionReport {
                world_id: exterior_id,
                name: name.to_string(),
                width,
                height,
                tiles_created,
                houses: houses.len(),
                interiors: summaries,
                portal_warnings,
            },
            exterior,
            interiors,
        })
    }

    fn terrain_from_fields(&self, elevation: &ScalarField, moisture: &ScalarField) -> GenResult<TerrainGrid> {
        let classified = classify_fields(elevation, moisture)?;
        smooth_cancellable(classified, self.config.smoothing_iterations, &self.cancel)
    }

    fn build_interior(
        &self,
        exterior_name: &str,
        job: InteriorJob,
        builder: &InteriorBuilder,
        registry: &TerrainRegistry,
        rng: &mut Rng,
        created: &mut Vec<WorldId>,
    ) -> GenResult<(World, TilePos)> {
        let name = format!("{exterior_name}/house-{}-{}", job.house.x, job.house.y);
        let id = self.store.create_server(&ServerSpec {
            name: name.clone(),
            max_players: self.config.interior_max_players,
            width: builder.width(),
            height: builder.height(),
        })?;
        created.push(id);

        builder.build(id, &name, registry, rng)
    }

    /// Deletes `created` newest first, so the exterior goes last.
    fn rollback(&self, cause: GenError, created: Vec<WorldId>) -> ComposeError {
        warn!("Composition failed: {cause}; rolling back {} world(s)", created.len());
        let mut rolled_back = Vec::with_capacity(created.len());
        let mut cleanup_failures = Vec::new();
        for id in created.into_iter().rev() {
            match self.store.delete_server(id) {
                Ok(()) => rolled_back.push(id),
                Err(e) => {
                    warn!(world = %id, "Rollback delete failed: {e}");
                    cleanup_failures.push((id, e));
                },
            }
        }
        ComposeError {
            cause,
            rolled_back,
            cleanup_failures,
        }
    }
}

/// Rejects sizes the generator cannot allocate.
fn check_map_size(width: u32, height: u32) -> GenResult<()> {
    if width == 0 || height == 0 || width > MAX_MAP_SIZE || height > MAX_MAP_SIZE {
        return Err(GenError::InvalidDimensions { width, height });
    }
    Ok(())
}
