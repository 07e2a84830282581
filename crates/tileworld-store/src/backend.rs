//! The World Store contract.

use std::collections::BTreeMap;

use tileworld_common::{StoreResult, TerrainRegistry, WorldId};
use tracing::debug;

use crate::records::{PortalAck, PortalRequest, ServerSpec, TileRecord};

/// Records per `insert_tiles` call unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Trait for World Store backends.
///
/// Every call may fail. Callers that create a server are responsible for
/// deleting it again if a later step of their work fails.
pub trait WorldStore: Send + Sync {
    /// Backend name.
    fn name(&self) -> &str;

    /// Creates a server record and returns its id.
    fn create_server(&self, spec: &ServerSpec) -> StoreResult<WorldId>;

    /// Deletes a server record together with its tiles and portals.
    fn delete_server(&self, id: WorldId) -> StoreResult<()>;

    /// Inserts one batch of tiles for a server.
    fn insert_tiles(&self, id: WorldId, tiles: &[TileRecord]) -> StoreResult<()>;

    /// Points a tile at a destination. Reconfiguring a tile replaces its
    /// previous destination.
    fn configure_portal(&self, request: &PortalRequest) -> StoreResult<PortalAck>;

    /// Known terrain labels and their display glyphs.
    fn list_terrain_types(&self) -> StoreResult<BTreeMap<String, String>>;
}

/// Loads the store's terrain table into a registry.
pub fn load_registry(store: &dyn WorldStore) -> StoreResult<TerrainRegistry> {
    let registry = TerrainRegistry::from_map(store.list_terrain_types()?);
    debug!("Loaded {} terrain types from {}", registry.len(), store.name());
    Ok(registry)
}

/// Inserts `tiles` in chunks of at most `batch_size` records.
///
/// Returns the number of records inserted. Stops at the first failed batch.
pub fn insert_tiles_batched(
    store: &dyn WorldStore,
    id: WorldId,
    tiles: &[TileRecord],
    batch_size: usize,
) -> StoreResult<usize> {
    let batch_size = batch_size.max(1);
    for (index, batch) in tiles.chunks(batch_size).enumerate() {
        store.insert_tiles(id, batch)?;
        debug!(world = %id, batch = index, records = batch.len(), "Inserted tile batch");
    }
    Ok(tiles.len())
}
