//! In-memory World Store.
//!
//! Holds everything in process memory. Useful for tests and dry runs;
//! [`FailurePlan`] makes individual calls fail on demand so callers can
//! exercise their rollback paths.

use std::collections::{BTreeMap, HashMap};

use parking_lot::Mutex;
use tileworld_common::{
    PortalDestination, StoreError, StoreResult, TerrainKind, TerrainRegistry, TilePos, WorldId,
};
use tracing::debug;

use crate::backend::{WorldStore, DEFAULT_BATCH_SIZE};
use crate::records::{PortalAck, PortalRequest, ServerRecord, ServerSpec, TileRecord};

/// Calls that should fail.
#[derive(Debug, Clone, Default)]
pub struct FailurePlan {
    /// Fail every `create_server` after this many successful ones
    pub fail_create_after: Option<usize>,
    /// Fail the n-th `insert_tiles` call (1-based)
    pub fail_insert_on_call: Option<usize>,
    /// Answer every portal request with `success: false`
    pub fail_portals: bool,
    /// Labels left out of `list_terrain_types`
    pub missing_terrain_types: Vec<TerrainKind>,
}

#[derive(Debug, Default)]
struct Inner {
    servers: HashMap<WorldId, ServerRecord>,
    tiles: HashMap<WorldId, Vec<TileRecord>>,
    portals: HashMap<(WorldId, TilePos), PortalDestination>,
    create_calls: usize,
    insert_calls: usize,
    delete_calls: usize,
    portal_calls: usize,
}

/// World Store kept in process memory.
#[derive(Debug)]
pub struct MemoryWorldStore {
    inner: Mutex<Inner>,
    plan: FailurePlan,
    max_batch: usize,
}

impl MemoryWorldStore {
    /// Creates an empty store that never fails.
    #[must_use]
    pub fn new() -> Self {
        Self::with_failures(FailurePlan::default())
    }

    /// Creates an empty store that fails according to `plan`.
    #[must_use]
    pub fn with_failures(plan: FailurePlan) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            plan,
            max_batch: DEFAULT_BATCH_SIZE,
        }
    }

    /// Sets the largest accepted tile batch.
    #[must_use]
    pub fn with_max_batch(mut self, max_batch: usize) -> Self {
        self.max_batch = max_batch;
        self
    }

    /// Number of live server records.
    #[must_use]
    pub fn server_count(&self) -> usize {
        self.inner.lock().servers.len()
    }

    /// Tiles persisted for a server.
    #[must_use]
    pub fn tiles(&self, id: WorldId) -> Vec<TileRecord> {
        self.inner.lock().tiles.get(&id).cloned().unwrap_or_default()
    }

    /// Number of tiles persisted for a server.
    #[must_use]
    pub fn tile_count(&self, id: WorldId) -> usize {
        self.inner.lock().tiles.get(&id).map_or(0, Vec::len)
    }

    /// Configured destination of a portal tile.
    #[must_use]
    pub fn portal(&self, id: WorldId, pos: TilePos) -> Option<PortalDestination> {
        self.inner.lock().portals.get(&(id, pos)).copied()
    }

    /// Number of configured portal tiles across all servers.
    #[must_use]
    pub fn portal_count(&self) -> usize {
        self.inner.lock().portals.len()
    }

    /// Number of `insert_tiles` calls so far.
    #[must_use]
    pub fn insert_calls(&self) -> usize {
        self.inner.lock().insert_calls
    }

    /// Number of `delete_server` calls so far.
    #[must_use]
    pub fn delete_calls(&self) -> usize {
        self.inner.lock().delete_calls
    }

    /// Number of `configure_portal` calls so far.
    #[must_use]
    pub fn portal_calls(&self) -> usize {
        self.inner.lock().portal_calls
    }
}

impl Default for MemoryWorldStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldStore for MemoryWorldStore {
    fn name(&self) -> &str {
        "Memory Store"
    }

    fn create_server(&self, spec: &ServerSpec) -> StoreResult<WorldId> {
        let mut inner = self.inner.lock();
        if self
            .plan
            .fail_create_after
            .is_some_and(|limit| inner.create_calls >= limit)
        {
            return Err(StoreError::Unavailable("server creation refused".into()));
        }
        inner.create_calls += 1;

        let id = WorldId::new();
        inner.servers.insert(id, ServerRecord::new(id, spec));
        debug!(world = %id, name = %spec.name, "Created server");
        Ok(id)
    }

    fn delete_server(&self, id: WorldId) -> StoreResult<()> {
        let mut inner = self.inner.lock();
        inner.delete_calls += 1;
        if inner.servers.remove(&id).is_none() {
            return Err(StoreError::NotFound(id));
        }
        inner.tiles.remove(&id);
        inner.portals.retain(|(server, _), _| *server != id);
        debug!(world = %id, "Deleted server");
        Ok(())
    }

    fn insert_tiles(&self, id: WorldId, tiles: &[TileRecord]) -> StoreResult<()> {
        let mut inner = self.inner.lock();
        inner.insert_calls += 1;
        if self.plan.fail_insert_on_call == Some(inner.insert_calls) {
            return Err(StoreError::WriteFailure(format!(
                "insert call {} rejected",
                inner.insert_calls
            )));
        }
        if tiles.len() > self.max_batch {
            return Err(StoreError::BatchTooLarge {
                len: tiles.len(),
                max: self.max_batch,
            });
        }
        if !inner.servers.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        inner.tiles.entry(id).or_default().extend_from_slice(tiles);
        Ok(())
    }

    fn configure_portal(&self, request: &PortalRequest) -> StoreResult<PortalAck> {
        let mut inner = self.inner.lock();
        inner.portal_calls += 1;
        if self.plan.fail_portals {
            return Ok(PortalAck::failed("portal configuration disabled"));
        }
        if !inner.servers.contains_key(&request.server_id) {
            return Ok(PortalAck::failed(format!("unknown server {}", request.server_id)));
        }
        let pos = TilePos::new(request.x, request.y);
        let replaced = inner
            .portals
            .insert((request.server_id, pos), request.destination())
            .is_some();
        Ok(PortalAck::ok(if replaced {
            "portal reconfigured"
        } else {
            "portal configured"
        }))
    }

    fn list_terrain_types(&self) -> StoreResult<BTreeMap<String, String>> {
        let mut map = TerrainRegistry::default().as_map().clone();
        for kind in &self.plan.missing_terrain_types {
            map.remove(kind.label());
        }
        Ok(map)
    }
}
