//! Local filesystem World Store.
//!
//! Layout under the store root:
//!
//! ```text
//! store.key              access key recorded on first open
//! terrain_types.json     optional label -> glyph override
//! <world id>/server.json
//! <world id>/tiles.jsonl one tile record per line
//! <world id>/portals.json
//! ```

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tileworld_common::{PortalDestination, StoreError, StoreResult, TerrainRegistry, WorldId};
use tracing::{debug, info, warn};

use crate::backend::{WorldStore, DEFAULT_BATCH_SIZE};
use crate::records::{PortalAck, PortalRequest, ServerRecord, ServerSpec, TileRecord};

const KEY_FILE: &str = "store.key";
const TERRAIN_FILE: &str = "terrain_types.json";
const SERVER_FILE: &str = "server.json";
const TILES_FILE: &str = "tiles.jsonl";
const PORTALS_FILE: &str = "portals.json";

/// World Store backed by a local directory.
#[derive(Debug)]
pub struct LocalWorldStore {
    /// Store root directory.
    root: PathBuf,
    max_batch: usize,
}

impl LocalWorldStore {
    /// Opens (or initializes) the store at `root`.
    ///
    /// The first open records `key`; later opens must present the same key.
    pub fn open(root: impl AsRef<Path>, key: &str) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;

        let key_path = root.join(KEY_FILE);
        if key_path.exists() {
            let stored = fs::read_to_string(&key_path)?;
            if stored.trim() != key {
                return Err(StoreError::AccessDenied);
            }
        } else {
            fs::write(&key_path, key)?;
            info!("Initialized local store at {}", root.display());
        }

        Ok(Self {
            root,
            max_batch: DEFAULT_BATCH_SIZE,
        })
    }

    /// Opens a store from a `file://` URL or a plain path.
    pub fn open_url(url: &str, key: &str) -> StoreResult<Self> {
        let path = url.strip_prefix("file://").unwrap_or(url);
        if path.is_empty() {
            return Err(StoreError::Unavailable(format!("unsupported store url: {url}")));
        }
        Self::open(path, key)
    }

    /// Returns the store root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reads a server record.
    pub fn load_server(&self, id: WorldId) -> StoreResult<ServerRecord> {
        let path = self.existing_server_dir(id)?.join(SERVER_FILE);
        read_json(&path)
    }

    /// Reads every tile persisted for a server.
    pub fn load_tiles(&self, id: WorldId) -> StoreResult<Vec<TileRecord>> {
        let path = self.existing_server_dir(id)?.join(TILES_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let reader = BufReader::new(File::open(&path)?);
        let mut tiles = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            tiles.push(
                serde_json::from_str(&line).map_err(|e| StoreError::Serialization(e.to_string()))?,
            );
        }
        Ok(tiles)
    }

    /// Reads the configured portals of a server, keyed `"x,y"`.
    pub fn load_portals(&self, id: WorldId) -> StoreResult<BTreeMap<String, PortalDestination>> {
        let path = self.existing_server_dir(id)?.join(PORTALS_FILE);
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        read_json(&path)
    }

    fn server_dir(&self, id: WorldId) -> PathBuf {
        self.root.join(id.to_string())
    }

    fn existing_server_dir(&self, id: WorldId) -> StoreResult<PathBuf> {
        let dir = self.server_dir(id);
        if dir.is_dir() {
            Ok(dir)
        } else {
            Err(StoreError::NotFound(id))
        }
    }
}

impl WorldStore for LocalWorldStore {
    fn name(&self) -> &str {
        "Local Store"
    }

    fn create_server(&self, spec: &ServerSpec) -> StoreResult<WorldId> {
        let id = WorldId::new();
        init_server_dir(&self.server_dir(id), &ServerRecord::new(id, spec))?;
        debug!(world = %id, name = %spec.name, "Created server");
        Ok(id)
    }

    fn delete_server(&self, id: WorldId) -> StoreResult<()> {
        let dir = self.existing_server_dir(id)?;
        fs::remove_dir_all(&dir)?;
        debug!(world = %id, "Deleted server");
        Ok(())
    }

    fn insert_tiles(&self, id: WorldId, tiles: &[TileRecord]) -> StoreResult<()> {
        if tiles.len() > self.max_batch {
            return Err(StoreError::BatchTooLarge {
                len: tiles.len(),
                max: self.max_batch,
            });
        }
        let path = self.existing_server_dir(id)?.join(TILES_FILE);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut writer = BufWriter::new(file);
        for tile in tiles {
            serde_json::to_writer(&mut writer, tile)
                .map_err(|e| StoreError::WriteFailure(e.to_string()))?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }

    fn configure_portal(&self, request: &PortalRequest) -> StoreResult<PortalAck> {
        let mut portals = match self.load_portals(request.server_id) {
            Ok(portals) => portals,
            Err(StoreError::NotFound(id)) => {
                return Ok(PortalAck::failed(format!("unknown server {id}")));
            },
            Err(e) => return Err(e),
        };
        let key = format!("{},{}", request.x, request.y);
        let replaced = portals.insert(key, request.destination()).is_some();
        write_json(&self.server_dir(request.server_id).join(PORTALS_FILE), &portals)?;
        Ok(PortalAck::ok(if replaced {
            "portal reconfigured"
        } else {
            "portal configured"
        }))
    }

    fn list_terrain_types(&self) -> StoreResult<BTreeMap<String, String>> {
        let path = self.root.join(TERRAIN_FILE);
        if path.exists() {
            read_json(&path)
        } else {
            Ok(TerrainRegistry::default().as_map().clone())
        }
    }
}

/// Creates a server directory with its record. A directory whose record
/// could not be written is removed again.
fn init_server_dir(dir: &Path, record: &ServerRecord) -> StoreResult<()> {
    fs::create_dir_all(dir)?;
    if let Err(e) = write_json(&dir.join(SERVER_FILE), record) {
        if let Err(cleanup) = fs::remove_dir_all(dir) {
            warn!("Failed to remove incomplete server dir {}: {cleanup}", dir.display());
        }
        return Err(e);
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> StoreResult<T> {
    let reader = BufReader::new(File::open(path)?);
    serde_json::from_reader(reader).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> StoreResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|e| StoreError::WriteFailure(e.to_string()))?;
    writer.flush()?;
    Ok(())
}
