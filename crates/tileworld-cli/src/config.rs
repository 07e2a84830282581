//! Generator configuration.
//!
//! Loaded from `tileworld.toml`; every field is optional in the file and
//! falls back to its default.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use tileworld_gen::{ComposeConfig, MAX_MAP_SIZE};
use tracing::{debug, info, warn};

/// Configuration file name.
pub const CONFIG_FILE: &str = "tileworld.toml";

/// Largest accepted interior side.
const MAX_INTERIOR_SIZE: u32 = 64;

/// Largest tile batch the stores accept.
const MAX_BATCH_SIZE: usize = 1000;

/// World generation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    // === Exterior ===
    /// Map width in tiles
    pub width: u32,
    /// Map height in tiles
    pub height: u32,
    /// Generation seed (None = random)
    pub seed: Option<u64>,
    /// Noise octaves
    pub octaves: u32,
    /// Cellular automaton iterations
    pub smoothing_iterations: u32,
    /// House chance per plain tile (0.0 - 1.0)
    pub house_probability: f64,
    /// Player cap of the exterior server
    pub max_players: u32,

    // === Interiors ===
    /// Interior width in tiles
    pub interior_width: u32,
    /// Interior height in tiles
    pub interior_height: u32,
    /// Storage chest chance per wall tile (0.0 - 1.0)
    pub storage_probability: f64,
    /// Player cap of each interior server
    pub interior_max_players: u32,

    // === Store ===
    /// Tile records per insert call
    pub batch_size: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        let compose = ComposeConfig::default();
        Self {
            width: compose.width,
            height: compose.height,
            seed: None,
            octaves: compose.octaves,
            smoothing_iterations: compose.smoothing_iterations,
            house_probability: compose.house_probability,
            max_players: compose.max_players,
            interior_width: compose.interior_width,
            interior_height: compose.interior_height,
            storage_probability: compose.storage_probability,
            interior_max_players: compose.interior_max_players,
            batch_size: compose.batch_size,
        }
    }
}

impl GeneratorConfig {
    /// Load generator settings from `path`.
    ///
    /// A missing, unreadable or malformed file yields the defaults.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            debug!("No generator config at {}, using defaults", path.display());
            return Self::default();
        }

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Failed to read generator config {}: {e}", path.display());
                return Self::default();
            },
        };

        match toml::from_str(&contents) {
            Ok(config) => {
                info!("Loaded generator config from {}", path.display());
                config
            },
            Err(e) => {
                warn!("Ignoring malformed generator config {}: {e}", path.display());
                Self::default()
            },
        }
    }

    /// Write these settings to `path`, creating parent directories.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, contents)?;

        info!("Saved generator config to {}", path.display());
        Ok(())
    }

    /// Clamp values to valid ranges.
    pub fn validate(&mut self) {
        self.width = self.width.clamp(1, MAX_MAP_SIZE);
        self.height = self.height.clamp(1, MAX_MAP_SIZE);
        self.octaves = self.octaves.clamp(1, 12);
        self.smoothing_iterations = self.smoothing_iterations.min(50);
        self.house_probability = self.house_probability.clamp(0.0, 1.0);
        self.max_players = self.max_players.max(1);

        self.interior_width = self.interior_width.clamp(1, MAX_INTERIOR_SIZE);
        self.interior_height = self.interior_height.clamp(1, MAX_INTERIOR_SIZE);
        self.storage_probability = self.storage_probability.clamp(0.0, 1.0);
        self.interior_max_players = self.interior_max_players.max(1);

        self.batch_size = self.batch_size.clamp(1, MAX_BATCH_SIZE);
    }

    /// Composition parameters for these settings.
    #[must_use]
    pub fn compose_config(&self) -> ComposeConfig {
        ComposeConfig {
            width: self.width,
            height: self.height,
            octaves: self.octaves,
            smoothing_iterations: self.smoothing_iterations,
            house_probability: self.house_probability,
            storage_probability: self.storage_probability,
            interior_width: self.interior_width,
            interior_height: self.interior_height,
            max_players: self.max_players,
            interior_max_players: self.interior_max_players,
            batch_size: self.batch_size,
        }
    }
}
