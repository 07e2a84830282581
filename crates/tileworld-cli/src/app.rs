//! Command-line surface: flags, credentials and a single composition run.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use fastrand::Rng;
use serde::Serialize;
use tileworld_common::WorldId;
use tileworld_gen::{CompositionReport, WorldComposer};
use tileworld_store::LocalWorldStore;
use tracing::{debug, info};

use crate::config::{GeneratorConfig, CONFIG_FILE};

/// Environment variable holding the store URL.
pub const STORE_URL_VAR: &str = "TILEWORLD_STORE_URL";

/// Environment variable holding the store access key.
pub const STORE_KEY_VAR: &str = "TILEWORLD_STORE_KEY";

/// Dotenv file consulted for credentials missing from the environment.
pub const ENV_FILE: &str = ".env.local";

/// Generate a tile world with house interiors and persist it.
#[derive(Debug, Clone, Parser)]
#[command(name = "tileworld", version, about)]
pub struct Args {
    /// Map width in tiles
    #[arg(long, allow_negative_numbers = true)]
    pub width: Option<i64>,

    /// Map height in tiles
    #[arg(long, allow_negative_numbers = true)]
    pub height: Option<i64>,

    /// Generation seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// World name (defaults to `World-<8 hex>`)
    #[arg(long)]
    pub name: Option<String>,
}

/// Store location and access key.
#[derive(Clone)]
pub struct Credentials {
    /// `file://` URL or directory
    pub url: String,
    /// Access key
    pub key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("url", &self.url)
            .field("key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Reads both values from the process environment, then `.env.local`.
    pub fn from_env() -> Result<Self> {
        Self::load_with(Path::new(ENV_FILE), |var| std::env::var(var).ok())
    }

    /// Reads both values through `lookup`, falling back to the dotenv file
    /// at `env_file`. A missing file is not an error.
    pub fn load_with(env_file: &Path, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let file_vars = read_env_file(env_file)?;
        Self::from_lookup(|var| lookup(var).or_else(|| file_vars.get(var).cloned()))
    }

    /// Reads both values through `lookup`; empty values count as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let fetch = |var: &str| {
            lookup(var)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("{var} is not set"))
        };
        Ok(Self {
            url: fetch(STORE_URL_VAR)?,
            key: fetch(STORE_KEY_VAR)?,
        })
    }
}

fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let vars = dotenvy::from_path_iter(path)
        .with_context(|| format!("Failed to open {}", path.display()))?
        .collect::<Result<HashMap<_, _>, _>>()
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    debug!("Read {} variable(s) from {}", vars.len(), path.display());
    Ok(vars)
}

/// Structured success output.
#[derive(Debug, Serialize)]
pub struct Summary {
    /// Seed that reproduces the terrain
    pub seed: u64,
    /// Composition outcome
    #[serde(flatten)]
    pub report: CompositionReport,
}

/// Resolves settings from the config file and flags.
pub fn resolve_config(args: &Args) -> GeneratorConfig {
    let path = args.config.clone().unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
    let mut config = GeneratorConfig::load_from(path);
    config.validate();

    // Flags bypass clamping so out-of-range sizes reach the composer, which
    // rejects them before any store call.
    if let Some(width) = args.width {
        config.width = dimension(width);
    }
    if let Some(height) = args.height {
        config.height = dimension(height);
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config
}

fn dimension(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

fn default_name() -> String {
    format!("World-{}", WorldId::new().short())
}

/// Generates one world into the store named by `credentials`.
pub fn run(args: &Args, credentials: &Credentials) -> Result<Summary> {
    let config = resolve_config(args);
    let seed = config.seed.unwrap_or_else(|| fastrand::u64(..));
    let name = args.name.clone().unwrap_or_else(default_name);

    let store = LocalWorldStore::open_url(&credentials.url, &credentials.key)
        .with_context(|| format!("Failed to open world store at {}", credentials.url))?;
    info!(%name, seed, width = config.width, height = config.height, "Generating world");

    let composer = WorldComposer::new(&store, config.compose_config());
    let composition = composer.compose(&name, &mut Rng::with_seed(seed))?;

    Ok(Summary {
        seed,
        report: composition.report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn args(extra: &[&str], config_dir: &TempDir) -> Args {
        let config = config_dir.path().join(CONFIG_FILE);
        let config = config.to_string_lossy().into_owned();
        let mut argv = vec!["tileworld", "--config", config.as_str()];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).expect("Failed to parse args")
    }

    fn credentials(dir: &TempDir) -> Credentials {
        Credentials {
            url: format!("file://{}", dir.path().display()),
            key: "secret".into(),
        }
    }

    #[test]
    fn test_parse_flags() {
        let parsed = Args::try_parse_from(["tileworld", "--width", "40", "--height=-3", "--seed", "9"])
            .expect("Failed to parse args");
        assert_eq!(parsed.width, Some(40));
        assert_eq!(parsed.height, Some(-3));
        assert_eq!(parsed.seed, Some(9));
        assert!(parsed.name.is_none());
    }

    #[test]
    fn test_flags_override_config() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        GeneratorConfig {
            width: 50,
            height: 60,
            seed: Some(1),
            ..GeneratorConfig::default()
        }
        .save_to(temp_dir.path().join(CONFIG_FILE))
        .expect("Failed to save config");

        let config = resolve_config(&args(&["--width", "20", "--seed", "5"], &temp_dir));
        assert_eq!(config.width, 20);
        assert_eq!(config.height, 60);
        assert_eq!(config.seed, Some(5));
    }

    #[test]
    fn test_missing_credentials() {
        let env: HashMap<&str, &str> = HashMap::from([(STORE_URL_VAR, "file:///tmp/x")]);
        let err = Credentials::from_lookup(|v| env.get(v).map(|s| (*s).to_string()))
            .expect_err("key is missing");
        assert!(err.to_string().contains(STORE_KEY_VAR));
    }

    #[test]
    fn test_credentials_from_env_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let env_file = temp_dir.path().join(ENV_FILE);
        std::fs::write(
            &env_file,
            format!("{STORE_URL_VAR}=file:///srv/worlds\n{STORE_KEY_VAR}=\"from-file\"\n"),
        )
        .expect("Failed to write env file");

        let creds = Credentials::load_with(&env_file, |_| None).expect("credentials in file");
        assert_eq!(creds.url, "file:///srv/worlds");
        assert_eq!(creds.key, "from-file");

        let creds = Credentials::load_with(&env_file, |v| {
            (v == STORE_KEY_VAR).then(|| "from-env".to_string())
        })
        .expect("credentials in file and env");
        assert_eq!(creds.url, "file:///srv/worlds");
        assert_eq!(creds.key, "from-env");
    }

    #[test]
    fn test_missing_env_file_is_not_an_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let err = Credentials::load_with(&temp_dir.path().join(ENV_FILE), |_| None)
            .expect_err("nothing configured");
        assert!(err.to_string().contains(STORE_URL_VAR));
    }

    #[test]
    fn test_credentials_debug_hides_key() {
        let creds = Credentials {
            url: "file:///tmp/x".into(),
            key: "hunter2".into(),
        };
        assert!(!format!("{creds:?}").contains("hunter2"));
    }

    #[test]
    fn test_run_writes_world() {
        let config_dir = TempDir::new().expect("Failed to create temp dir");
        let store_dir = TempDir::new().expect("Failed to create temp dir");

        let summary = run(
            &args(&["--width", "16", "--height", "12", "--seed", "7", "--name", "World-test"], &config_dir),
            &credentials(&store_dir),
        )
        .expect("run failed");

        assert_eq!(summary.seed, 7);
        assert_eq!(summary.report.name, "World-test");
        assert_eq!(summary.report.tiles_created, 192);
        assert_eq!(summary.report.interiors.len(), summary.report.houses);

        let store = LocalWorldStore::open(store_dir.path(), "secret").expect("reopen failed");
        let tiles = store.load_tiles(summary.report.world_id).expect("load failed");
        assert_eq!(tiles.len(), 192);

        let json = serde_json::to_value(&summary).expect("serialize failed");
        assert_eq!(json["seed"], 7);
        assert_eq!(json["width"], 16);
    }

    #[test]
    fn test_non_positive_width_creates_nothing() {
        let config_dir = TempDir::new().expect("Failed to create temp dir");
        let store_dir = TempDir::new().expect("Failed to create temp dir");

        let err = run(&args(&["--width=-4", "--seed", "1"], &config_dir), &credentials(&store_dir))
            .expect_err("negative width");
        assert!(err.to_string().contains("Invalid dimensions"));

        let entries = std::fs::read_dir(store_dir.path())
            .expect("read_dir failed")
            .filter_map(std::result::Result::ok)
            .filter(|e| e.path().is_dir())
            .count();
        assert_eq!(entries, 0);
    }

    #[test]
    fn test_oversized_width_creates_nothing() {
        let config_dir = TempDir::new().expect("Failed to create temp dir");
        let store_dir = TempDir::new().expect("Failed to create temp dir");

        let err = run(
            &args(&["--width", "100000000000", "--seed", "1"], &config_dir),
            &credentials(&store_dir),
        )
        .expect_err("width too large");
        assert!(err.to_string().contains("Invalid dimensions"));
        assert_eq!(dimension(100_000_000_000), u32::MAX);
        assert_eq!(dimension(-4), 0);

        let entries = std::fs::read_dir(store_dir.path())
            .expect("read_dir failed")
            .filter_map(std::result::Result::ok)
            .filter(|e| e.path().is_dir())
            .count();
        assert_eq!(entries, 0);
    }

    #[test]
    fn test_default_name_shape() {
        let name = default_name();
        assert!(name.starts_with("World-"));
        assert_eq!(name.len(), 14);
        assert!(name[6..].chars().all(|c| c.is_ascii_hexdigit()));
    }
}
