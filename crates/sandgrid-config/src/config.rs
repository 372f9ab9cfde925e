//! Configuration structs with sensible defaults and RON persistence.

use std::path::Path;

use sandgrid_collision::MergePreference;
use sandgrid_coords::ChunkSize;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// World layout settings.
    pub world: WorldConfig,
    /// Collider generation settings.
    pub collision: CollisionConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// World layout configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// Chunk side length in blocks. Fixed for the lifetime of a world.
    pub chunk_size: u32,
    /// Chebyshev radius of chunks loaded around the origin at startup.
    pub preload_radius: u32,
}

/// Collider generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CollisionConfig {
    /// Rebuild colliders for edited chunks each tick.
    pub enabled: bool,
    /// Which merge partition to keep.
    pub merge: MergePreference,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log every collider handed to the backend.
    pub show_colliders: bool,
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            chunk_size: 64,
            preload_radius: 1,
        }
    }
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            merge: MergePreference::Fewest,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            show_colliders: false,
            log_level: "info".to_string(),
        }
    }
}

// --- Validation ---

impl Config {
    /// Checks values that serde alone cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.chunk_size().map(|_| ())
    }

    /// The configured chunk size as a validated [`ChunkSize`].
    pub fn chunk_size(&self) -> Result<ChunkSize, ConfigError> {
        ChunkSize::new(self.world.chunk_size).map_err(ConfigError::InvalidChunkSize)
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            config.validate()?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    ///
    /// A reloaded config is validated, but callers must not apply a changed
    /// `chunk_size` to a world that already exists.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        new_config.validate()?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
