//! Command-line argument parsing for sandgrid.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// sandgrid command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "sandgrid", about = "Chunked falling-sand world")]
pub struct CliArgs {
    /// Chunk side length in blocks.
    #[arg(long)]
    pub chunk_size: Option<u32>,

    /// Chunks to load around the origin, as a square radius.
    #[arg(long)]
    pub preload_radius: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(size) = args.chunk_size {
            self.world.chunk_size = size;
        }
        if let Some(radius) = args.preload_radius {
            self.world.preload_radius = radius;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            chunk_size: Some(32),
            preload_radius: None,
            log_level: Some("trace".to_string()),
            config: None,
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.world.chunk_size, 32);
        assert_eq!(config.debug.log_level, "trace");
        // Non-overridden fields retain defaults
        assert_eq!(config.world.preload_radius, 1);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        let args = CliArgs {
            chunk_size: None,
            preload_radius: None,
            log_level: None,
            config: None,
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::parse_from([
            "sandgrid",
            "--chunk-size",
            "16",
            "--preload-radius",
            "3",
            "--config",
            "/tmp/sg",
        ]);
        assert_eq!(args.chunk_size, Some(16));
        assert_eq!(args.preload_radius, Some(3));
        assert_eq!(args.config, Some(PathBuf::from("/tmp/sg")));
        assert!(args.log_level.is_none());
    }
}
