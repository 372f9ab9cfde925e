//! Configuration system for sandgrid.
//!
//! Provides runtime-configurable settings that persist to disk as RON files.
//! Supports CLI overrides via clap, hot-reload detection, and forward/backward
//! compatible serialization.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{CollisionConfig, Config, DebugConfig, WorldConfig};
pub use error::ConfigError;
pub use sandgrid_collision::MergePreference;
