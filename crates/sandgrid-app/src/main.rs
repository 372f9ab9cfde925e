//! The binary entry point for sandgrid.

use clap::Parser;
use sandgrid_app::demo;
use sandgrid_app::platform::PlatformDirs;
use sandgrid_config::{CliArgs, Config};

fn main() {
    let args = CliArgs::parse();

    let dirs = match &args.config {
        Some(root) => {
            let dirs = PlatformDirs::resolve_with_root(root);
            dirs.create_dirs().map(|()| dirs)
        }
        None => PlatformDirs::resolve_and_create(),
    };
    let dirs = match dirs {
        Ok(dirs) => dirs,
        Err(e) => {
            eprintln!("Failed to initialize platform directories: {e}");
            std::process::exit(1);
        }
    };

    let mut config = match Config::load_or_create(&dirs.config_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };
    config.apply_cli_overrides(&args);
    if let Err(e) = config.validate() {
        eprintln!("{e}");
        std::process::exit(2);
    }

    sandgrid_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));
    tracing::info!(config_dir = %dirs.config_dir.display(), "sandgrid starting");

    match demo::run(&config) {
        Ok(summary) => {
            println!("sandgrid");
            println!("  chunks loaded:   {}", summary.loaded_chunks);
            println!("  solid cells:     {}", summary.solid_cells);
            println!("  ticks:           {}", summary.ticks);
            println!("  blocks moved:    {}", summary.blocks_moved);
            println!(
                "  colliders:       {} in {} chunks",
                summary.colliders, summary.collider_chunks
            );
        }
        Err(e) => {
            tracing::error!("Demo failed: {}", e);
            std::process::exit(1);
        }
    }
}
