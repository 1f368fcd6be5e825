//! Configuration system for the tessella 3D tiles toolkit.
//!
//! Settings persist to disk as RON files, accept CLI overrides via clap, and
//! are validated up front so that an inconsistent tileset fails at startup
//! rather than per tile.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    Config, DebugConfig, LevelRange, MAX_LEVEL, MeshConfig, PipelineConfig, TilesetConfig,
    default_config_dir,
};
pub use error::ConfigError;
