//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::{Config, LevelRange};

/// Tessella command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "tessella", about = "Implicit 3D tiles from polygon datasets")]
pub struct CliArgs {
    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// First quadtree level with content.
    #[arg(long)]
    pub min_level: Option<u32>,

    /// Last quadtree level with content.
    #[arg(long)]
    pub max_level: Option<u32>,

    /// Number of levels in each subtree.
    #[arg(long)]
    pub subtree_levels: Option<u32>,

    /// Number of meshing worker threads.
    #[arg(long)]
    pub workers: Option<usize>,

    /// Emit outline edges.
    #[arg(long)]
    pub outline: Option<bool>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        let LevelRange { min, max } = self.tileset.content_levels;
        self.tileset.content_levels = LevelRange {
            min: args.min_level.unwrap_or(min),
            max: args.max_level.unwrap_or(max),
        };
        if let Some(levels) = args.subtree_levels {
            self.tileset.subtree_levels = levels;
        }
        if let Some(workers) = args.workers {
            self.pipeline.workers = workers;
        }
        if let Some(outline) = args.outline {
            self.mesh.with_outline = outline;
        }
    }
}
