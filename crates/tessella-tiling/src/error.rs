//! Tiling precondition failures.

use tessella_config::ConfigError;
use thiserror::Error;

/// A tile address or tileset definition that cannot be served.
///
/// These are configuration problems detected when a tileset is set up, not
/// per-tile runtime conditions.
#[derive(Debug, Error)]
pub enum TilingError {
    /// The level is above the deepest supported level.
    #[error("tile level {level} exceeds the maximum level {max}")]
    LevelOutOfRange {
        /// Requested level.
        level: u32,
        /// Deepest supported level.
        max: u32,
    },

    /// `x` or `y` is outside `[0, 2^level)`.
    #[error("tile {x}/{y} is outside the {size}x{size} grid of level {level}")]
    CoordinateOutOfRange {
        /// Level of the address.
        level: u32,
        /// Column.
        x: u32,
        /// Row.
        y: u32,
        /// Number of tiles per axis at this level.
        size: u32,
    },

    /// The collection has no spatial extent to tile.
    #[error("collection '{0}' has no spatial extent")]
    MissingExtent(String),

    /// The tileset configuration is inconsistent.
    #[error("invalid tileset configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}
