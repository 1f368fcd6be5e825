//! Implicit quadtree tiling: tile addresses, tile boxes, exclusion regions,
//! subtree expansion and the feature queries that fill each tile.

mod address;
mod bounds;
mod error;
mod exclusion;
pub mod morton;
mod query;
mod subtree;
mod tileset;

pub use address::{TileAddress, TileKind, grid_size};
pub use bounds::{BoundingBox, compute_bbox};
pub use error::TilingError;
pub use exclusion::{ExclusionCase, exclusion_polygon};
pub use query::{CRS84H, FeatureQuery, Filter, MAX_FEATURES_PER_TILE, SpatialLiteral, spatial_filter};
pub use subtree::{descendants, expand};
pub use tileset::Tileset;
