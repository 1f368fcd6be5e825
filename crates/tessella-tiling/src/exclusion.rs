//! Exclusion regions that keep a feature in exactly one tile per level.
//!
//! A feature crossing tile borders intersects several tile boxes. Each tile
//! skips features that also touch its west, north or northwest neighbour, so
//! a feature ends up in the north-westernmost tile it touches.

use geo::{LineString, Polygon};

use crate::address::TileAddress;
use crate::bounds::BoundingBox;

/// Position of a tile relative to the western and northern edges of the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExclusionCase {
    /// `x == 0` and top row: nothing to exclude.
    NorthwestCorner,
    /// `x == 0`: exclude the tile to the north.
    WesternEdge,
    /// Top row: exclude the tile to the west.
    NorthernEdge,
    /// Exclude west, north and northwest neighbours.
    Interior,
}

impl ExclusionCase {
    /// Classify tile `(x, y)` of level `level`.
    #[must_use]
    pub fn classify(level: u32, x: u32, y: u32) -> Self {
        let top = (1u32 << level) - 1;
        match (x == 0, y == top) {
            (true, true) => ExclusionCase::NorthwestCorner,
            (true, false) => ExclusionCase::WesternEdge,
            (false, true) => ExclusionCase::NorthernEdge,
            (false, false) => ExclusionCase::Interior,
        }
    }

    /// Classify a tile address.
    #[must_use]
    pub fn of(address: &TileAddress) -> Self {
        Self::classify(address.level(), address.x(), address.y())
    }
}

/// The region whose features are left to neighbouring tiles, in the root
/// extent's horizontal coordinates. `None` for the north-west corner tile.
#[must_use]
pub fn exclusion_polygon(root: &BoundingBox, address: &TileAddress) -> Option<Polygon<f64>> {
    let level = address.level();
    let x = i64::from(address.x());
    let y = i64::from(address.y());

    match ExclusionCase::of(address) {
        ExclusionCase::NorthwestCorner => None,
        ExclusionCase::WesternEdge => Some(root.cell(level, x, y + 1).to_rect().to_polygon()),
        ExclusionCase::NorthernEdge => Some(root.cell(level, x - 1, y).to_rect().to_polygon()),
        ExclusionCase::Interior => {
            // Two cells wide and high, starting at the west neighbour.
            let (x0, y0) = root.grid_point(level, x - 1, y);
            let (x1, y1) = root.grid_point(level, x, y + 1);
            let (x2, y2) = root.grid_point(level, x + 1, y + 2);
            let ring = LineString::from(vec![
                (x0, y0),
                (x1, y0),
                (x1, y1),
                (x2, y1),
                (x2, y2),
                (x0, y2),
                (x0, y0),
            ]);
            Some(Polygon::new(ring, Vec::new()))
        }
    }
}
