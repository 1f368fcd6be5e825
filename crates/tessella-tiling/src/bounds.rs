//! Tile bounding boxes derived from a collection's root extent.

use geo::{Coord, Rect};
use glam::DVec3;

use crate::address::TileAddress;

/// An axis-aligned box in the collection's coordinate reference system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    /// Minimum corner.
    pub min: DVec3,
    /// Maximum corner.
    pub max: DVec3,
}

impl BoundingBox {
    /// Box spanning two corners.
    #[must_use]
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Box from `[xmin, ymin, zmin, xmax, ymax, zmax]`.
    #[must_use]
    pub fn from_array(v: [f64; 6]) -> Self {
        Self {
            min: DVec3::new(v[0], v[1], v[2]),
            max: DVec3::new(v[3], v[4], v[5]),
        }
    }

    /// `[xmin, ymin, zmin, xmax, ymax, zmax]`.
    #[must_use]
    pub fn to_array(&self) -> [f64; 6] {
        [
            self.min.x, self.min.y, self.min.z, self.max.x, self.max.y, self.max.z,
        ]
    }

    /// Extent along each axis.
    #[must_use]
    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// Horizontal footprint.
    #[must_use]
    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            Coord {
                x: self.min.x,
                y: self.min.y,
            },
            Coord {
                x: self.max.x,
                y: self.max.y,
            },
        )
    }

    /// Size of one grid cell at `level` along x and y.
    #[must_use]
    pub fn cell_size(&self, level: u32) -> (f64, f64) {
        let factor = f64::from(1u32 << level);
        let size = self.size();
        (size.x / factor, size.y / factor)
    }

    /// Corner `(x, y)` of the `2^level` grid over this box, as horizontal
    /// coordinates. Grid lines are always computed this way so that adjacent
    /// cells share bit-identical edges.
    #[must_use]
    pub fn grid_point(&self, level: u32, x: i64, y: i64) -> (f64, f64) {
        let (dx, dy) = self.cell_size(level);
        (self.min.x + dx * x as f64, self.min.y + dy * y as f64)
    }

    /// The cell `(x, y)` of the `2^level` grid over this box. The z range is kept.
    ///
    /// Coordinates outside the grid extrapolate beyond the box.
    #[must_use]
    pub fn cell(&self, level: u32, x: i64, y: i64) -> BoundingBox {
        let (min_x, min_y) = self.grid_point(level, x, y);
        let (max_x, max_y) = self.grid_point(level, x + 1, y + 1);
        BoundingBox {
            min: DVec3::new(min_x, min_y, self.min.z),
            max: DVec3::new(max_x, max_y, self.max.z),
        }
    }

    /// Bounding box of a tile within this root extent.
    #[must_use]
    pub fn tile(&self, address: &TileAddress) -> BoundingBox {
        self.cell(
            address.level(),
            i64::from(address.x()),
            i64::from(address.y()),
        )
    }
}

/// Bounding box of `address` within the root extent `root`.
#[must_use]
pub fn compute_bbox(root: &BoundingBox, address: &TileAddress) -> BoundingBox {
    root.tile(address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::TileKind;

    fn tile(level: u32, x: u32, y: u32) -> TileAddress {
        TileAddress::new("c", TileKind::Content, level, x, y).unwrap()
    }

    #[test]
    fn test_tile_bbox() {
        let root = BoundingBox::from_array([0.0, 0.0, 0.0, 8.0, 8.0, 0.0]);
        let bbox = compute_bbox(&root, &tile(2, 1, 2));
        assert_eq!(bbox.to_array(), [2.0, 4.0, 0.0, 4.0, 6.0, 0.0]);
    }

    #[test]
    fn test_root_tile_is_root_extent() {
        let root = BoundingBox::from_array([7.0, 50.0, -10.0, 8.0, 51.0, 300.0]);
        assert_eq!(compute_bbox(&root, &tile(0, 0, 0)), root);
    }

    #[test]
    fn test_tiles_partition_extent() {
        let root = BoundingBox::from_array([-3.0, 10.0, 0.0, 5.0, 14.0, 20.0]);
        let level = 3;
        let area: f64 = (0..8)
            .flat_map(|x| (0..8).map(move |y| (x, y)))
            .map(|(x, y)| {
                let b = compute_bbox(&root, &tile(level, x, y));
                assert_eq!(b.min.z, 0.0);
                assert_eq!(b.max.z, 20.0);
                let s = b.size();
                s.x * s.y
            })
            .sum();
        assert!((area - 32.0).abs() < 1e-9);
        let last = compute_bbox(&root, &tile(level, 7, 7));
        assert!((last.max.x - 5.0).abs() < 1e-12);
        assert!((last.max.y - 14.0).abs() < 1e-12);
    }

    #[test]
    fn test_center_and_rect() {
        let b = BoundingBox::from_array([0.0, 0.0, 0.0, 2.0, 4.0, 6.0]);
        assert_eq!(b.center(), DVec3::new(1.0, 2.0, 3.0));
        let rect = b.to_rect();
        assert_eq!(rect.min(), Coord { x: 0.0, y: 0.0 });
        assert_eq!(rect.max(), Coord { x: 2.0, y: 4.0 });
    }
}
