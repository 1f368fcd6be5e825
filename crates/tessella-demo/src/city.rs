//! Synthetic city: box-shaped buildings scattered over an extent.

use geo::{Coord, Rect};
use glam::DVec3;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use tessella_mesh::{Feature, Geometry, Polygon};
use tessella_tiling::BoundingBox;

/// A generated building and its horizontal footprint.
pub struct Building {
    pub feature: Feature,
    pub footprint: Rect<f64>,
}

/// Generate `count` buildings inside `extent`. Every `defect_every`-th building
/// also carries a collapsed roof patch that the mesher has to skip.
pub fn generate(extent: &BoundingBox, count: usize, defect_every: usize, seed: u64) -> Vec<Building> {
    let mut rng = Xoshiro256StarStar::seed_from_u64(seed);
    let size = extent.size();
    (0..count)
        .map(|i| {
            let w = size.x * rng.gen_range(0.0005..0.004);
            let h = size.y * rng.gen_range(0.0005..0.004);
            let x = extent.min.x + rng.gen_range(0.0..(size.x - w));
            let y = extent.min.y + rng.gen_range(0.0..(size.y - h));
            let base = rng.gen_range(80.0..320.0);
            let height = rng.gen_range(4.0..60.0);

            let mut patches = block(x, y, x + w, y + h, base, base + height);
            if defect_every > 0 && i % defect_every == 0 {
                let p = DVec3::new(x, y, base + height);
                patches.push(Polygon::new(vec![p, p, p, p]));
            }

            Building {
                feature: Feature::new(format!("building-{i}"), Geometry::PolyhedralSurface(patches)),
                footprint: Rect::new(Coord { x, y }, Coord { x: x + w, y: y + h }),
            }
        })
        .collect()
}

/// Closed box with outward-facing patches.
fn block(x0: f64, y0: f64, x1: f64, y1: f64, z0: f64, z1: f64) -> Vec<Polygon> {
    let p = DVec3::new;
    vec![
        // floor, facing down
        Polygon::new(vec![p(x0, y0, z0), p(x0, y1, z0), p(x1, y1, z0), p(x1, y0, z0)]),
        // roof, facing up
        Polygon::new(vec![p(x0, y0, z1), p(x1, y0, z1), p(x1, y1, z1), p(x0, y1, z1)]),
        // south
        Polygon::new(vec![p(x0, y0, z0), p(x1, y0, z0), p(x1, y0, z1), p(x0, y0, z1)]),
        // east
        Polygon::new(vec![p(x1, y0, z0), p(x1, y1, z0), p(x1, y1, z1), p(x1, y0, z1)]),
        // north
        Polygon::new(vec![p(x1, y1, z0), p(x0, y1, z0), p(x0, y1, z1), p(x1, y1, z1)]),
        // west
        Polygon::new(vec![p(x0, y1, z0), p(x0, y0, z0), p(x0, y0, z1), p(x0, y1, z1)]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessella_mesh::{MeshBuilder, MeshOptions};

    fn extent() -> BoundingBox {
        BoundingBox::from_array([7.0, 50.0, 0.0, 7.64, 50.32, 400.0])
    }

    #[test]
    fn test_buildings_inside_extent() {
        let extent = extent();
        for b in generate(&extent, 50, 0, 1) {
            assert!(b.footprint.min().x >= extent.min.x);
            assert!(b.footprint.max().x <= extent.max.x);
            assert!(b.footprint.min().y >= extent.min.y);
            assert!(b.footprint.max().y <= extent.max.y);
        }
    }

    #[test]
    fn test_block_meshes_to_twelve_triangles() {
        let buildings = generate(&extent(), 3, 2, 7);
        let mut builder = MeshBuilder::new(MeshOptions::default());
        for b in &buildings {
            builder.add_feature(&b.feature);
        }
        let (mesh, stats) = builder.finish();
        assert_eq!(stats.polygons, 18);
        // buildings 0 and 2 carry a collapsed patch
        assert_eq!(stats.polygons_skipped, 2);
        assert_eq!(mesh.triangle_count(), 36);
        assert_eq!(mesh.normals.len(), mesh.vertices.len());
    }
}
