//! Winding normalization of triangulator output.

use glam::DVec2;

use crate::plane::triangle_signed_area;

/// Reverse the winding of every triangle whose signed area disagrees with `ccw`.
///
/// `projected` holds the 2D positions the triangles index into. Reversal
/// swaps the first and last corners. Triangles with zero area are left as is.
/// Returns the number of triangles flipped.
pub fn ensure_orientation(triangles: &mut [[u32; 3]], projected: &[DVec2], ccw: bool) -> usize {
    let mut flipped = 0;
    for triangle in triangles.iter_mut() {
        let [a, b, c] = triangle.map(|i| projected[i as usize]);
        let area = triangle_signed_area(a, b, c);
        if area != 0.0 && (area > 0.0) != ccw {
            triangle.swap(0, 2);
            flipped += 1;
        }
    }
    flipped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<DVec2> {
        vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(0.0, 1.0),
        ]
    }

    #[test]
    fn test_flips_clockwise_triangles_for_ccw_ring() {
        let mut triangles = [[0, 1, 2], [0, 3, 2]];
        let flipped = ensure_orientation(&mut triangles, &square(), true);
        assert_eq!(flipped, 1);
        assert_eq!(triangles, [[0, 1, 2], [2, 3, 0]]);
    }

    #[test]
    fn test_flips_ccw_triangles_for_cw_ring() {
        let mut triangles = [[0, 1, 2], [0, 3, 2]];
        let flipped = ensure_orientation(&mut triangles, &square(), false);
        assert_eq!(flipped, 1);
        assert_eq!(triangles, [[2, 1, 0], [0, 3, 2]]);
    }

    #[test]
    fn test_all_triangles_agree_after_normalization() {
        let points = square();
        let mut triangles = [[1, 0, 3], [3, 2, 1], [0, 2, 3]];
        ensure_orientation(&mut triangles, &points, true);
        for t in triangles {
            let area = triangle_signed_area(
                points[t[0] as usize],
                points[t[1] as usize],
                points[t[2] as usize],
            );
            assert!(area > 0.0);
        }
    }
}
