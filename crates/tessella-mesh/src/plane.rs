//! Dominant projection plane selection.
//!
//! A 3D ring is triangulated in 2D by dropping one coordinate. The plane with
//! the largest projected area keeps the ring least distorted; the sign of that
//! area gives the ring's orientation within the plane.

use glam::{DVec2, DVec3};

/// A coordinate plane, named by its (first, second) axes.
///
/// Each plane keeps the coordinate system right-handed: `XY` looks down +z,
/// `YZ` down +x, `ZX` down +y.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProjectionPlane {
    /// Drop z.
    XY,
    /// Drop x.
    YZ,
    /// Drop y.
    ZX,
}

impl ProjectionPlane {
    /// All planes in tie-break priority order.
    pub const ALL: [ProjectionPlane; 3] =
        [ProjectionPlane::XY, ProjectionPlane::YZ, ProjectionPlane::ZX];

    /// Indices of the two axes kept by this plane.
    #[must_use]
    pub fn axes(self) -> (usize, usize) {
        match self {
            ProjectionPlane::XY => (0, 1),
            ProjectionPlane::YZ => (1, 2),
            ProjectionPlane::ZX => (2, 0),
        }
    }

    /// Project a position onto this plane.
    #[inline]
    #[must_use]
    pub fn project(self, p: DVec3) -> DVec2 {
        let (a, b) = self.axes();
        DVec2::new(p[a], p[b])
    }
}

/// Signed area of a ring projected onto `plane` (shoelace formula).
///
/// Positive for counter-clockwise rings. The ring is treated as closed.
#[must_use]
pub fn signed_area(positions: &[DVec3], plane: ProjectionPlane) -> f64 {
    let n = positions.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f64 = (0..n)
        .map(|i| {
            let a = plane.project(positions[i]);
            let b = plane.project(positions[(i + 1) % n]);
            a.perp_dot(b)
        })
        .sum();
    twice / 2.0
}

/// Signed area of a 2D triangle. Positive for counter-clockwise winding.
#[inline]
#[must_use]
pub fn triangle_signed_area(a: DVec2, b: DVec2, c: DVec2) -> f64 {
    (b - a).perp_dot(c - a) / 2.0
}

/// The dominant plane of a ring and its orientation within it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaneSelection {
    /// Plane with the largest absolute projected area.
    pub plane: ProjectionPlane,
    /// Signed area in that plane.
    pub area: f64,
    /// True if the ring runs counter-clockwise in that plane.
    pub ccw: bool,
}

/// Select the dominant projection plane of a ring.
///
/// Ties go to the earlier plane in [`ProjectionPlane::ALL`]. Returns `None`
/// if the ring has no area in any plane.
#[must_use]
pub fn select_plane(positions: &[DVec3]) -> Option<PlaneSelection> {
    let mut best: Option<(ProjectionPlane, f64)> = None;
    for plane in ProjectionPlane::ALL {
        let area = signed_area(positions, plane);
        match best {
            Some((_, best_area)) if area.abs() <= best_area.abs() => {}
            _ => best = Some((plane, area)),
        }
    }
    let (plane, area) = best?;
    if area == 0.0 || !area.is_finite() {
        return None;
    }
    Some(PlaneSelection {
        plane,
        area,
        ccw: area > 0.0,
    })
}
