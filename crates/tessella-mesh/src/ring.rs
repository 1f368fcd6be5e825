//! Ring preprocessing: duplicate removal and degeneracy detection.
//!
//! Rings arrive with the redundancies typical of real-world polygon data:
//! repeated consecutive positions, an explicit closing position, or no
//! effective area at all. Every ring passes through [`compact`] before it is
//! considered for triangulation.

use glam::DVec3;

/// Distance and collinearity tolerance.
pub const EPSILON: f64 = 1.0e-7;

/// A ring after duplicate removal.
#[derive(Clone, Debug, PartialEq)]
pub struct CompactRing {
    /// Positions with no two consecutive duplicates, stored open.
    pub positions: Vec<DVec3>,
    /// Number of consecutive duplicates removed.
    pub removed: usize,
    /// Whether a trailing closing position was dropped.
    pub was_closed: bool,
}

impl CompactRing {
    /// True if the ring has no effective area.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        is_degenerate(&self.positions)
    }
}

/// Remove positions that are exactly equal to their predecessor, in place.
///
/// Returns the number of positions removed.
pub fn remove_consecutive_duplicates(positions: &mut Vec<DVec3>) -> usize {
    let before = positions.len();
    positions.dedup();
    before - positions.len()
}

/// Compact a ring: remove consecutive duplicates and drop the closing position.
#[must_use]
pub fn compact(mut positions: Vec<DVec3>) -> CompactRing {
    let removed = remove_consecutive_duplicates(&mut positions);
    let was_closed = positions.len() > 1 && positions.first() == positions.last();
    if was_closed {
        positions.pop();
    }
    CompactRing {
        positions,
        removed,
        was_closed,
    }
}

/// Find two positions that span a plane together with the first position.
///
/// Returns `(k, n)` where `positions[k]` is the first position farther than
/// [`EPSILON`] from `positions[0]` and `positions[n]` the first after it that is
/// not collinear with both.
#[must_use]
pub fn find_third_point(positions: &[DVec3]) -> Option<(usize, usize)> {
    let origin = *positions.first()?;
    let k = positions
        .iter()
        .position(|p| p.distance(origin) > EPSILON)?;
    let n = (k + 1..positions.len())
        .find(|&n| !collinear(origin, positions[k], positions[n]))?;
    Some((k, n))
}

fn collinear(a: DVec3, b: DVec3, c: DVec3) -> bool {
    let ab = (b - a).normalize_or_zero();
    let ac = (c - a).normalize_or_zero();
    ab.cross(ac).length() < EPSILON
}

/// True if the ring cannot bound any area: fewer than three distinct
/// positions, or all positions collinear.
#[must_use]
pub fn is_degenerate(positions: &[DVec3]) -> bool {
    positions.len() < 3 || find_third_point(positions).is_none()
}

/// True if all positions lie on the plane through the first three
/// non-collinear positions.
#[must_use]
pub fn is_coplanar(positions: &[DVec3]) -> bool {
    if positions.len() < 4 {
        return true;
    }
    let Some((k, n)) = find_third_point(positions) else {
        return true;
    };
    let origin = positions[0];
    let normal = (positions[k] - origin).cross(positions[n] - origin);
    let d = normal.dot(origin);
    positions[3..]
        .iter()
        .all(|p| (normal.dot(*p) - d).abs() <= EPSILON)
}
