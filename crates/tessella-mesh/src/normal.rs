//! Polygon surface normals.

use glam::DVec3;

/// Unit normal of a ring.
///
/// Three positions use the cross product of the first two edges; longer rings
/// use Newell's method, which tolerates slightly non-planar input. Returns
/// `None` when the result has zero length.
#[must_use]
pub fn compute_normal(positions: &[DVec3]) -> Option<DVec3> {
    let raw = match positions {
        [a, b, c] => (*b - *a).cross(*c - *a),
        _ => newell(positions),
    };
    let length = raw.length();
    if length == 0.0 || !length.is_finite() {
        log::debug!("ring of {} positions has no defined normal", positions.len());
        return None;
    }
    Some(raw / length)
}

/// Newell's accumulator over all edges of a closed ring. Not normalized.
#[must_use]
pub fn newell(positions: &[DVec3]) -> DVec3 {
    let n = positions.len();
    (0..n).fold(DVec3::ZERO, |acc, i| {
        let cur = positions[i];
        let next = positions[(i + 1) % n];
        acc + DVec3::new(
            (cur.y - next.y) * (cur.z + next.z),
            (cur.z - next.z) * (cur.x + next.x),
            (cur.x - next.x) * (cur.y + next.y),
        )
    })
}
