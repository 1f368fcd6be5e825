//! Hook for an external coordinate reference system transformation.

use glam::DVec3;

/// Transforms positions in place before they are projected and meshed.
///
/// Implementations wrap whatever CRS service the caller uses. The mesher calls
/// it once per ring that survived preprocessing.
pub trait CoordinateTransform: Send + Sync {
    /// Transform `positions` in place.
    fn transform(&self, positions: &mut [DVec3]);
}

/// Applies a fixed translation. Useful for moving geometry into a local frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Translate(pub DVec3);

impl CoordinateTransform for Translate {
    fn transform(&self, positions: &mut [DVec3]) {
        for p in positions {
            *p += self.0;
        }
    }
}

impl<F> CoordinateTransform for F
where
    F: Fn(&mut [DVec3]) + Send + Sync,
{
    fn transform(&self, positions: &mut [DVec3]) {
        self(positions);
    }
}
