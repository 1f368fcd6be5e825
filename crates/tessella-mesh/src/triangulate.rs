//! Polygon-with-holes triangulation.
//!
//! Two strategies are tried in order: a constrained Delaunay triangulation,
//! which gives well-shaped triangles but rejects self-intersecting or
//! numerically awkward rings, and ear clipping, which accepts almost anything.
//!
//! Both work on projected 2D coordinates laid out flat (`x0, y0, x1, y1, ...`)
//! with the exterior ring first and each hole starting at the vertex index
//! listed in `hole_starts`. The returned triangles index those vertices.

use geo::TriangulateSpade;
use geo::algorithm::triangulate_spade::SpadeTriangulationConfig;
use geo::{Coord, LineString};
use rustc_hash::FxHashMap;

use crate::error::TriangulationError;

/// Positions closer than this are merged by the Delaunay strategy.
const SNAP_RADIUS: f64 = 1.0e-10;

/// A way to turn a polygon with holes into triangles.
pub trait TriangulationStrategy: Send + Sync {
    /// Short name used in log messages and errors.
    fn name(&self) -> &'static str;

    /// Triangulate flat 2D coordinates with holes starting at `hole_starts`.
    fn triangulate(
        &self,
        coords: &[f64],
        hole_starts: &[usize],
    ) -> Result<Vec<[u32; 3]>, TriangulationError>;
}

/// Constrained Delaunay triangulation of the polygon with its holes.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConstrainedDelaunay;

impl ConstrainedDelaunay {
    const NAME: &'static str = "constrained delaunay";
}

/// Bit pattern key of a 2D coordinate; `+ 0.0` folds -0.0 into 0.0.
fn coord_key(x: f64, y: f64) -> (u64, u64) {
    ((x + 0.0).to_bits(), (y + 0.0).to_bits())
}

/// Vertex index ranges of the exterior ring and each hole.
fn ring_ranges(vertex_count: usize, hole_starts: &[usize]) -> Vec<std::ops::Range<usize>> {
    let starts = std::iter::once(0).chain(hole_starts.iter().copied());
    let ends = hole_starts
        .iter()
        .copied()
        .chain(std::iter::once(vertex_count));
    starts.zip(ends).map(|(s, e)| s..e).collect()
}

impl TriangulationStrategy for ConstrainedDelaunay {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn triangulate(
        &self,
        coords: &[f64],
        hole_starts: &[usize],
    ) -> Result<Vec<[u32; 3]>, TriangulationError> {
        let points: Vec<Coord<f64>> = coords
            .chunks_exact(2)
            .map(|c| Coord { x: c[0], y: c[1] })
            .collect();

        let mut rings = ring_ranges(points.len(), hole_starts)
            .into_iter()
            .map(|range| {
                points.get(range).map(|ring| LineString::from(ring.to_vec())).ok_or_else(|| {
                    TriangulationError::Failed {
                        strategy: Self::NAME,
                        reason: "hole start outside of the vertex buffer".to_string(),
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let exterior = rings.remove(0);
        let polygon = geo::Polygon::new(exterior, rings);

        let triangles = polygon
            .constrained_triangulation(SpadeTriangulationConfig {
                snap_radius: SNAP_RADIUS,
            })
            .map_err(|e| TriangulationError::Failed {
                strategy: Self::NAME,
                reason: format!("{e:?}"),
            })?;

        let mut lookup: FxHashMap<(u64, u64), u32> = FxHashMap::default();
        for (i, p) in points.iter().enumerate() {
            lookup.entry(coord_key(p.x, p.y)).or_insert(i as u32);
        }

        let mut result = Vec::with_capacity(triangles.len());
        for triangle in &triangles {
            let mut corners = [0u32; 3];
            for (corner, c) in corners.iter_mut().zip(triangle.to_array()) {
                *corner = *lookup
                    .get(&coord_key(c.x, c.y))
                    .ok_or(TriangulationError::UnmappedVertex {
                        strategy: Self::NAME,
                    })?;
            }
            result.push(corners);
        }

        if result.is_empty() {
            return Err(TriangulationError::Empty {
                strategy: Self::NAME,
            });
        }
        Ok(result)
    }
}

/// Ear clipping via `earcutr`.
#[derive(Clone, Copy, Debug, Default)]
pub struct EarClipping;

impl EarClipping {
    const NAME: &'static str = "ear clipping";
}

impl TriangulationStrategy for EarClipping {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn triangulate(
        &self,
        coords: &[f64],
        hole_starts: &[usize],
    ) -> Result<Vec<[u32; 3]>, TriangulationError> {
        let indices =
            earcutr::earcut(coords, hole_starts, 2).map_err(|e| TriangulationError::Failed {
                strategy: Self::NAME,
                reason: format!("{e:?}"),
            })?;

        let triangles: Vec<[u32; 3]> = indices
            .chunks_exact(3)
            .map(|t| [t[0] as u32, t[1] as u32, t[2] as u32])
            .collect();

        if triangles.is_empty() {
            return Err(TriangulationError::Empty {
                strategy: Self::NAME,
            });
        }
        Ok(triangles)
    }
}

/// Primary strategy with a fallback.
pub struct Triangulator {
    primary: Box<dyn TriangulationStrategy>,
    fallback: Box<dyn TriangulationStrategy>,
}

impl Default for Triangulator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Triangulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Triangulator")
            .field("primary", &self.primary.name())
            .field("fallback", &self.fallback.name())
            .finish()
    }
}

impl Triangulator {
    /// Constrained Delaunay first, ear clipping as fallback.
    #[must_use]
    pub fn new() -> Self {
        Self::with_strategies(Box::new(ConstrainedDelaunay), Box::new(EarClipping))
    }

    /// Use custom strategies.
    #[must_use]
    pub fn with_strategies(
        primary: Box<dyn TriangulationStrategy>,
        fallback: Box<dyn TriangulationStrategy>,
    ) -> Self {
        Self { primary, fallback }
    }

    /// Triangulate flat 2D coordinates with holes starting at `hole_starts`.
    ///
    /// A lone triangle is returned as is. Otherwise the primary strategy runs,
    /// and on any failure the fallback; the fallback's error is returned if it
    /// fails too.
    pub fn triangulate(
        &self,
        coords: &[f64],
        hole_starts: &[usize],
    ) -> Result<Vec<[u32; 3]>, TriangulationError> {
        let vertex_count = coords.len() / 2;
        if vertex_count < 3 {
            return Err(TriangulationError::Empty { strategy: "trivial" });
        }
        if vertex_count == 3 && hole_starts.is_empty() {
            return Ok(vec![[0, 1, 2]]);
        }

        match self.primary.triangulate(coords, hole_starts) {
            Ok(triangles) => Ok(triangles),
            Err(err) => {
                log::trace!("{err}, falling back to {}", self.fallback.name());
                self.fallback.triangulate(coords, hole_starts)
            }
        }
    }
}
