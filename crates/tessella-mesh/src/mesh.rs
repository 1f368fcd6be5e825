//! Mesh buffers and the builder that folds polygons into them.

use std::sync::Arc;

use glam::{DVec2, DVec3};

use crate::error::PolygonSkip;
use crate::geometry::{Feature, Geometry, Polygon};
use crate::normal::compute_normal;
use crate::orientation::ensure_orientation;
use crate::plane::select_plane;
use crate::ring::{compact, is_coplanar};
use crate::transform::CoordinateTransform;
use crate::triangulate::Triangulator;

/// A triangle mesh in four flat buffers, ready for a binary scene encoder.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    /// Triangle corners, three per triangle.
    pub indices: Vec<u32>,
    /// Positions as `x, y, z` triples.
    pub vertices: Vec<f64>,
    /// Unit normals as `x, y, z` triples, one per vertex. Empty when normals
    /// were not requested.
    pub normals: Vec<f64>,
    /// Outline edges, two indices per edge. Empty when outlines were not requested.
    pub outline_indices: Vec<u32>,
}

impl Mesh {
    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// True if the mesh has no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Position of vertex `i`.
    #[must_use]
    pub fn position(&self, i: usize) -> DVec3 {
        DVec3::new(
            self.vertices[i * 3],
            self.vertices[i * 3 + 1],
            self.vertices[i * 3 + 2],
        )
    }

    /// Triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }
}

/// What to produce and how to place it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshOptions {
    /// Emit one normal per vertex. Polygons without a defined normal are skipped.
    pub with_normals: bool,
    /// Emit outline edges for every ring.
    pub with_outline: bool,
    /// Added to every emitted index.
    pub start_index: u32,
    /// Translate each feature vertically so its lowest point has z = 0.
    pub clamp_to_ellipsoid: bool,
}

impl Default for MeshOptions {
    fn default() -> Self {
        Self {
            with_normals: true,
            with_outline: false,
            start_index: 0,
            clamp_to_ellipsoid: false,
        }
    }
}

/// Counters collected while building a mesh.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MeshStats {
    /// Features handed to the builder.
    pub features: usize,
    /// Polygons that contributed triangles.
    pub polygons: usize,
    /// Polygons left out because of a geometry defect.
    pub polygons_skipped: usize,
    /// Degenerate holes dropped from otherwise valid polygons.
    pub holes_skipped: usize,
    /// Triangles emitted.
    pub triangles: usize,
}

impl MeshStats {
    /// Add another set of counters to this one.
    pub fn merge(&mut self, other: &MeshStats) {
        self.features += other.features;
        self.polygons += other.polygons;
        self.polygons_skipped += other.polygons_skipped;
        self.holes_skipped += other.holes_skipped;
        self.triangles += other.triangles;
    }
}

/// Accumulates polygons into a single [`Mesh`].
///
/// Polygons are appended one at a time; a polygon is either committed in full
/// or not at all. The builder is meant to be owned by a single task for the
/// duration of one mesh.
pub struct MeshBuilder {
    options: MeshOptions,
    triangulator: Triangulator,
    transform: Option<Arc<dyn CoordinateTransform>>,
    mesh: Mesh,
    stats: MeshStats,
}

impl MeshBuilder {
    /// Create an empty builder with the default triangulator.
    #[must_use]
    pub fn new(options: MeshOptions) -> Self {
        Self {
            options,
            triangulator: Triangulator::new(),
            transform: None,
            mesh: Mesh::default(),
            stats: MeshStats::default(),
        }
    }

    /// Apply `transform` to every ring before it is meshed.
    #[must_use]
    pub fn with_transform(mut self, transform: Arc<dyn CoordinateTransform>) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Use a custom triangulator.
    #[must_use]
    pub fn with_triangulator(mut self, triangulator: Triangulator) -> Self {
        self.triangulator = triangulator;
        self
    }

    /// Options in effect.
    #[must_use]
    pub fn options(&self) -> &MeshOptions {
        &self.options
    }

    /// Counters so far.
    #[must_use]
    pub fn stats(&self) -> &MeshStats {
        &self.stats
    }

    /// Mesh a single polygon.
    ///
    /// Returns the number of triangles added, or the reason the polygon was
    /// skipped. A skipped polygon leaves the mesh untouched.
    pub fn add_polygon(&mut self, polygon: &Polygon) -> Result<usize, PolygonSkip> {
        let z_shift = self.z_shift(polygon.min_z());
        self.add_one("polygon", 0, polygon, z_shift)
    }

    /// Mesh every polygon of a geometry. Defective polygons are logged and
    /// skipped. Returns the number of triangles added.
    pub fn add_geometry(&mut self, name: &str, geometry: &Geometry) -> usize {
        let polygons = match geometry {
            Geometry::Point(_) | Geometry::LineString(_) => {
                log::trace!("{name}: geometry has no surface, nothing to mesh");
                return 0;
            }
            Geometry::Polygon(_) | Geometry::MultiPolygon(_) | Geometry::PolyhedralSurface(_) => {
                geometry.polygons()
            }
        };

        let z_shift = self.z_shift(geometry.min_z());
        polygons
            .iter()
            .enumerate()
            .filter_map(|(i, polygon)| self.add_one(name, i, polygon, z_shift).ok())
            .sum()
    }

    /// Mesh a feature's geometry.
    pub fn add_feature(&mut self, feature: &Feature) -> usize {
        self.stats.features += 1;
        self.add_geometry(&feature.name, &feature.geometry)
    }

    /// Finish and return the mesh.
    #[must_use]
    pub fn build(self) -> Mesh {
        self.mesh
    }

    /// Finish and return the mesh with its counters.
    #[must_use]
    pub fn finish(self) -> (Mesh, MeshStats) {
        (self.mesh, self.stats)
    }

    fn z_shift(&self, min_z: Option<f64>) -> f64 {
        match min_z {
            Some(z) if self.options.clamp_to_ellipsoid => -z,
            _ => 0.0,
        }
    }

    fn add_one(
        &mut self,
        name: &str,
        index: usize,
        polygon: &Polygon,
        z_shift: f64,
    ) -> Result<usize, PolygonSkip> {
        match self.mesh_polygon(name, polygon, z_shift) {
            Ok((triangles, holes_skipped)) => {
                self.stats.polygons += 1;
                self.stats.triangles += triangles;
                self.stats.holes_skipped += holes_skipped;
                Ok(triangles)
            }
            Err(reason) => {
                self.stats.polygons_skipped += 1;
                log::debug!("{name}: skipping polygon {index}: {reason}");
                log::trace!("{name}: polygon {index} exterior {:?}", polygon.exterior);
                Err(reason)
            }
        }
    }

    /// Returns the triangles added and the holes dropped.
    fn mesh_polygon(
        &mut self,
        name: &str,
        polygon: &Polygon,
        z_shift: f64,
    ) -> Result<(usize, usize), PolygonSkip> {
        let exterior = compact(polygon.exterior.clone());
        if exterior.is_degenerate() {
            return Err(PolygonSkip::DegenerateExterior);
        }

        let mut rings = vec![exterior.positions];
        let mut holes_skipped = 0;
        for (i, hole) in polygon.interiors.iter().enumerate() {
            let compacted = compact(hole.clone());
            if compacted.is_degenerate() {
                log::debug!("{name}: skipping degenerate hole {i}");
                log::trace!("{name}: hole {i} positions {hole:?}");
                holes_skipped += 1;
                continue;
            }
            rings.push(compacted.positions);
        }

        for ring in &mut rings {
            if z_shift != 0.0 {
                for p in ring.iter_mut() {
                    p.z += z_shift;
                }
            }
            if let Some(transform) = &self.transform {
                transform.transform(ring);
            }
        }

        if !is_coplanar(&rings[0]) {
            log::trace!("exterior ring is not planar, meshing anyway");
        }

        let selection = select_plane(&rings[0]).ok_or(PolygonSkip::NoDominantPlane)?;

        let normal = if self.options.with_normals {
            Some(compute_normal(&rings[0]).ok_or(PolygonSkip::UndefinedNormal)?)
        } else {
            None
        };

        let vertex_count: usize = rings.iter().map(Vec::len).sum();
        let mut projected: Vec<DVec2> = Vec::with_capacity(vertex_count);
        let mut hole_starts = Vec::with_capacity(rings.len() - 1);
        for ring in &rings {
            if !projected.is_empty() {
                hole_starts.push(projected.len());
            }
            projected.extend(ring.iter().map(|&p| selection.plane.project(p)));
        }
        let flat: Vec<f64> = projected.iter().flat_map(|p| [p.x, p.y]).collect();

        let mut triangles = self.triangulator.triangulate(&flat, &hole_starts)?;
        ensure_orientation(&mut triangles, &projected, selection.ccw);

        let base = self.options.start_index + self.mesh.vertex_count() as u32;

        for ring in &rings {
            self.mesh
                .vertices
                .extend(ring.iter().flat_map(|p| [p.x, p.y, p.z]));
        }
        if let Some(n) = normal {
            for _ in 0..vertex_count {
                self.mesh.normals.extend_from_slice(&[n.x, n.y, n.z]);
            }
        }
        for triangle in &triangles {
            debug_assert!(triangle.iter().all(|&i| (i as usize) < vertex_count));
            self.mesh
                .indices
                .extend(triangle.iter().map(|&i| base + i));
        }
        if self.options.with_outline {
            let mut ring_start = base;
            for ring in &rings {
                let len = ring.len() as u32;
                if len > 2 {
                    for i in 0..len {
                        self.mesh
                            .outline_indices
                            .extend_from_slice(&[ring_start + i, ring_start + (i + 1) % len]);
                    }
                }
                ring_start += len;
            }
        }

        Ok((triangles.len(), holes_skipped))
    }
}
