//! Error types for triangulation and mesh assembly.

use thiserror::Error;

/// A triangulation strategy could not produce triangles for a polygon.
///
/// Strategy failures are ordinary control flow: the [`Triangulator`](crate::Triangulator)
/// reacts to one by trying its fallback strategy.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TriangulationError {
    /// The underlying algorithm rejected the input.
    #[error("{strategy} triangulation failed: {reason}")]
    Failed {
        /// Strategy that failed.
        strategy: &'static str,
        /// Description of the failure.
        reason: String,
    },

    /// The algorithm introduced a vertex that is not one of the input positions,
    /// e.g. at a self-intersection.
    #[error("{strategy} triangulation introduced a vertex not present in the ring")]
    UnmappedVertex {
        /// Strategy that failed.
        strategy: &'static str,
    },

    /// The algorithm finished without any triangle.
    #[error("{strategy} triangulation produced no triangles")]
    Empty {
        /// Strategy that failed.
        strategy: &'static str,
    },
}

/// Reason a polygon was left out of a mesh.
///
/// These are geometry defects, not errors of the mesh build: the offending
/// polygon is logged and skipped, the rest of the mesh is unaffected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolygonSkip {
    /// The exterior ring has fewer than three distinct or only collinear positions.
    #[error("exterior ring has no effective area")]
    DegenerateExterior,

    /// The exterior ring has zero area in every coordinate plane.
    #[error("exterior ring has zero area in every coordinate plane")]
    NoDominantPlane,

    /// Normals were requested but the exterior ring normal has zero length.
    #[error("could not compute a normal for the exterior ring")]
    UndefinedNormal,

    /// Both triangulation strategies failed.
    #[error(transparent)]
    Triangulation(#[from] TriangulationError),
}
