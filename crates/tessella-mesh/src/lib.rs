//! Polygon-to-mesh triangulation: ring cleanup, projection plane selection,
//! constrained triangulation with ear-clipping fallback, winding and normals,
//! and assembly of many polygons into one indexed mesh.

pub mod error;
pub mod geometry;
pub mod mesh;
pub mod normal;
pub mod orientation;
pub mod pipeline;
pub mod plane;
pub mod ring;
pub mod transform;
pub mod triangulate;

pub use error::{PolygonSkip, TriangulationError};
pub use geometry::{Feature, Geometry, Polygon, Ring, positions_from_flat};
pub use mesh::{Mesh, MeshBuilder, MeshOptions, MeshStats};
pub use normal::compute_normal;
pub use orientation::ensure_orientation;
pub use pipeline::{MeshingPipeline, MeshingResult, MeshingTask};
pub use plane::{PlaneSelection, ProjectionPlane, select_plane, signed_area};
pub use ring::{CompactRing, EPSILON, compact, is_coplanar, is_degenerate};
pub use transform::{CoordinateTransform, Translate};
pub use triangulate::{ConstrainedDelaunay, EarClipping, TriangulationStrategy, Triangulator};
