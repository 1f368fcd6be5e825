//! Input geometry model: a closed sum type over the geometry kinds a feature
//! can carry. Only the polygonal variants produce triangles.

use glam::DVec3;

/// An ordered list of 3D positions. Stored open or closed; the mesher treats
/// it as closed either way.
pub type Ring = Vec<DVec3>;

/// Convert a flat `x, y, z, x, y, z, ...` coordinate list into positions.
///
/// Trailing values that do not form a full triple are ignored.
#[must_use]
pub fn positions_from_flat(coordinates: &[f64]) -> Ring {
    coordinates
        .chunks_exact(3)
        .map(|c| DVec3::new(c[0], c[1], c[2]))
        .collect()
}

/// A polygon with one exterior ring and zero or more holes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polygon {
    /// Outer boundary.
    pub exterior: Ring,
    /// Holes.
    pub interiors: Vec<Ring>,
}

impl Polygon {
    /// Polygon without holes.
    #[must_use]
    pub fn new(exterior: Ring) -> Self {
        Self {
            exterior,
            interiors: Vec::new(),
        }
    }

    /// Polygon with holes.
    #[must_use]
    pub fn with_holes(exterior: Ring, interiors: Vec<Ring>) -> Self {
        Self {
            exterior,
            interiors,
        }
    }

    /// Build a polygon from flat coordinate lists.
    #[must_use]
    pub fn from_flat(exterior: &[f64], interiors: &[&[f64]]) -> Self {
        Self {
            exterior: positions_from_flat(exterior),
            interiors: interiors.iter().map(|r| positions_from_flat(r)).collect(),
        }
    }

    /// All rings, exterior first.
    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        std::iter::once(&self.exterior).chain(self.interiors.iter())
    }

    /// Lowest z value over all rings, if the polygon has any position.
    #[must_use]
    pub fn min_z(&self) -> Option<f64> {
        self.rings()
            .flatten()
            .map(|p| p.z)
            .min_by(f64::total_cmp)
    }
}

/// Feature geometry.
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    /// A single position.
    Point(DVec3),
    /// An open polyline.
    LineString(Vec<DVec3>),
    /// A single polygon.
    Polygon(Polygon),
    /// A collection of independent polygons.
    MultiPolygon(Vec<Polygon>),
    /// A closed or open shell made of polygon patches (e.g. a building solid).
    PolyhedralSurface(Vec<Polygon>),
}

impl Geometry {
    /// The polygons this geometry contributes to a mesh.
    #[must_use]
    pub fn polygons(&self) -> &[Polygon] {
        match self {
            Geometry::Point(_) | Geometry::LineString(_) => &[],
            Geometry::Polygon(polygon) => std::slice::from_ref(polygon),
            Geometry::MultiPolygon(polygons) | Geometry::PolyhedralSurface(polygons) => polygons,
        }
    }

    /// Lowest z value of the geometry.
    #[must_use]
    pub fn min_z(&self) -> Option<f64> {
        match self {
            Geometry::Point(p) => Some(p.z),
            Geometry::LineString(line) => line.iter().map(|p| p.z).min_by(f64::total_cmp),
            Geometry::Polygon(_) | Geometry::MultiPolygon(_) | Geometry::PolyhedralSurface(_) => {
                self.polygons()
                    .iter()
                    .filter_map(Polygon::min_z)
                    .min_by(f64::total_cmp)
            }
        }
    }
}

/// A named feature handed in by the feature-query executor.
#[derive(Clone, Debug, PartialEq)]
pub struct Feature {
    /// Identifier used in log messages.
    pub name: String,
    /// Primary geometry.
    pub geometry: Geometry,
}

impl Feature {
    /// Create a feature.
    pub fn new(name: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            name: name.into(),
            geometry,
        }
    }
}
