//! Feature query descriptors handed to the feature store.

use std::fmt;

use geo::{Intersects, Polygon, Rect};

/// Row cap of a tile content query.
pub const MAX_FEATURES_PER_TILE: usize = 20_000;

/// Coordinate reference system of query results: WGS 84 longitude,
/// latitude and ellipsoidal height.
pub const CRS84H: &str = "http://www.opengis.net/def/crs/OGC/0/CRS84h";

/// A spatial literal in a filter.
#[derive(Clone, Debug, PartialEq)]
pub enum SpatialLiteral {
    /// Axis-aligned envelope.
    Envelope(Rect<f64>),
    /// Polygon.
    Polygon(Polygon<f64>),
}

impl fmt::Display for SpatialLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpatialLiteral::Envelope(rect) => write!(
                f,
                "BBOX({},{},{},{})",
                rect.min().x,
                rect.min().y,
                rect.max().x,
                rect.max().y
            ),
            SpatialLiteral::Polygon(polygon) => {
                f.write_str("POLYGON(")?;
                for (i, ring) in std::iter::once(polygon.exterior())
                    .chain(polygon.interiors())
                    .enumerate()
                {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    f.write_str("(")?;
                    for (j, c) in ring.coords().enumerate() {
                        if j > 0 {
                            f.write_str(",")?;
                        }
                        write!(f, "{} {}", c.x, c.y)?;
                    }
                    f.write_str(")")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// A filter expression, rendered as CQL2 text.
#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    /// Constant.
    Literal(bool),
    /// The geometry property intersects the literal.
    Intersects {
        /// Queryable holding the geometry.
        property: String,
        /// Geometry to test against.
        geometry: SpatialLiteral,
    },
    /// Negation.
    Not(Box<Filter>),
    /// Conjunction.
    And(Vec<Filter>),
    /// Opaque CQL2 text, e.g. a configured content filter.
    Text(String),
}

impl Filter {
    /// `S_INTERSECTS(property, geometry)`.
    #[must_use]
    pub fn intersects(property: impl Into<String>, geometry: SpatialLiteral) -> Self {
        Filter::Intersects {
            property: property.into(),
            geometry,
        }
    }

    /// Negate this filter.
    #[must_use]
    pub fn negate(self) -> Self {
        Filter::Not(Box::new(self))
    }

    /// Conjunction of `self` and `other`, flattening nested conjunctions.
    #[must_use]
    pub fn and(self, other: Filter) -> Self {
        let mut operands = match self {
            Filter::And(operands) => operands,
            f => vec![f],
        };
        match other {
            Filter::And(more) => operands.extend(more),
            f => operands.push(f),
        }
        Filter::And(operands)
    }

    /// CQL2 text encoding.
    #[must_use]
    pub fn to_cql2(&self) -> String {
        self.to_string()
    }

    /// Evaluate the spatial parts of the filter against one geometry.
    ///
    /// Every `Intersects` node is tested against `geometry` regardless of its
    /// property name. Returns `None` if the filter contains opaque text.
    pub fn matches<G>(&self, geometry: &G) -> Option<bool>
    where
        G: Intersects<Rect<f64>> + Intersects<Polygon<f64>>,
    {
        match self {
            Filter::Literal(value) => Some(*value),
            Filter::Intersects {
                geometry: SpatialLiteral::Envelope(rect),
                ..
            } => Some(geometry.intersects(rect)),
            Filter::Intersects {
                geometry: SpatialLiteral::Polygon(polygon),
                ..
            } => Some(geometry.intersects(polygon)),
            Filter::Not(inner) => inner.matches(geometry).map(|v| !v),
            Filter::And(operands) => {
                let mut result = true;
                for operand in operands {
                    result &= operand.matches(geometry)?;
                }
                Some(result)
            }
            Filter::Text(_) => None,
        }
    }

    fn needs_parens(&self) -> bool {
        matches!(self, Filter::And(_) | Filter::Text(_))
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Literal(true) => f.write_str("TRUE"),
            Filter::Literal(false) => f.write_str("FALSE"),
            Filter::Intersects { property, geometry } => {
                write!(f, "S_INTERSECTS({property},{geometry})")
            }
            Filter::Not(inner) => write!(f, "NOT ({inner})"),
            Filter::And(operands) => {
                for (i, operand) in operands.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" AND ")?;
                    }
                    if operand.needs_parens() {
                        write!(f, "({operand})")?;
                    } else {
                        write!(f, "{operand}")?;
                    }
                }
                Ok(())
            }
            Filter::Text(text) => f.write_str(text),
        }
    }
}

/// A request for the features of one tile.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureQuery {
    /// Feature type to query.
    pub feature_type: String,
    /// Coordinate reference system of the returned geometries.
    pub crs: String,
    /// Maximum number of features returned.
    pub limit: usize,
    /// Selection.
    pub filter: Filter,
}

impl FeatureQuery {
    /// Query for `feature_type` with the default CRS and row cap.
    #[must_use]
    pub fn new(feature_type: impl Into<String>, filter: Filter) -> Self {
        Self {
            feature_type: feature_type.into(),
            crs: CRS84H.to_string(),
            limit: MAX_FEATURES_PER_TILE,
            filter,
        }
    }
}

/// Spatial selection of a tile: its box minus the exclusion region.
///
/// Without a primary geometry nothing can be selected spatially and the
/// filter is the literal `false`.
#[must_use]
pub fn spatial_filter(
    primary_geometry: Option<&str>,
    bbox: Rect<f64>,
    exclusion: Option<Polygon<f64>>,
) -> Filter {
    let Some(property) = primary_geometry else {
        return Filter::Literal(false);
    };
    let within = Filter::intersects(property, SpatialLiteral::Envelope(bbox));
    match exclusion {
        Some(polygon) => within.and(
            Filter::intersects(property, SpatialLiteral::Polygon(polygon)).negate(),
        ),
        None => within,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Coord, Point};

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Rect<f64> {
        Rect::new(Coord { x: x0, y: y0 }, Coord { x: x1, y: y1 })
    }

    #[test]
    fn test_bbox_only() {
        let filter = spatial_filter(Some("geom"), rect(0.0, 0.0, 2.0, 1.5), None);
        assert_eq!(filter.to_cql2(), "S_INTERSECTS(geom,BBOX(0,0,2,1.5))");
        assert_eq!(filter.matches(&Point::new(1.0, 1.0)), Some(true));
        assert_eq!(filter.matches(&Point::new(3.0, 1.0)), Some(false));
    }

    #[test]
    fn test_bbox_minus_exclusion() {
        let exclusion = rect(0.0, 1.0, 1.0, 2.0).to_polygon();
        let filter = spatial_filter(Some("geom"), rect(0.0, 0.0, 1.0, 1.0), Some(exclusion));
        assert_eq!(
            filter.to_cql2(),
            "S_INTERSECTS(geom,BBOX(0,0,1,1)) AND NOT (S_INTERSECTS(geom,POLYGON((1 1,1 2,0 2,0 1,1 1))))"
        );
        assert_eq!(filter.matches(&Point::new(0.5, 0.5)), Some(true));
        // On the shared border: left to the northern tile.
        assert_eq!(filter.matches(&Point::new(0.5, 1.0)), Some(false));
    }

    #[test]
    fn test_without_primary_geometry_selects_nothing() {
        let filter = spatial_filter(None, rect(0.0, 0.0, 1.0, 1.0), None);
        assert_eq!(filter, Filter::Literal(false));
        assert_eq!(filter.to_cql2(), "FALSE");
        assert_eq!(filter.matches(&Point::new(0.5, 0.5)), Some(false));
    }

    #[test]
    fn test_and_flattens_and_parenthesizes_text() {
        let filter = Filter::Literal(true)
            .and(Filter::Text("height > 10 OR roof = 'flat'".to_string()))
            .and(Filter::Literal(true));
        let Filter::And(operands) = &filter else {
            panic!("expected a conjunction");
        };
        assert_eq!(operands.len(), 3);
        assert_eq!(
            filter.to_cql2(),
            "TRUE AND (height > 10 OR roof = 'flat') AND TRUE"
        );
        assert_eq!(filter.matches(&Point::new(0.0, 0.0)), None);
    }

    #[test]
    fn test_feature_query_defaults() {
        let query = FeatureQuery::new("building", Filter::Literal(true));
        assert_eq!(query.limit, 20_000);
        assert!(query.crs.ends_with("CRS84h"));
    }
}
