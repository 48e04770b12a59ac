use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::TypesError;
use crate::geometry::{
    Dimension, Geometry, GeometryCollection, GeometryType, LineString, LinearRing,
    MultiLineString, MultiPoint, MultiPolygon, Point, Polygon,
};
use crate::Coordinate;

/// Precision model of coordinates.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum PrecisionModel {
    /// Full double precision.
    #[default]
    Floating,
    /// Coordinates are rounded to a grid with the cell size of `1 / scale`.
    Fixed {
        /// Number of grid cells per unit.
        scale: f64,
    },
}

impl PrecisionModel {
    /// Rounds the value to the model precision.
    pub fn make_precise(&self, value: f64) -> f64 {
        match self {
            PrecisionModel::Floating => value,
            PrecisionModel::Fixed { scale } => (value * scale + 0.5).floor() / scale,
        }
    }

    /// Rounds the `x` and `y` ordinates of the coordinate in place.
    pub fn make_precise_coord(&self, coord: &mut Coordinate) {
        if let PrecisionModel::Fixed { .. } = self {
            coord.x = self.make_precise(coord.x);
            coord.y = self.make_precise(coord.y);
        }
    }

    /// Whether the model is floating.
    pub fn is_floating(&self) -> bool {
        matches!(self, PrecisionModel::Floating)
    }
}

/// How to deal with line parts that have too few points to form a valid line.
///
/// This is the one place where degenerate input can be accepted leniently, e.g. when reading
/// line parts from external files.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstantiationPolicy {
    /// Return an error.
    #[default]
    Error,
    /// Produce an empty line instead.
    Empty,
    /// Repair the part by repeating its single point.
    TryFix,
    /// Drop the part.
    Skip,
}

/// Creates geometries, applying the configured precision model to every created coordinate.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometryFactory {
    precision_model: PrecisionModel,
    srid: i32,
}

impl GeometryFactory {
    /// Creates a factory with the given precision model.
    pub fn new(precision_model: PrecisionModel) -> Self {
        Self {
            precision_model,
            srid: 0,
        }
    }

    /// Sets the spatial reference identifier carried by the factory.
    pub fn with_srid(mut self, srid: i32) -> Self {
        self.srid = srid;
        self
    }

    /// Precision model of the factory.
    pub fn precision_model(&self) -> PrecisionModel {
        self.precision_model
    }

    /// Spatial reference identifier.
    pub fn srid(&self) -> i32 {
        self.srid
    }

    fn precise(&self, mut coords: Vec<Coordinate>) -> Vec<Coordinate> {
        if !self.precision_model.is_floating() {
            for c in &mut coords {
                self.precision_model.make_precise_coord(c);
            }
        }
        coords
    }

    /// Creates a point. `None` creates an empty point.
    pub fn create_point(&self, coord: Option<Coordinate>) -> Point {
        match coord {
            Some(mut c) => {
                self.precision_model.make_precise_coord(&mut c);
                Point::new(c)
            }
            None => Point::empty(),
        }
    }

    /// Creates a line string with either zero or at least two points.
    pub fn create_line_string(&self, coords: Vec<Coordinate>) -> Result<LineString, TypesError> {
        LineString::try_new(self.precise(coords))
    }

    /// Creates a closed linear ring with either zero or at least four points.
    pub fn create_linear_ring(&self, coords: Vec<Coordinate>) -> Result<LinearRing, TypesError> {
        LinearRing::try_new(self.precise(coords))
    }

    /// Creates a polygon.
    pub fn create_polygon(&self, shell: LinearRing, holes: Vec<LinearRing>) -> Polygon {
        Polygon::new(shell, holes)
    }

    /// Creates a multipoint.
    pub fn create_multi_point(&self, points: Vec<Point>) -> MultiPoint {
        MultiPoint::new(points)
    }

    /// Creates a multi line string.
    pub fn create_multi_line_string(&self, lines: Vec<LineString>) -> MultiLineString {
        MultiLineString::new(lines)
    }

    /// Creates a multipolygon.
    pub fn create_multi_polygon(&self, polygons: Vec<Polygon>) -> MultiPolygon {
        MultiPolygon::new(polygons)
    }

    /// Creates a geometry collection.
    pub fn create_geometry_collection(&self, geometries: Vec<Geometry>) -> GeometryCollection {
        GeometryCollection::new(geometries)
    }

    /// Creates an empty geometry of the given dimension. `None` gives an empty collection.
    pub fn create_empty(&self, dimension: Option<Dimension>) -> Geometry {
        match dimension {
            Some(Dimension::Point) => Point::empty().into(),
            Some(Dimension::Line) => LineString::default().into(),
            Some(Dimension::Area) => Polygon::default().into(),
            None => GeometryCollection::default().into(),
        }
    }

    /// Builds the most specific geometry that can hold all the given geometries:
    ///
    /// * no geometries give an empty collection,
    /// * a single geometry is returned as is,
    /// * geometries of one basic type are combined into the matching multi geometry,
    /// * anything else becomes a geometry collection.
    pub fn build_geometry(&self, geometries: Vec<Geometry>) -> Geometry {
        let mut common_type = None;
        let mut is_heterogeneous = false;
        let mut has_collection = false;
        for g in &geometries {
            let geometry_type = match g.geometry_type() {
                GeometryType::LinearRing => GeometryType::LineString,
                other => other,
            };
            match common_type {
                None => common_type = Some(geometry_type),
                Some(t) if t != geometry_type => is_heterogeneous = true,
                _ => {}
            }
            if matches!(
                geometry_type,
                GeometryType::MultiPoint
                    | GeometryType::MultiLineString
                    | GeometryType::MultiPolygon
                    | GeometryType::GeometryCollection
            ) {
                has_collection = true;
            }
        }

        let Some(common_type) = common_type else {
            return GeometryCollection::default().into();
        };

        if is_heterogeneous || has_collection {
            return GeometryCollection::new(geometries).into();
        }

        if geometries.len() == 1 {
            if let Some(g) = geometries.into_iter().next() {
                return g;
            }
            return GeometryCollection::default().into();
        }

        match common_type {
            GeometryType::Point => MultiPoint::new(
                geometries
                    .into_iter()
                    .filter_map(|g| match g {
                        Geometry::Point(p) => Some(p),
                        _ => None,
                    })
                    .collect(),
            )
            .into(),
            GeometryType::LineString => MultiLineString::new(
                geometries
                    .into_iter()
                    .filter_map(|g| match g {
                        Geometry::LineString(l) => Some(l),
                        Geometry::LinearRing(r) => Some(r.into()),
                        _ => None,
                    })
                    .collect(),
            )
            .into(),
            GeometryType::Polygon => MultiPolygon::new(
                geometries
                    .into_iter()
                    .filter_map(|g| match g {
                        Geometry::Polygon(p) => Some(p),
                        _ => None,
                    })
                    .collect(),
            )
            .into(),
            _ => GeometryCollection::new(geometries).into(),
        }
    }

    /// Creates a line part from a coordinate list that may have a single point, handling the
    /// degenerate case according to the policy. Returns `Ok(None)` if the part is skipped.
    pub fn create_line_part(
        &self,
        mut coords: Vec<Coordinate>,
        policy: InstantiationPolicy,
    ) -> Result<Option<LineString>, TypesError> {
        if coords.len() != 1 {
            return self.create_line_string(coords).map(Some);
        }

        match policy {
            InstantiationPolicy::Error => Err(TypesError::TooFewPoints {
                kind: "line string",
                count: 1,
            }),
            InstantiationPolicy::Empty => {
                warn!("Line part with a single point replaced by an empty line");
                Ok(Some(LineString::default()))
            }
            InstantiationPolicy::TryFix => {
                warn!("Line part with a single point {} repaired", coords[0]);
                coords.push(coords[0]);
                self.create_line_string(coords).map(Some)
            }
            InstantiationPolicy::Skip => {
                warn!("Line part with a single point {} skipped", coords[0]);
                Ok(None)
            }
        }
    }
}
