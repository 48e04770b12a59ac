use serde::{Deserialize, Serialize};

use crate::geometry::{Geometry, LineString, Point, Polygon};
use crate::Envelope;

/// A collection of points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultiPoint {
    points: Vec<Point>,
}

impl MultiPoint {
    /// Creates a new multipoint.
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Points of the collection.
    pub fn parts(&self) -> &[Point] {
        &self.points
    }

    pub(crate) fn parts_mut(&mut self) -> &mut Vec<Point> {
        &mut self.points
    }

    /// Consumes the collection and returns its points.
    pub fn into_parts(self) -> Vec<Point> {
        self.points
    }

    /// Whether there are no non-empty points in the collection.
    pub fn is_empty(&self) -> bool {
        self.points.iter().all(Point::is_empty)
    }

    /// Envelope of all points.
    pub fn envelope(&self) -> Envelope {
        self.points.iter().map(Point::envelope).collect()
    }
}

/// A collection of line strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultiLineString {
    lines: Vec<LineString>,
}

impl MultiLineString {
    /// Creates a new multi line string.
    pub fn new(lines: Vec<LineString>) -> Self {
        Self { lines }
    }

    /// Lines of the collection.
    pub fn parts(&self) -> &[LineString] {
        &self.lines
    }

    pub(crate) fn parts_mut(&mut self) -> &mut Vec<LineString> {
        &mut self.lines
    }

    /// Consumes the collection and returns its lines.
    pub fn into_parts(self) -> Vec<LineString> {
        self.lines
    }

    /// Whether there are no non-empty lines in the collection.
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(LineString::is_empty)
    }

    /// Envelope of all lines.
    pub fn envelope(&self) -> Envelope {
        self.lines.iter().map(LineString::envelope).collect()
    }

    /// Sum of the lengths of all lines.
    pub fn length(&self) -> f64 {
        self.lines.iter().map(LineString::length).sum()
    }
}

/// A collection of polygons.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultiPolygon {
    polygons: Vec<Polygon>,
}

impl MultiPolygon {
    /// Creates a new multipolygon.
    pub fn new(polygons: Vec<Polygon>) -> Self {
        Self { polygons }
    }

    /// Polygons of the collection.
    pub fn parts(&self) -> &[Polygon] {
        &self.polygons
    }

    pub(crate) fn parts_mut(&mut self) -> &mut Vec<Polygon> {
        &mut self.polygons
    }

    /// Consumes the collection and returns its polygons.
    pub fn into_parts(self) -> Vec<Polygon> {
        self.polygons
    }

    /// Whether there are no non-empty polygons in the collection.
    pub fn is_empty(&self) -> bool {
        self.polygons.iter().all(Polygon::is_empty)
    }

    /// Envelope of all polygons.
    pub fn envelope(&self) -> Envelope {
        self.polygons.iter().map(Polygon::envelope).collect()
    }

    /// Sum of the areas of all polygons.
    pub fn area(&self) -> f64 {
        self.polygons.iter().map(Polygon::area).sum()
    }

    /// Sum of the perimeters of all polygons.
    pub fn length(&self) -> f64 {
        self.polygons.iter().map(Polygon::length).sum()
    }
}

/// A heterogeneous collection of geometries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometryCollection {
    geometries: Vec<Geometry>,
}

impl GeometryCollection {
    /// Creates a new collection.
    pub fn new(geometries: Vec<Geometry>) -> Self {
        Self { geometries }
    }

    /// Members of the collection.
    pub fn parts(&self) -> &[Geometry] {
        &self.geometries
    }

    pub(crate) fn parts_mut(&mut self) -> &mut Vec<Geometry> {
        &mut self.geometries
    }

    /// Consumes the collection and returns its members.
    pub fn into_parts(self) -> Vec<Geometry> {
        self.geometries
    }

    /// Whether all members are empty.
    pub fn is_empty(&self) -> bool {
        self.geometries.iter().all(Geometry::is_empty)
    }

    /// Envelope of all members.
    pub fn envelope(&self) -> Envelope {
        self.geometries.iter().map(Geometry::envelope).collect()
    }
}
