//! Conversions between `geo_types` geometries and the geometry model of this crate.

use crate::error::TypesError;
use crate::geometry::{
    Geometry, GeometryCollection, LineString, LinearRing, MultiLineString, MultiPoint,
    MultiPolygon, Point, Polygon,
};
use crate::Coordinate;

impl From<geo_types::Coord<f64>> for Coordinate {
    fn from(value: geo_types::Coord<f64>) -> Self {
        Coordinate::new(value.x, value.y)
    }
}

impl From<Coordinate> for geo_types::Coord<f64> {
    fn from(value: Coordinate) -> Self {
        geo_types::Coord {
            x: value.x,
            y: value.y,
        }
    }
}

fn coords_from(line: &geo_types::LineString<f64>) -> Vec<Coordinate> {
    line.0.iter().map(|c| Coordinate::from(*c)).collect()
}

fn coords_into(coords: &[Coordinate]) -> geo_types::LineString<f64> {
    geo_types::LineString(coords.iter().map(|c| (*c).into()).collect())
}

impl From<&geo_types::Polygon<f64>> for Polygon {
    fn from(value: &geo_types::Polygon<f64>) -> Self {
        Polygon::new(
            LinearRing::new(coords_from(value.exterior())),
            value
                .interiors()
                .iter()
                .map(|ring| LinearRing::new(coords_from(ring)))
                .collect(),
        )
    }
}

impl From<&Polygon> for geo_types::Polygon<f64> {
    fn from(value: &Polygon) -> Self {
        geo_types::Polygon::new(
            coords_into(value.exterior().coords()),
            value
                .interiors()
                .iter()
                .map(|ring| coords_into(ring.coords()))
                .collect(),
        )
    }
}

impl From<geo_types::Geometry<f64>> for Geometry {
    fn from(value: geo_types::Geometry<f64>) -> Self {
        match value {
            geo_types::Geometry::Point(p) => Point::new(p.0.into()).into(),
            geo_types::Geometry::Line(l) => {
                LineString::new(vec![l.start.into(), l.end.into()]).into()
            }
            geo_types::Geometry::LineString(l) => LineString::new(coords_from(&l)).into(),
            geo_types::Geometry::Polygon(p) => Polygon::from(&p).into(),
            geo_types::Geometry::MultiPoint(mp) => {
                MultiPoint::new(mp.0.iter().map(|p| Point::new(p.0.into())).collect()).into()
            }
            geo_types::Geometry::MultiLineString(ml) => MultiLineString::new(
                ml.0.iter().map(|l| LineString::new(coords_from(l))).collect(),
            )
            .into(),
            geo_types::Geometry::MultiPolygon(mp) => {
                MultiPolygon::new(mp.0.iter().map(Polygon::from).collect()).into()
            }
            geo_types::Geometry::GeometryCollection(gc) => {
                GeometryCollection::new(gc.0.into_iter().map(Geometry::from).collect()).into()
            }
            geo_types::Geometry::Rect(r) => Polygon::from(&r.to_polygon()).into(),
            geo_types::Geometry::Triangle(t) => Polygon::from(&t.to_polygon()).into(),
        }
    }
}

impl TryFrom<&Geometry> for geo_types::Geometry<f64> {
    type Error = TypesError;

    fn try_from(value: &Geometry) -> Result<Self, Self::Error> {
        let point = |p: &Point| {
            p.coord()
                .map(|c| geo_types::Point((*c).into()))
                .ok_or_else(|| TypesError::Conversion("empty point".into()))
        };

        Ok(match value {
            Geometry::Point(p) => geo_types::Geometry::Point(point(p)?),
            Geometry::LineString(l) => geo_types::Geometry::LineString(coords_into(l.coords())),
            Geometry::LinearRing(r) => geo_types::Geometry::LineString(coords_into(r.coords())),
            Geometry::Polygon(p) => geo_types::Geometry::Polygon(p.into()),
            Geometry::MultiPoint(mp) => geo_types::Geometry::MultiPoint(geo_types::MultiPoint(
                mp.parts().iter().map(point).collect::<Result<_, _>>()?,
            )),
            Geometry::MultiLineString(ml) => {
                geo_types::Geometry::MultiLineString(geo_types::MultiLineString(
                    ml.parts().iter().map(|l| coords_into(l.coords())).collect(),
                ))
            }
            Geometry::MultiPolygon(mp) => geo_types::Geometry::MultiPolygon(
                geo_types::MultiPolygon(mp.parts().iter().map(Into::into).collect()),
            ),
            Geometry::GeometryCollection(gc) => {
                geo_types::Geometry::GeometryCollection(geo_types::GeometryCollection(
                    gc.parts()
                        .iter()
                        .map(geo_types::Geometry::try_from)
                        .collect::<Result<_, _>>()?,
                ))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use geo_types::{line_string, point, polygon};

    use super::*;

    #[test]
    fn polygon_from_geo_types() {
        let poly = polygon![
            exterior: [(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0), (x: 0.0, y: 10.0)],
            interiors: [[(x: 2.0, y: 2.0), (x: 4.0, y: 2.0), (x: 4.0, y: 4.0)]],
        ];
        let g = Geometry::from(geo_types::Geometry::Polygon(poly));
        assert_matches!(&g, Geometry::Polygon(p) if p.num_interior_rings() == 1);
        assert_eq!(g.area(), 98.0);
    }

    #[test]
    fn round_trip_line() {
        let line =
            geo_types::Geometry::LineString(line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)]);
        let g = Geometry::from(line.clone());
        let back = geo_types::Geometry::try_from(&g).expect("convert back");
        assert_eq!(back, line);
    }

    #[test]
    fn empty_point_cannot_be_converted() {
        let g = Geometry::from(Point::empty());
        assert_matches!(
            geo_types::Geometry::try_from(&g),
            Err(TypesError::Conversion(_))
        );
        let p = geo_types::Geometry::Point(point!(x: 1.0, y: 2.0));
        assert_eq!(
            Geometry::from(p),
            Geometry::from(Point::new(Coordinate::new(1.0, 2.0)))
        );
    }
}
