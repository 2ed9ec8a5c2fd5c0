use anyhow::{Result, bail};
use geo::{Coord, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};
use shapefile::{PolygonRing, Shape};

/// Convert a shapefile shape (2D, M or Z) to a planar geo geometry.
/// M and Z values are dropped. Null shapes and multipatches are rejected.
pub(crate) fn shape_to_geometry(shape: Shape) -> Result<Geometry<f64>> {
    Ok(match shape {
        Shape::Point(p) => Geometry::Point(Point::new(p.x, p.y)),
        Shape::PointM(p) => Geometry::Point(Point::new(p.x, p.y)),
        Shape::PointZ(p) => Geometry::Point(Point::new(p.x, p.y)),
        Shape::Multipoint(mp) => multipoint(mp.points(), |p| Coord { x: p.x, y: p.y }),
        Shape::MultipointM(mp) => multipoint(mp.points(), |p| Coord { x: p.x, y: p.y }),
        Shape::MultipointZ(mp) => multipoint(mp.points(), |p| Coord { x: p.x, y: p.y }),
        Shape::Polyline(pl) => polyline(pl.parts(), |p| Coord { x: p.x, y: p.y }),
        Shape::PolylineM(pl) => polyline(pl.parts(), |p| Coord { x: p.x, y: p.y }),
        Shape::PolylineZ(pl) => polyline(pl.parts(), |p| Coord { x: p.x, y: p.y }),
        Shape::Polygon(pg) => polygon(pg.rings(), |p| Coord { x: p.x, y: p.y }),
        Shape::PolygonM(pg) => polygon(pg.rings(), |p| Coord { x: p.x, y: p.y }),
        Shape::PolygonZ(pg) => polygon(pg.rings(), |p| Coord { x: p.x, y: p.y }),
        other => bail!("[geom::convert] unsupported shape type: {:?}", other.shapetype()),
    })
}

fn multipoint<P>(points: &[P], xy: impl Fn(&P) -> Coord<f64>) -> Geometry<f64> {
    Geometry::MultiPoint(MultiPoint(points.iter().map(|p| Point::from(xy(p))).collect()))
}

fn polyline<P>(parts: &[Vec<P>], xy: impl Fn(&P) -> Coord<f64>) -> Geometry<f64> {
    let mut lines: Vec<LineString<f64>> = parts.iter()
        .map(|part| LineString(part.iter().map(&xy).collect()))
        .collect();
    match lines.len() {
        1 => Geometry::LineString(lines.remove(0)),
        _ => Geometry::MultiLineString(MultiLineString(lines)),
    }
}

/// Group rings into polygons: each outer ring owns the inner rings that follow it
/// (shapefile ring order).
fn polygon<P>(rings: &[PolygonRing<P>], xy: impl Fn(&P) -> Coord<f64>) -> Geometry<f64> {
    /// Ensure first and last are the same for geo::LineString coords
    fn closed(mut coords: Vec<Coord<f64>>) -> LineString<f64> {
        if coords.first() != coords.last() {
            coords.push(coords[0]);
        }
        LineString(coords)
    }

    let mut polys: Vec<Polygon<f64>> = Vec::new();
    let mut current_exterior: Option<LineString<f64>> = None;
    let mut current_holes: Vec<LineString<f64>> = Vec::new();

    for ring in rings {
        let ls = closed(ring.points().iter().map(&xy).collect());
        match ring {
            PolygonRing::Outer(_) => {
                // flush previous polygon
                if let Some(ext) = current_exterior.replace(ls) {
                    polys.push(Polygon::new(ext, std::mem::take(&mut current_holes)));
                }
            }
            PolygonRing::Inner(_) => current_holes.push(ls),
        }
    }
    if let Some(ext) = current_exterior {
        polys.push(Polygon::new(ext, current_holes));
    }

    match polys.len() {
        1 => Geometry::Polygon(polys.remove(0)),
        _ => Geometry::MultiPolygon(MultiPolygon(polys)),
    }
}

/// Short geometry kind label, used for logging and inspection.
pub fn geometry_kind(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) | Geometry::MultiPoint(_) => "Point",
        Geometry::Line(_) | Geometry::LineString(_) | Geometry::MultiLineString(_) => "Line",
        Geometry::Polygon(_) | Geometry::MultiPolygon(_) | Geometry::Rect(_) | Geometry::Triangle(_) => "Polygon",
        Geometry::GeometryCollection(_) => "Collection",
    }
}

#[cfg(test)]
mod tests {
    use shapefile as shp;

    use super::*;

    fn pt(x: f64, y: f64) -> shp::Point { shp::Point { x, y } }

    #[test]
    fn point_converts() {
        assert_eq!(shape_to_geometry(Shape::Point(pt(1.0, 2.0))).unwrap(), Geometry::Point(Point::new(1.0, 2.0)));
    }

    #[test]
    fn single_part_polyline_is_linestring() {
        let line = shp::Polyline::new(vec![pt(0.0, 0.0), pt(1.0, 1.0)]);
        let geometry = shape_to_geometry(Shape::Polyline(line)).unwrap();
        assert!(matches!(geometry, Geometry::LineString(ref ls) if ls.0.len() == 2));
    }

    #[test]
    fn polygon_rings_group_holes_with_exterior() {
        let outer = vec![pt(0.0, 0.0), pt(0.0, 10.0), pt(10.0, 10.0), pt(10.0, 0.0), pt(0.0, 0.0)];
        let hole = vec![pt(2.0, 2.0), pt(4.0, 2.0), pt(4.0, 4.0), pt(2.0, 4.0), pt(2.0, 2.0)];
        let second = vec![pt(20.0, 20.0), pt(20.0, 21.0), pt(21.0, 21.0), pt(20.0, 20.0)];
        let shape = Shape::Polygon(shp::Polygon::with_rings(vec![
            PolygonRing::Outer(outer),
            PolygonRing::Inner(hole),
            PolygonRing::Outer(second),
        ]));

        let Geometry::MultiPolygon(mp) = shape_to_geometry(shape).unwrap() else { panic!("expected a multipolygon") };
        assert_eq!(mp.0.len(), 2);
        assert_eq!(mp.0[0].interiors().len(), 1);
        assert_eq!(mp.0[1].interiors().len(), 0);
    }

    #[test]
    fn null_shape_is_rejected() {
        assert!(shape_to_geometry(Shape::NullShape).is_err());
    }

    #[test]
    fn kinds() {
        assert_eq!(geometry_kind(&Geometry::Point(Point::new(0.0, 0.0))), "Point");
        assert_eq!(geometry_kind(&Geometry::LineString(LineString(vec![]))), "Line");
    }
}
