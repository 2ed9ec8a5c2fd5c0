use geo::{Coord, Geometry, LineString, Polygon};
use serde_json::{Value, json};

/// Convert a geo geometry to a GeoJSON geometry object.
pub(crate) fn geometry_to_geojson(geometry: &Geometry<f64>) -> Value {
    match geometry {
        Geometry::Point(p) => json!({ "type": "Point", "coordinates": position(&p.0) }),
        Geometry::MultiPoint(mp) => json!({
            "type": "MultiPoint",
            "coordinates": mp.0.iter().map(|p| position(&p.0)).collect::<Vec<_>>(),
        }),
        Geometry::Line(line) => json!({
            "type": "LineString",
            "coordinates": [position(&line.start), position(&line.end)],
        }),
        Geometry::LineString(ls) => json!({ "type": "LineString", "coordinates": line_coords(ls) }),
        Geometry::MultiLineString(mls) => json!({
            "type": "MultiLineString",
            "coordinates": mls.0.iter().map(line_coords).collect::<Vec<_>>(),
        }),
        Geometry::Polygon(polygon) => json!({ "type": "Polygon", "coordinates": polygon_coords(polygon) }),
        Geometry::MultiPolygon(mp) => json!({
            "type": "MultiPolygon",
            "coordinates": mp.0.iter().map(polygon_coords).collect::<Vec<_>>(),
        }),
        Geometry::Rect(rect) => json!({ "type": "Polygon", "coordinates": polygon_coords(&rect.to_polygon()) }),
        Geometry::Triangle(tri) => json!({ "type": "Polygon", "coordinates": polygon_coords(&tri.to_polygon()) }),
        Geometry::GeometryCollection(gc) => json!({
            "type": "GeometryCollection",
            "geometries": gc.0.iter().map(geometry_to_geojson).collect::<Vec<_>>(),
        }),
    }
}

#[inline]
fn position(c: &Coord<f64>) -> [f64; 2] { [c.x, c.y] }

fn line_coords(ls: &LineString<f64>) -> Vec<[f64; 2]> {
    ls.coords().map(position).collect()
}

/// Rings in GeoJSON order: exterior first, then holes.
fn polygon_coords(polygon: &Polygon<f64>) -> Vec<Vec<[f64; 2]>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(line_coords)
        .collect()
}

#[cfg(test)]
mod tests {
    use geo::{LineString, Point};

    use super::*;

    #[test]
    fn point() {
        let value = geometry_to_geojson(&Geometry::Point(Point::new(85.0, 27.5)));
        assert_eq!(value, json!({ "type": "Point", "coordinates": [85.0, 27.5] }));
    }

    #[test]
    fn polygon_with_hole_lists_exterior_first() {
        let exterior = LineString::from(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 0.0)]);
        let hole = LineString::from(vec![(1.0, 1.0), (2.0, 1.0), (2.0, 2.0), (1.0, 1.0)]);
        let value = geometry_to_geojson(&Geometry::Polygon(Polygon::new(exterior, vec![hole])));

        assert_eq!(value["type"], "Polygon");
        let rings = value["coordinates"].as_array().unwrap();
        assert_eq!(rings.len(), 2);
        assert_eq!(rings[0][1], json!([10.0, 0.0]));
        assert_eq!(rings[1][0], json!([1.0, 1.0]));
    }
}
