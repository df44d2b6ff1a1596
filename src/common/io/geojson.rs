use anyhow::{Context, Result};
use geo::{Coord, Geometry, LineString, Polygon};
use serde_json::{json, Map, Value};

/// Position array `[x, y]` for a coordinate.
#[inline] fn position(c: &Coord<f64>) -> Vec<f64> { vec![c.x, c.y] }

/// Positions of a LineString (or ring).
fn line_positions(ls: &LineString<f64>) -> Vec<Vec<f64>> {
    ls.coords().map(position).collect()
}

/// Rings of a Polygon, exterior first.
fn polygon_rings(polygon: &Polygon<f64>) -> Vec<Vec<Vec<f64>>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors().iter())
        .map(line_positions)
        .collect()
}

/// Convert a geo geometry to a serde_json::Value representing a GeoJSON Geometry.
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
        Geometry::LineString(ls) => json!({ "type": "LineString", "coordinates": line_positions(ls) }),
        Geometry::MultiLineString(mls) => json!({
            "type": "MultiLineString",
            "coordinates": mls.0.iter().map(line_positions).collect::<Vec<_>>(),
        }),
        Geometry::Polygon(polygon) => json!({ "type": "Polygon", "coordinates": polygon_rings(polygon) }),
        Geometry::MultiPolygon(mp) => json!({
            "type": "MultiPolygon",
            "coordinates": mp.0.iter().map(polygon_rings).collect::<Vec<_>>(),
        }),
        Geometry::Rect(rect) => json!({ "type": "Polygon", "coordinates": polygon_rings(&rect.to_polygon()) }),
        Geometry::Triangle(triangle) => json!({ "type": "Polygon", "coordinates": polygon_rings(&triangle.to_polygon()) }),
        Geometry::GeometryCollection(collection) => json!({
            "type": "GeometryCollection",
            "geometries": collection.0.iter().map(geometry_to_geojson).collect::<Vec<_>>(),
        }),
    }
}

/// Build a GeoJSON FeatureCollection from (geometry, properties) pairs.
pub(crate) fn feature_collection<'a>(features: impl IntoIterator<Item = (&'a Geometry<f64>, Map<String, Value>)>) -> Value {
    let features: Vec<Value> = features.into_iter()
        .map(|(geometry, properties)| json!({
            "type": "Feature",
            "geometry": geometry_to_geojson(geometry),
            "properties": properties,
        }))
        .collect();

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

/// Serialize a GeoJSON value to text.
pub(crate) fn write_to_geojson_string(value: &Value) -> Result<String> {
    serde_json::to_string(value).context("Failed to serialize GeoJSON")
}
