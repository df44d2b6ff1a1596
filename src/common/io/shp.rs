use std::{collections::BTreeSet, path::Path};

use anyhow::{bail, Context, Result};
use geo::{Coord, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};
use polars::{frame::DataFrame, prelude::Column};
use shapefile::{dbase::{FieldValue, Record}, PolygonRing, Reader, Shape};

/// Reads all shapes + attribute records from a given `.shp` file path.
pub(crate) fn read_from_shapefile(path: &Path) -> Result<(Vec<Shape>, Vec<Record>)> {
    let mut reader = Reader::from_path(path)
        .with_context(|| format!("Failed to open shapefile: {}", path.display()))?;

    let count = reader.shape_count()?;
    let mut shapes = Vec::with_capacity(count);
    let mut records = Vec::with_capacity(count);
    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result
            .with_context(|| format!("Error reading shape+record in {}", path.display()))?;
        shapes.push(shape);
        records.push(record);
    }
    Ok((shapes, records))
}

/// Convert a shapefile ring list into a MultiPolygon.
/// Shapefile stores each outer ring followed by its holes.
fn rings_to_multipolygon<P>(rings: &[PolygonRing<P>], xy: impl Fn(&P) -> Coord<f64>) -> MultiPolygon<f64> {
    /// Ensure first and last are the same for geo::LineString coords
    fn ensure_closed(coords: &mut Vec<Coord<f64>>) {
        if let (Some(&first), Some(&last)) = (coords.first(), coords.last()) {
            if first != last { coords.push(first) }
        }
    }

    let mut polygons = Vec::new();
    let mut exterior: Option<LineString<f64>> = None;
    let mut holes = Vec::new();

    for ring in rings {
        let (points, is_exterior) = match ring {
            PolygonRing::Outer(points) => (points, true),
            PolygonRing::Inner(points) => (points, false),
        };
        let mut coords: Vec<Coord<f64>> = points.iter().map(&xy).collect();
        ensure_closed(&mut coords);

        if is_exterior {
            if let Some(previous) = exterior.take() {
                polygons.push(Polygon::new(previous, std::mem::take(&mut holes)));
            }
            exterior = Some(LineString(coords));
        } else {
            holes.push(LineString(coords));
        }
    }
    if let Some(last) = exterior {
        polygons.push(Polygon::new(last, holes));
    }

    MultiPolygon(polygons)
}

/// Convert polyline parts into a LineString (single part) or MultiLineString.
fn parts_to_lines<P>(parts: &[Vec<P>], xy: impl Fn(&P) -> Coord<f64>) -> Geometry<f64> {
    let mut lines: Vec<LineString<f64>> = parts.iter()
        .map(|part| LineString(part.iter().map(&xy).collect()))
        .collect();

    if lines.len() == 1 {
        Geometry::LineString(lines.remove(0))
    } else {
        Geometry::MultiLineString(MultiLineString(lines))
    }
}

/// Convert a shapefile shape into a planar geo geometry, dropping any Z/M values.
/// Null shapes yield `None`.
pub(crate) fn shape_to_geometry(shape: Shape) -> Result<Option<Geometry<f64>>> {
    /// Collapse a single-polygon MultiPolygon.
    fn polygonal(mut mp: MultiPolygon<f64>) -> Geometry<f64> {
        if mp.0.len() == 1 { Geometry::Polygon(mp.0.remove(0)) } else { Geometry::MultiPolygon(mp) }
    }

    let geometry = match shape {
        Shape::NullShape => return Ok(None),
        Shape::Point(p) => Geometry::Point(Point::new(p.x, p.y)),
        Shape::PointM(p) => Geometry::Point(Point::new(p.x, p.y)),
        Shape::PointZ(p) => Geometry::Point(Point::new(p.x, p.y)),
        Shape::Multipoint(mp) => Geometry::MultiPoint(MultiPoint(mp.points().iter().map(|p| Point::new(p.x, p.y)).collect())),
        Shape::MultipointM(mp) => Geometry::MultiPoint(MultiPoint(mp.points().iter().map(|p| Point::new(p.x, p.y)).collect())),
        Shape::MultipointZ(mp) => Geometry::MultiPoint(MultiPoint(mp.points().iter().map(|p| Point::new(p.x, p.y)).collect())),
        Shape::Polyline(line) => parts_to_lines(line.parts(), |p| Coord { x: p.x, y: p.y }),
        Shape::PolylineM(line) => parts_to_lines(line.parts(), |p| Coord { x: p.x, y: p.y }),
        Shape::PolylineZ(line) => parts_to_lines(line.parts(), |p| Coord { x: p.x, y: p.y }),
        Shape::Polygon(polygon) => polygonal(rings_to_multipolygon(polygon.rings(), |p| Coord { x: p.x, y: p.y })),
        Shape::PolygonM(polygon) => polygonal(rings_to_multipolygon(polygon.rings(), |p| Coord { x: p.x, y: p.y })),
        Shape::PolygonZ(polygon) => polygonal(rings_to_multipolygon(polygon.rings(), |p| Coord { x: p.x, y: p.y })),
        other => bail!("unsupported shape type in layer: {:?}", other.shapetype()),
    };

    Ok(Some(geometry))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Numeric,
    Logical,
    Text,
}

/// Numeric view of a dBase value; `None` if the field is not numeric-like.
fn numeric_value(value: &FieldValue) -> Option<Option<f64>> {
    match value {
        FieldValue::Numeric(n) => Some(*n),
        FieldValue::Float(f) => Some(f.map(f64::from)),
        FieldValue::Integer(i) => Some(Some(f64::from(*i))),
        FieldValue::Double(d) => Some(Some(*d)),
        FieldValue::Currency(c) => Some(Some(*c)),
        _ => None,
    }
}

/// Text view of a dBase value, `None` for nulls.
fn text_value(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Character(s) => s.as_ref().map(|s| s.trim().to_string()),
        FieldValue::Memo(s) => Some(s.clone()),
        FieldValue::Logical(b) => b.map(|b| b.to_string()),
        FieldValue::Date(d) => d.as_ref().map(|d| format!("{:04}-{:02}-{:02}", d.year(), d.month(), d.day())),
        other => match numeric_value(other) {
            Some(n) => n.map(|n| n.to_string()),
            None => Some(format!("{other:?}")),
        },
    }
}

/// Whether a dBase value is null (empty field).
fn is_null(value: &FieldValue) -> bool {
    matches!(value,
        FieldValue::Character(None) | FieldValue::Numeric(None) | FieldValue::Logical(None)
        | FieldValue::Date(None) | FieldValue::Float(None))
}

/// Convert attribute records to a DataFrame, one column per dBase field (ordered by name).
/// Numeric-like fields become Float64, logical fields Boolean, anything else String.
pub(crate) fn records_to_dataframe(records: &[Record]) -> Result<DataFrame> {
    let names: BTreeSet<String> = records.iter()
        .flat_map(|record| record.clone().into_iter().map(|(name, _)| name))
        .collect();

    let columns = names.iter().map(|name| {
        let values: Vec<Option<&FieldValue>> = records.iter().map(|record| record.get(name)).collect();

        let kind = values.iter().flatten()
            .filter(|value| !is_null(value))
            .try_fold(None, |kind: Option<FieldKind>, value| {
                let this = match value {
                    FieldValue::Logical(_) => FieldKind::Logical,
                    other if numeric_value(other).is_some() => FieldKind::Numeric,
                    _ => FieldKind::Text,
                };
                match kind {
                    Some(previous) if previous != this => Err(()),
                    _ => Ok(Some(this)),
                }
            })
            .map(|kind| kind.unwrap_or(FieldKind::Text))
            .unwrap_or(FieldKind::Text);

        match kind {
            FieldKind::Numeric => Column::new(
                name.as_str().into(),
                values.iter()
                    .map(|value| value.and_then(numeric_value).flatten())
                    .collect::<Vec<Option<f64>>>(),
            ),
            FieldKind::Logical => Column::new(
                name.as_str().into(),
                values.iter()
                    .map(|value| match value {
                        Some(FieldValue::Logical(b)) => *b,
                        _ => None,
                    })
                    .collect::<Vec<Option<bool>>>(),
            ),
            FieldKind::Text => Column::new(
                name.as_str().into(),
                values.iter()
                    .map(|value| value.and_then(text_value))
                    .collect::<Vec<Option<String>>>(),
            ),
        }
    }).collect::<Vec<_>>();

    Ok(DataFrame::new(columns)?)
}
