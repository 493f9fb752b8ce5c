//! Conversion des valeurs GeoJSON en géométries `geo` (2D)

use geo::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon,
};
use geojson::{Position, Value};

/// Convertit une valeur GeoJSON en `geo::Geometry`
///
/// Seuls x et y sont conservés. Un polygone sans anneau donne un polygone
/// vide. Erreur si une position a moins de deux ordonnées.
pub fn to_geo(value: &Value) -> Result<Geometry<f64>, String> {
    let geometry = match value {
        Value::Point(p) => Geometry::Point(Point(coord(p)?)),
        Value::MultiPoint(points) => Geometry::MultiPoint(MultiPoint::new(
            points
                .iter()
                .map(|p| coord(p).map(Point))
                .collect::<Result<_, _>>()?,
        )),
        Value::LineString(line) => Geometry::LineString(line_string(line)?),
        Value::MultiLineString(lines) => Geometry::MultiLineString(MultiLineString::new(
            lines
                .iter()
                .map(|l| line_string(l))
                .collect::<Result<_, _>>()?,
        )),
        Value::Polygon(rings) => Geometry::Polygon(polygon(rings)?),
        Value::MultiPolygon(polygons) => Geometry::MultiPolygon(MultiPolygon::new(
            polygons
                .iter()
                .map(|rings| polygon(rings))
                .collect::<Result<_, _>>()?,
        )),
        Value::GeometryCollection(geometries) => {
            Geometry::GeometryCollection(GeometryCollection::new_from(
                geometries
                    .iter()
                    .map(|g| to_geo(&g.value))
                    .collect::<Result<_, _>>()?,
            ))
        }
    };

    Ok(geometry)
}

fn coord(position: &Position) -> Result<Coord<f64>, String> {
    match position.as_slice() {
        [x, y, ..] => Ok(Coord { x: *x, y: *y }),
        other => Err(format!(
            "position has {} ordinate(s), at least 2 required",
            other.len()
        )),
    }
}

fn line_string(line: &[Position]) -> Result<LineString<f64>, String> {
    line.iter()
        .map(coord)
        .collect::<Result<Vec<_>, _>>()
        .map(LineString::new)
}

fn polygon(rings: &[Vec<Position>]) -> Result<Polygon<f64>, String> {
    let Some((exterior, interiors)) = rings.split_first() else {
        return Ok(Polygon::new(LineString::new(Vec::new()), Vec::new()));
    };

    Ok(Polygon::new(
        line_string(exterior)?,
        interiors
            .iter()
            .map(|r| line_string(r))
            .collect::<Result<_, _>>()?,
    ))
}
