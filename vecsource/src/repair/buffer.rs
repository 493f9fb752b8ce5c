//! Buffer de distance nulle
//!
//! Équivalent d'un `buffer(0)` GEOS: les surfaces sont auto-unies, ce qui
//! supprime les auto-intersections (un nœud papillon devient deux
//! triangles). Les géométries sans surface donnent un polygone vide.

use geo::{BooleanOps, Geometry, LineString, MultiPolygon, Polygon};

/// Applique un buffer de distance nulle
///
/// Résultat: `Polygon` si une seule partie, `MultiPolygon` sinon, polygone
/// vide si aucune surface.
pub fn buffer_zero(geometry: &Geometry<f64>) -> Geometry<f64> {
    let mut parts = Vec::new();
    collect_polygons(geometry, &mut parts);

    let merged = parts
        .into_iter()
        .filter(|p| p.exterior().0.len() >= 4)
        .fold(MultiPolygon::new(Vec::new()), |acc, polygon| {
            acc.union(&MultiPolygon::new(vec![polygon]))
        });

    let mut polygons = merged.0;
    match polygons.len() {
        0 => Geometry::Polygon(empty_polygon()),
        1 => Geometry::Polygon(polygons.remove(0)),
        _ => Geometry::MultiPolygon(MultiPolygon::new(polygons)),
    }
}

pub fn empty_polygon() -> Polygon<f64> {
    Polygon::new(LineString::new(Vec::new()), Vec::new())
}

fn collect_polygons(geometry: &Geometry<f64>, out: &mut Vec<Polygon<f64>>) {
    match geometry {
        Geometry::Polygon(p) => out.push(p.clone()),
        Geometry::MultiPolygon(mp) => out.extend(mp.0.iter().cloned()),
        Geometry::Rect(r) => out.push(r.to_polygon()),
        Geometry::Triangle(t) => out.push(t.to_polygon()),
        Geometry::GeometryCollection(gc) => {
            gc.0.iter().for_each(|g| collect_polygons(g, out));
        }
        Geometry::Point(_)
        | Geometry::MultiPoint(_)
        | Geometry::Line(_)
        | Geometry::LineString(_)
        | Geometry::MultiLineString(_) => {}
    }
}
