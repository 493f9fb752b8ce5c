//! Suppression de l'ordonnée Z

use geojson::{Geometry, Position, Value};

/// Retourne la géométrie avec des positions 2D (x, y inchangés)
///
/// Les multi-géométries et collections sont traitées récursivement.
pub fn drop_z(value: &Value) -> Value {
    match value {
        Value::Point(p) => Value::Point(flat(p)),
        Value::MultiPoint(points) => Value::MultiPoint(points.iter().map(|p| flat(p)).collect()),
        Value::LineString(line) => Value::LineString(flat_line(line)),
        Value::MultiLineString(lines) => {
            Value::MultiLineString(lines.iter().map(|l| flat_line(l)).collect())
        }
        Value::Polygon(rings) => Value::Polygon(rings.iter().map(|r| flat_line(r)).collect()),
        Value::MultiPolygon(polygons) => Value::MultiPolygon(
            polygons
                .iter()
                .map(|rings| rings.iter().map(|r| flat_line(r)).collect())
                .collect(),
        ),
        Value::GeometryCollection(geometries) => Value::GeometryCollection(
            geometries
                .iter()
                .map(|g| Geometry::new(drop_z(&g.value)))
                .collect(),
        ),
    }
}

/// Vrai si au moins une position a plus de deux dimensions
pub fn has_z(value: &Value) -> bool {
    match value {
        Value::Point(p) => p.len() > 2,
        Value::MultiPoint(points) | Value::LineString(points) => points.iter().any(|p| p.len() > 2),
        Value::MultiLineString(lines) | Value::Polygon(lines) => {
            lines.iter().flatten().any(|p| p.len() > 2)
        }
        Value::MultiPolygon(polygons) => polygons.iter().flatten().flatten().any(|p| p.len() > 2),
        Value::GeometryCollection(geometries) => geometries.iter().any(|g| has_z(&g.value)),
    }
}

fn flat(position: &Position) -> Position {
    position.iter().take(2).copied().collect()
}

fn flat_line(line: &[Position]) -> Vec<Position> {
    line.iter().map(flat).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_z_keeps_xy_exactly() {
        let value = Value::Polygon(vec![vec![
            vec![72.123456789, 23.987654321, 105.5],
            vec![72.2, 23.9, 99.0],
            vec![72.3, 23.95, 101.0],
            vec![72.123456789, 23.987654321, 105.5],
        ]]);
        assert!(has_z(&value));

        let flat = drop_z(&value);
        assert!(!has_z(&flat));
        let Value::Polygon(rings) = flat else {
            panic!("Expected Polygon");
        };
        assert_eq!(rings[0][0], vec![72.123456789, 23.987654321]);
        assert_eq!(rings[0][2], vec![72.3, 23.95]);
    }

    #[test]
    fn test_drop_z_nested_collections() {
        let value = Value::GeometryCollection(vec![
            Geometry::new(Value::Point(vec![1.0, 2.0, 3.0])),
            Geometry::new(Value::MultiPolygon(vec![vec![vec![
                vec![0.0, 0.0, 1.0],
                vec![1.0, 0.0, 1.0],
                vec![1.0, 1.0, 1.0],
                vec![0.0, 0.0, 1.0],
            ]]])),
        ]);

        let flat = drop_z(&value);
        assert!(!has_z(&flat));
        let Value::GeometryCollection(parts) = flat else {
            panic!("Expected GeometryCollection");
        };
        assert_eq!(parts[0].value, Value::Point(vec![1.0, 2.0]));
    }

    #[test]
    fn test_drop_z_on_2d_is_identity() {
        let value = Value::LineString(vec![vec![0.0, 0.0], vec![1.0, 1.0]]);
        assert_eq!(drop_z(&value), value);
    }
}
