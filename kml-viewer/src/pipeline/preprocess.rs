//! Normalisation des géométries avant sélection
//!
//! Pour chaque enregistrement, dans l'ordre:
//! - suppression du Z (la reprojection est 2D, l'ordre est sans effet)
//! - reprojection vers `PLANAR_EPSG`
//! - buffer de distance nulle

use anyhow::Context;
use tracing::debug;
use vecsource::repair::{buffer_zero, drop_z, to_geo};
use vecsource::{LoadError, VectorDataset};

use super::{ProjectedDataset, ProjectedRecord, PLANAR_EPSG};
use crate::reproject_lite::SmartReprojector;
use crate::PipelineError;

/// Projette toutes les géométries du jeu de données dans le plan
pub fn preprocess(dataset: &VectorDataset) -> Result<ProjectedDataset, PipelineError> {
    let reprojector = SmartReprojector::new(dataset.source_epsg, PLANAR_EPSG)
        .context("Planar reprojector")
        .map_err(PipelineError::reprojection)?;

    debug!(
        source_epsg = dataset.source_epsg,
        target_epsg = PLANAR_EPSG,
        engine = reprojector.description(),
        records = dataset.len(),
        "Preprocessing dataset"
    );

    let records = dataset
        .records
        .iter()
        .enumerate()
        .map(|(index, record)| -> Result<ProjectedRecord, PipelineError> {
            let flat = drop_z(&record.geometry);
            let geometry =
                to_geo(&flat).map_err(|reason| LoadError::invalid_geometry(index, reason))?;
            let planar = reprojector
                .transform_geometry(&geometry)
                .with_context(|| format!("Record {}", index))
                .map_err(PipelineError::reprojection)?;

            Ok(ProjectedRecord {
                geometry: buffer_zero(&planar),
                attributes: record.attributes.clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ProjectedDataset {
        records,
        epsg: PLANAR_EPSG,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Area, Geometry};
    use geojson::Value;
    use vecsource::{AttributeValue, Attributes, Record, SourceFormat};

    fn dataset(records: Vec<Record>, source_epsg: u32) -> VectorDataset {
        VectorDataset {
            records,
            source_epsg,
            format: SourceFormat::GeoJson,
        }
    }

    fn square(x0: f64, y0: f64, size: f64, z: Option<f64>) -> Value {
        let ring = [(0.0, 0.0), (size, 0.0), (size, size), (0.0, size), (0.0, 0.0)]
            .iter()
            .map(|(dx, dy)| {
                let mut position = vec![x0 + dx, y0 + dy];
                position.extend(z);
                position
            })
            .collect();
        Value::Polygon(vec![ring])
    }

    #[test]
    fn test_planar_source_keeps_coordinates() {
        let mut attributes = Attributes::new();
        attributes.insert("id".into(), AttributeValue::Number(7.0));
        let input = dataset(
            vec![Record::new(
                square(1_050_000.0, 1_050_000.0, 100.0, Some(35.0)),
                attributes.clone(),
            )],
            PLANAR_EPSG,
        );

        let projected = preprocess(&input).unwrap();
        assert_eq!(projected.epsg, PLANAR_EPSG);
        assert_eq!(projected.records[0].attributes, attributes);

        let Geometry::Polygon(polygon) = &projected.records[0].geometry else {
            panic!("Expected Polygon");
        };
        assert!((polygon.unsigned_area() - 10_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_order_preserved_and_points_emptied() {
        let input = dataset(
            vec![
                Record::new(Value::Point(vec![72.5, 23.0, 12.0]), Attributes::new()),
                Record::new(square(72.5, 23.0, 0.001, None), Attributes::new()),
            ],
            4326,
        );

        let projected = preprocess(&input).unwrap();
        assert_eq!(projected.len(), 2);

        let Geometry::Polygon(point_buffer) = &projected.records[0].geometry else {
            panic!("Expected empty Polygon");
        };
        assert!(point_buffer.exterior().0.is_empty());

        let Geometry::Polygon(polygon) = &projected.records[1].geometry else {
            panic!("Expected Polygon");
        };
        // ~0.001° x 0.001° à 23°N ≈ 102 m x 111 m
        let area = polygon.unsigned_area();
        assert!(area > 10_000.0 && area < 12_500.0, "area={}", area);
    }

    #[test]
    fn test_unsupported_crs() {
        let input = dataset(
            vec![Record::new(square(0.0, 0.0, 1.0, None), Attributes::new())],
            2154,
        );

        #[cfg(not(feature = "reproject"))]
        assert!(matches!(
            preprocess(&input),
            Err(PipelineError::Reprojection(_))
        ));
        #[cfg(feature = "reproject")]
        assert!(preprocess(&input).is_ok());
    }

    #[test]
    fn test_short_position_is_a_load_error() {
        let input = dataset(
            vec![Record::new(
                Value::LineString(vec![vec![72.5, 23.0], vec![72.6]]),
                Attributes::new(),
            )],
            4326,
        );

        assert!(matches!(
            preprocess(&input),
            Err(PipelineError::Load(LoadError::InvalidGeometry { index: 0, .. }))
        ));
    }
}
