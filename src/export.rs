use anyhow::{Context, Result};
use tracing::debug;

use crate::{common, crs::Crs, layer::Layer};

/// Number of sites exported unless configured otherwise.
pub const DEFAULT_TOP_N: usize = 5;

/// Serialize the first `n` records of a ranked layer as WGS84 GeoJSON.
pub fn export_top(layer: &Layer, n: usize) -> Result<String> {
    let top = layer.head(n)
        .to_crs(Crs::WGS84)
        .context("Failed to reproject ranked sites to WGS84")?;
    debug!(records = top.len(), "exporting top sites");

    common::write_to_geojson_string(&top.to_geojson()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{point, Geometry};
    use polars::{frame::DataFrame, prelude::{Column, NamedFrom}};
    use serde_json::Value;

    fn make_test_ranked(n: usize) -> Layer {
        let wgs84 = Layer::new(
            (0..n).map(|i| point!(x: 15.0 + i as f64 * 0.01, y: -10.0).into()).collect::<Vec<Geometry<f64>>>(),
            DataFrame::new(vec![
                Column::new("rank".into(), (0..n as i64).collect::<Vec<_>>()),
                Column::new("dist_police".into(), vec![None::<f64>; n]),
            ]).unwrap(),
            Some(Crs::WGS84),
        ).unwrap();
        wgs84.to_crs(Crs::UTM_33S).unwrap()
    }

    #[test]
    fn exports_first_n_in_wgs84() {
        let text = export_top(&make_test_ranked(8), DEFAULT_TOP_N).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["type"], "FeatureCollection");
        let features = value["features"].as_array().unwrap();
        assert_eq!(features.len(), 5);
        for (i, feature) in features.iter().enumerate() {
            assert_eq!(feature["properties"]["rank"], i as i64);
            assert_eq!(feature["properties"]["dist_police"], Value::Null);

            let coords = feature["geometry"]["coordinates"].as_array().unwrap();
            let (x, y) = (coords[0].as_f64().unwrap(), coords[1].as_f64().unwrap());
            assert!((x - (15.0 + i as f64 * 0.01)).abs() < 1e-6);
            assert!((y + 10.0).abs() < 1e-6);
        }
    }

    #[test]
    fn short_layers_export_everything() {
        let text = export_top(&make_test_ranked(3), DEFAULT_TOP_N).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["features"].as_array().unwrap().len(), 3);

        let empty = export_top(&make_test_ranked(0), DEFAULT_TOP_N).unwrap();
        let value: Value = serde_json::from_str(&empty).unwrap();
        assert!(value["features"].as_array().unwrap().is_empty());
    }
}
