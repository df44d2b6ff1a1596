use std::path::Path;

use anyhow::{Context, Result};
use geo::Centroid;
use tracing::{debug, warn};

use crate::{common, crs, layer::Layer};

impl Layer {
    /// Loads layer geometries, attributes and CRS from a given .shp file path.
    /// Records with a null or empty shape are dropped.
    pub fn from_shapefile(path: &Path) -> Result<Self> {
        let (shapes, records) = common::read_from_shapefile(path)?;
        let total = shapes.len();

        let mut geoms = Vec::with_capacity(total);
        let mut kept = Vec::with_capacity(total);
        for (shape, record) in shapes.into_iter().zip(records) {
            let geometry = common::shape_to_geometry(shape)
                .with_context(|| format!("Error converting shapes in shapefile: {}", path.display()))?;
            match geometry {
                Some(geometry) if geometry.centroid().is_some() => {
                    geoms.push(geometry);
                    kept.push(record);
                }
                _ => {}
            }
        }
        if geoms.len() < total {
            warn!(
                path = %path.display(),
                dropped = total - geoms.len(),
                "dropping records without a usable geometry"
            );
        }

        let data = common::records_to_dataframe(&kept)
            .with_context(|| format!("Error reading attributes in shapefile: {}", path.display()))?;
        let crs = crs::crs_from_shapefile(path)?;
        debug!(path = %path.display(), records = geoms.len(), crs = ?crs, "read shapefile");

        Layer::new(geoms, data, crs)
    }
}
