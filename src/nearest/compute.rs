use anyhow::{ensure, Result};
use polars::prelude::Column;
use tracing::debug;

use crate::{crs::Crs, infra::Infrastructure, layer::Layer};

/// Add a `dist_<key>` column per infrastructure layer: the minimum distance (meters)
/// from each candidate's centroid to that layer. Empty layers give an all-null column.
pub fn compute_nearest(mut layer: Layer, infra: &Infrastructure) -> Result<Layer> {
    ensure!(
        layer.crs() == Some(Crs::UTM_33S),
        "nearest distances need candidates in {}, found {:?}",
        Crs::UTM_33S, layer.crs(),
    );

    let centroids = layer.centroids()?;

    for (key, infra_layer) in infra.iter() {
        let distances: Vec<Option<f64>> = if infra_layer.is_empty() {
            debug!(%key, "infrastructure layer is empty, distances left undefined");
            vec![None; centroids.len()]
        } else {
            centroids.iter()
                .map(|centroid| infra_layer.min_distance(centroid))
                .collect()
        };

        debug!(%key, candidates = centroids.len(), geometries = infra_layer.len(), "computed nearest distances");
        layer.set_column(Column::new(key.distance_column().into(), distances))?;
    }

    Ok(layer)
}
