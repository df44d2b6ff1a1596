use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::{crs::Crs, layer::Layer};

/// Bring an input layer into the metric CRS used for distances.
/// Layers without CRS metadata are taken to be WGS84; any other CRS goes
/// through WGS84 first, so both cases share the final projection step.
pub fn normalize(layer: Layer) -> Result<Layer> {
    let layer = match layer.crs() {
        None => {
            info!("input has no CRS, assuming {}", Crs::WGS84);
            layer.with_crs(Crs::WGS84)
        }
        Some(crs) if crs != Crs::WGS84 => {
            info!(from = %crs, "reprojecting input to {}", Crs::WGS84);
            layer.to_crs(Crs::WGS84)
                .with_context(|| format!("Failed to reproject input from {crs} to {}", Crs::WGS84))?
        }
        Some(_) => layer,
    };

    debug!(records = layer.len(), "projecting input to {}", Crs::UTM_33S);
    layer.to_crs(Crs::UTM_33S)
        .with_context(|| format!("Failed to project input to {}", Crs::UTM_33S))
}
