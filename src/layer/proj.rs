use anyhow::{anyhow, Context, Result};

use crate::{crs::{Crs, Reprojector}, layer::Layer};

impl Layer {
    /// Reproject every geometry into `target`. The layer must have a defined CRS.
    pub fn to_crs(&self, target: Crs) -> Result<Self> {
        let source = self.crs()
            .ok_or_else(|| anyhow!("cannot reproject a layer with an undefined CRS"))?;
        if source == target {
            return Ok(self.clone());
        }

        let reprojector = Reprojector::new(source, target)?;
        let geoms = self.geoms().iter().enumerate()
            .map(|(i, geometry)| reprojector.geometry(geometry)
                .with_context(|| format!("failed to reproject record {i} from {source} to {target}")))
            .collect::<Result<Vec<_>>>()?;

        Layer::new(geoms, self.data().clone(), Some(target))
    }
}
