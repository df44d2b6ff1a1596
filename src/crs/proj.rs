use anyhow::{anyhow, bail, Context, Result};
use geo::{Coord, Geometry, MapCoords};
use proj4rs::{proj::Proj as Proj4, transform::transform};

use super::Crs;

/// Coordinate transform between two supported CRSs.
/// Geographic coordinates are degrees on both sides; `proj4rs` works in radians internally.
pub(crate) struct Reprojector {
    from: Proj4,
    to: Proj4,
    from_geographic: bool,
    to_geographic: bool,
}

impl Reprojector {
    pub(crate) fn new(from: Crs, to: Crs) -> Result<Self> {
        Ok(Self {
            from: from.proj().with_context(|| format!("no projection for source {from}"))?,
            to: to.proj().with_context(|| format!("no projection for target {to}"))?,
            from_geographic: from.is_geographic(),
            to_geographic: to.is_geographic(),
        })
    }

    /// Transform a single coordinate.
    pub(crate) fn coord(&self, coord: Coord<f64>) -> Result<Coord<f64>> {
        let mut point = if self.from_geographic {
            (coord.x.to_radians(), coord.y.to_radians(), 0.0)
        } else {
            (coord.x, coord.y, 0.0)
        };

        transform(&self.from, &self.to, &mut point)
            .map_err(|e| anyhow!("CRS transform failed at ({}, {}): {e}", coord.x, coord.y))?;

        let (x, y) = if self.to_geographic {
            (point.0.to_degrees(), point.1.to_degrees())
        } else {
            (point.0, point.1)
        };

        if !x.is_finite() || !y.is_finite() {
            bail!("CRS transform produced non-finite coordinates at ({}, {})", coord.x, coord.y);
        }

        Ok(Coord { x, y })
    }

    /// Transform every coordinate of a geometry.
    pub(crate) fn geometry(&self, geometry: &Geometry<f64>) -> Result<Geometry<f64>> {
        geometry.try_map_coords(|coord| self.coord(coord))
    }
}
