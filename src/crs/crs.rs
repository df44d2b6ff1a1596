use std::fmt;

use anyhow::{anyhow, Context, Result};
use proj4rs::proj::Proj as Proj4;

/// Arc 1950 datum shift to WGS84 (Clarke 1880 ellipsoid).
const ARC_1950: &str = "+ellps=clrk80 +towgs84=-143,-90,-294,0,0,0,0";

/// A coordinate reference system, identified by its EPSG code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Crs {
    epsg: u32,
    geographic: bool,
}

impl Crs {
    /// Geographic WGS84 (lon/lat degrees), used for uploads and exported results.
    pub const WGS84: Crs = Crs { epsg: 4326, geographic: true };

    /// WGS84 / UTM zone 33S (meters), used for every distance computation.
    pub const UTM_33S: Crs = Crs { epsg: 32733, geographic: false };

    /// Look up a CRS by EPSG code, failing if it has no known definition.
    pub fn from_epsg(epsg: u32) -> Result<Self> {
        let proj = Self::build(epsg)?;
        Ok(Self { epsg, geographic: proj.is_latlong() })
    }

    /// Get the EPSG code.
    #[inline] pub fn epsg(&self) -> u32 { self.epsg }

    /// Whether coordinates are lon/lat degrees rather than projected units.
    #[inline] pub fn is_geographic(&self) -> bool { self.geographic }

    /// The `proj4rs` projection for this CRS.
    pub(crate) fn proj(&self) -> Result<Proj4> { Self::build(self.epsg) }

    /// Pinned PROJ.4 definitions for the systems the pipeline itself uses,
    /// and for the Arc 1950 grids whose datum shift is fixed here.
    fn builtin_definition(epsg: u32) -> Option<String> {
        /// UTM definition for a zone and datum/ellipsoid clause.
        fn utm(zone: u32, south: bool, datum: &str) -> String {
            let south = if south { " +south" } else { "" };
            format!("+proj=utm +zone={zone}{south} {datum} +units=m +no_defs")
        }

        Some(match epsg {
            4326 => "+proj=longlat +datum=WGS84 +no_defs".to_string(),
            4209 => format!("+proj=longlat {ARC_1950} +no_defs"),
            code @ 32701..=32760 => utm(code - 32700, true, "+datum=WGS84"),
            code @ 20934..=20936 => utm(code - 20900, true, ARC_1950),
            _ => return None,
        })
    }

    /// Build from a pinned definition, else from the EPSG registry bundled with `proj4rs`.
    fn build(epsg: u32) -> Result<Proj4> {
        if let Some(definition) = Self::builtin_definition(epsg) {
            return Proj4::from_proj_string(&definition)
                .with_context(|| format!("failed to build PROJ.4 for EPSG:{epsg}: {definition}"));
        }

        let code = u16::try_from(epsg)
            .map_err(|_| anyhow!("unsupported coordinate reference system: EPSG:{epsg}"))?;
        Proj4::from_epsg_code(code)
            .map_err(|e| anyhow!("unsupported coordinate reference system: EPSG:{epsg} ({e})"))
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg)
    }
}
