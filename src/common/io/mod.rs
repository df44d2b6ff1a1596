mod geojson;
mod shp;

pub(crate) use geojson::*;
pub(crate) use shp::*;
