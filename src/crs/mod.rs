mod crs;
mod prj;
mod proj;

pub use crs::Crs;
pub(crate) use prj::crs_from_shapefile;
pub(crate) use proj::Reprojector;
