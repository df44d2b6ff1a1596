#![doc = "Facility siting public API"]
mod common;
mod config;
mod crs;
mod error;
mod export;
mod infra;
mod layer;
mod nearest;
mod normalize;
mod pipeline;
mod score;

#[doc(inline)]
pub use config::{Config, InfrastructureConfig, ServerConfig};

#[doc(inline)]
pub use crs::Crs;

#[doc(inline)]
pub use error::SitingError;

#[doc(inline)]
pub use export::{export_top, DEFAULT_TOP_N};

#[doc(inline)]
pub use infra::{
    infrastructure_source, load_infrastructure, CachedInfrastructure, DiskInfrastructure,
    InfraKey, InfraLayer, Infrastructure, InfrastructureSource,
};

#[doc(inline)]
pub use layer::Layer;

#[doc(inline)]
pub use nearest::{compute_nearest, BruteForce, IndexedGeometries, NearestDistance, NearestStrategy};

#[doc(inline)]
pub use normalize::normalize;

#[doc(inline)]
pub use pipeline::{validate_upload_name, Artifact, Pipeline, RequestScope, ARTIFACT_NAME};

#[doc(inline)]
pub use score::{score, weight, DENSITY_COLUMN, DENSITY_SCORE_COLUMN, EPSILON, SCORE_COLUMN};
