mod infrastructure;
mod key;
mod loader;

pub use infrastructure::{InfraLayer, Infrastructure};
pub use key::InfraKey;
pub use loader::{infrastructure_source, load_infrastructure, CachedInfrastructure, DiskInfrastructure, InfrastructureSource};
