mod compute;
mod index;

pub use compute::compute_nearest;
pub use index::{BruteForce, IndexedGeometries, NearestDistance, NearestStrategy};
