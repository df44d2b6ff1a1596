use geo::{BoundingRect, Distance, Euclidean, Geometry, Point};
use rstar::{PointDistance, RTree, RTreeObject, AABB};
use serde::Deserialize;

/// Minimum distance from a point to a fixed set of geometries.
pub trait NearestDistance: Send + Sync {
    /// Number of geometries searched.
    fn len(&self) -> usize;

    /// Check if there is nothing to search.
    fn is_empty(&self) -> bool { self.len() == 0 }

    /// Minimum planar distance from `point` to any geometry, or `None` if there are none.
    fn min_distance(&self, point: &Point<f64>) -> Option<f64>;
}

/// How nearest-infrastructure queries are answered. Both give identical distances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NearestStrategy {
    /// Compare against every geometry.
    #[default]
    BruteForce,
    /// Bounding-box R-tree nearest-neighbour search.
    Rtree,
}

impl NearestStrategy {
    /// Build a searcher over `geoms`. Geometries without a bounding box (empty) are skipped.
    pub fn build(self, geoms: Vec<Geometry<f64>>) -> Box<dyn NearestDistance> {
        let geoms = geoms.into_iter()
            .filter(|geometry| geometry.bounding_rect().is_some())
            .collect::<Vec<_>>();

        match self {
            NearestStrategy::BruteForce => Box::new(BruteForce::new(geoms)),
            NearestStrategy::Rtree => Box::new(IndexedGeometries::new(geoms)),
        }
    }
}

/// Planar distance from a point to a geometry (zero inside polygons).
#[inline]
fn point_distance(point: &Point<f64>, geometry: &Geometry<f64>) -> f64 {
    Euclidean.distance(&Geometry::Point(*point), geometry)
}

/// Linear scan over all geometries.
#[derive(Debug, Clone)]
pub struct BruteForce {
    geoms: Vec<Geometry<f64>>,
}

impl BruteForce {
    pub fn new(geoms: Vec<Geometry<f64>>) -> Self { Self { geoms } }
}

impl NearestDistance for BruteForce {
    #[inline] fn len(&self) -> usize { self.geoms.len() }

    fn min_distance(&self, point: &Point<f64>) -> Option<f64> {
        self.geoms.iter()
            .map(|geometry| point_distance(point, geometry))
            .reduce(f64::min)
    }
}

/// A geometry in an R-tree, keyed by its bounding box.
#[derive(Debug, Clone)]
struct IndexedGeometry {
    geometry: Geometry<f64>,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedGeometry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope { self.envelope }
}

impl PointDistance for IndexedGeometry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let d = point_distance(&Point::new(point[0], point[1]), &self.geometry);
        d * d
    }
}

/// R-tree over geometry bounding boxes; exact distances are computed on the candidates.
pub struct IndexedGeometries {
    rtree: RTree<IndexedGeometry>,
}

impl IndexedGeometries {
    pub fn new(geoms: Vec<Geometry<f64>>) -> Self {
        Self {
            rtree: RTree::bulk_load(
                geoms.into_iter()
                    .filter_map(|geometry| {
                        let rect = geometry.bounding_rect()?;
                        let envelope = AABB::from_corners(rect.min().into(), rect.max().into());
                        Some(IndexedGeometry { geometry, envelope })
                    })
                    .collect()
            ),
        }
    }
}

impl NearestDistance for IndexedGeometries {
    #[inline] fn len(&self) -> usize { self.rtree.size() }

    fn min_distance(&self, point: &Point<f64>) -> Option<f64> {
        self.rtree.nearest_neighbor(&[point.x(), point.y()])
            .map(|nearest| point_distance(point, &nearest.geometry))
    }
}
