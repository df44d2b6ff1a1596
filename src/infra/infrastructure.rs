use std::{collections::BTreeMap, fmt};

use anyhow::{bail, ensure, Result};
use geo::Point;

use crate::{crs::Crs, layer::Layer, nearest::{NearestDistance, NearestStrategy}};

use super::InfraKey;

/// A loaded infrastructure layer, ready for nearest-distance queries.
pub struct InfraLayer {
    searcher: Box<dyn NearestDistance>,
}

impl InfraLayer {
    /// Wrap a metric layer with the chosen search strategy.
    pub fn new(layer: &Layer, strategy: NearestStrategy) -> Result<Self> {
        ensure!(
            layer.crs() == Some(Crs::UTM_33S),
            "infrastructure must be in {}, found {:?}",
            Crs::UTM_33S, layer.crs(),
        );
        Ok(Self { searcher: strategy.build(layer.geoms().to_vec()) })
    }

    /// Get the number of geometries.
    #[inline] pub fn len(&self) -> usize { self.searcher.len() }

    /// Check if the layer has no geometries.
    #[inline] pub fn is_empty(&self) -> bool { self.searcher.is_empty() }

    /// Minimum distance from `point` to the layer, `None` if the layer is empty.
    #[inline] pub fn min_distance(&self, point: &Point<f64>) -> Option<f64> { self.searcher.min_distance(point) }
}

/// The full set of infrastructure layers. Always holds all three keys.
pub struct Infrastructure {
    layers: BTreeMap<InfraKey, InfraLayer>,
}

impl Infrastructure {
    /// Build from metric layers; every key must be present exactly once.
    pub fn from_layers(layers: impl IntoIterator<Item = (InfraKey, Layer)>, strategy: NearestStrategy) -> Result<Self> {
        let mut built = BTreeMap::new();
        for (key, layer) in layers {
            if built.insert(key, InfraLayer::new(&layer, strategy)?).is_some() {
                bail!("duplicate infrastructure layer: {key}");
            }
        }
        for key in InfraKey::ALL {
            ensure!(built.contains_key(&key), "missing infrastructure layer: {key}");
        }
        Ok(Self { layers: built })
    }

    /// Get a layer by key.
    #[inline] pub fn get(&self, key: InfraKey) -> Option<&InfraLayer> { self.layers.get(&key) }

    /// Iterate layers in key order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (InfraKey, &InfraLayer)> {
        self.layers.iter().map(|(key, layer)| (*key, layer))
    }
}

impl fmt::Debug for Infrastructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.layers.iter().map(|(key, layer)| (key, layer.len())))
            .finish()
    }
}
