use std::{fs, path::{Path, PathBuf}, sync::{Arc, Mutex}, time::SystemTime};

use anyhow::{anyhow, Context, Result};
use tracing::{debug, info};

use crate::{config::InfrastructureConfig, crs::Crs, layer::Layer};

use super::Infrastructure;

/// Read the three infrastructure datasets and project them into the metric CRS.
/// Datasets without CRS metadata are assumed to be WGS84.
pub fn load_infrastructure(config: &InfrastructureConfig) -> Result<Infrastructure> {
    let layers = config.paths()
        .map(|(key, path)| {
            let layer = load_layer(path)
                .with_context(|| format!("Failed to load {key} infrastructure from {}", path.display()))?;
            Ok((key, layer))
        })
        .collect::<Result<Vec<_>>>()?;

    Infrastructure::from_layers(layers, config.nearest)
}

/// Read one dataset and reproject it to UTM 33S.
fn load_layer(path: &Path) -> Result<Layer> {
    let mut layer = Layer::from_shapefile(path)?;
    if layer.crs().is_none() {
        debug!(path = %path.display(), "infrastructure has no CRS, assuming {}", Crs::WGS84);
        layer = layer.with_crs(Crs::WGS84);
    }
    layer.to_crs(Crs::UTM_33S)
}

/// Anything that can hand out a loaded infrastructure set.
pub trait InfrastructureSource: Send + Sync {
    fn load(&self) -> Result<Arc<Infrastructure>>;
}

/// Reads the datasets from disk on every call.
#[derive(Debug, Clone)]
pub struct DiskInfrastructure {
    config: InfrastructureConfig,
}

impl DiskInfrastructure {
    pub fn new(config: InfrastructureConfig) -> Self { Self { config } }
}

impl InfrastructureSource for DiskInfrastructure {
    fn load(&self) -> Result<Arc<Infrastructure>> {
        Ok(Arc::new(load_infrastructure(&self.config)?))
    }
}

/// Modification time and size of every file making up the datasets; `None` for absent sidecars.
type Fingerprint = Vec<(PathBuf, Option<(SystemTime, u64)>)>;

/// Keeps the last loaded set until it is invalidated or any dataset file changes.
#[derive(Debug)]
pub struct CachedInfrastructure {
    config: InfrastructureConfig,
    cached: Mutex<Option<(Fingerprint, Arc<Infrastructure>)>>,
}

impl CachedInfrastructure {
    pub fn new(config: InfrastructureConfig) -> Self {
        Self { config, cached: Mutex::new(None) }
    }

    /// Drop the cached set; the next `load` reads from disk.
    pub fn invalidate(&self) {
        if let Ok(mut cached) = self.cached.lock() {
            *cached = None;
        }
    }

    fn fingerprint(&self) -> Fingerprint {
        /// The shapefile and the sidecars that change its meaning.
        fn dataset_files(shp: &Path) -> impl Iterator<Item = PathBuf> {
            [shp.to_path_buf(), shp.with_extension("dbf"), shp.with_extension("shx"), shp.with_extension("prj")].into_iter()
        }

        self.config.paths()
            .flat_map(|(_, path)| dataset_files(path))
            .map(|file| {
                let stamp = fs::metadata(&file)
                    .and_then(|meta| Ok((meta.modified()?, meta.len())))
                    .ok();
                (file, stamp)
            })
            .collect()
    }
}

impl InfrastructureSource for CachedInfrastructure {
    fn load(&self) -> Result<Arc<Infrastructure>> {
        let fingerprint = self.fingerprint();
        let mut cached = self.cached.lock()
            .map_err(|_| anyhow!("infrastructure cache lock poisoned"))?;

        if let Some((seen, infra)) = cached.as_ref() {
            if *seen == fingerprint {
                debug!("using cached infrastructure");
                return Ok(Arc::clone(infra));
            }
            info!("infrastructure files changed, reloading");
        }

        let infra = Arc::new(load_infrastructure(&self.config)?);
        *cached = Some((fingerprint, Arc::clone(&infra)));
        Ok(infra)
    }
}

/// Build the configured source.
pub fn infrastructure_source(config: &InfrastructureConfig) -> Box<dyn InfrastructureSource> {
    if config.cache {
        Box::new(CachedInfrastructure::new(config.clone()))
    } else {
        Box::new(DiskInfrastructure::new(config.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapefile::{Point, Polyline};

    use crate::infra::InfraKey;

    fn write_points(path: &Path, points: &[(f64, f64)]) {
        let table = shapefile::dbase::TableWriterBuilder::new()
            .add_numeric_field("id".try_into().unwrap(), 10, 0);
        let mut writer = shapefile::Writer::from_path(path, table).unwrap();
        for (i, &(x, y)) in points.iter().enumerate() {
            let mut record = shapefile::dbase::Record::default();
            record.insert("id".to_string(), shapefile::dbase::FieldValue::Numeric(Some(i as f64)));
            writer.write_shape_and_record(&Point::new(x, y), &record).unwrap();
        }
    }

    fn write_lines(path: &Path, lines: &[[(f64, f64); 2]]) {
        let table = shapefile::dbase::TableWriterBuilder::new()
            .add_numeric_field("id".try_into().unwrap(), 10, 0);
        let mut writer = shapefile::Writer::from_path(path, table).unwrap();
        for (i, line) in lines.iter().enumerate() {
            let polyline = Polyline::new(line.iter().map(|&(x, y)| Point::new(x, y)).collect());
            let mut record = shapefile::dbase::Record::default();
            record.insert("id".to_string(), shapefile::dbase::FieldValue::Numeric(Some(i as f64)));
            writer.write_shape_and_record(&polyline, &record).unwrap();
        }
    }

    fn make_test_config(dir: &Path) -> InfrastructureConfig {
        let config = InfrastructureConfig {
            health: dir.join("health.shp"),
            police: dir.join("police.shp"),
            roads: dir.join("roads.shp"),
            ..Default::default()
        };
        write_points(&config.health, &[(15.0, -10.0), (15.1, -10.1)]);
        write_points(&config.police, &[(15.3, -10.2)]);
        write_lines(&config.roads, &[[(14.9, -10.0), (15.2, -10.0)]]);
        config
    }

    #[test]
    fn loads_and_projects_all_layers() {
        let dir = tempfile::tempdir().unwrap();
        let infra = load_infrastructure(&make_test_config(dir.path())).unwrap();

        assert_eq!(infra.get(InfraKey::Health).unwrap().len(), 2);
        assert_eq!(infra.get(InfraKey::Police).unwrap().len(), 1);
        assert_eq!(infra.get(InfraKey::Roads).unwrap().len(), 1);

        // (15, -10) is on the zone 33 central meridian, 10 degrees south
        let at_health = geo::point!(x: 500_000.0, y: 8_894_000.0);
        let distance = infra.get(InfraKey::Health).unwrap().min_distance(&at_health).unwrap();
        assert!(distance < 1_000.0, "distance {distance}");
    }

    #[test]
    fn missing_dataset_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = make_test_config(dir.path());
        config.roads = dir.path().join("missing.shp");

        let err = load_infrastructure(&config).unwrap_err();
        assert!(format!("{err:#}").contains("roads"));
    }

    #[test]
    fn cache_reuses_until_invalidated() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CachedInfrastructure::new(make_test_config(dir.path()));

        let first = cache.load().unwrap();
        let second = cache.load().unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        cache.invalidate();
        let third = cache.load().unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
    }

    #[test]
    fn cache_reloads_when_a_dataset_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = make_test_config(dir.path());
        let cache = CachedInfrastructure::new(config.clone());

        let first = cache.load().unwrap();
        assert_eq!(first.get(InfraKey::Police).unwrap().len(), 1);

        write_points(&config.police, &[(15.3, -10.2), (15.4, -10.3)]);
        let second = cache.load().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.get(InfraKey::Police).unwrap().len(), 2);

        assert!(Arc::ptr_eq(&second, &cache.load().unwrap()));
    }

    #[test]
    fn disk_source_reloads_every_time() {
        let dir = tempfile::tempdir().unwrap();
        let source = DiskInfrastructure::new(make_test_config(dir.path()));
        assert!(!Arc::ptr_eq(&source.load().unwrap(), &source.load().unwrap()));
    }
}
