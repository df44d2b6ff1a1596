use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{error, info, info_span};
use uuid::Uuid;

use crate::{
    common,
    config::Config,
    error::SitingError,
    export::export_top,
    infra::{infrastructure_source, InfrastructureSource},
    layer::Layer,
    nearest::compute_nearest,
    normalize::normalize,
    score::score,
};

use super::RequestScope;

/// Check an uploaded file name before anything is written to disk.
pub fn validate_upload_name(name: &str) -> Result<(), SitingError> {
    if name.trim().is_empty() {
        return Err(SitingError::EmptyFilename);
    }
    let is_zip = Path::new(name).extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
    if !is_zip {
        return Err(SitingError::UnsupportedExtension);
    }
    Ok(())
}

/// Output of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub request_id: Uuid,
    pub path: PathBuf,
}

/// Ranks candidate sites against the configured infrastructure.
pub struct Pipeline {
    infrastructure: Box<dyn InfrastructureSource>,
    upload_dir: PathBuf,
    top_n: usize,
}

impl Pipeline {
    pub fn new(infrastructure: Box<dyn InfrastructureSource>, upload_dir: PathBuf, top_n: usize) -> Self {
        Self { infrastructure, upload_dir, top_n }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            infrastructure_source(&config.infrastructure),
            config.upload_dir.clone(),
            config.top_n,
        )
    }

    #[inline] pub fn upload_dir(&self) -> &Path { &self.upload_dir }

    #[inline] pub fn top_n(&self) -> usize { self.top_n }

    /// Rank an already loaded candidate layer and return the top sites as GeoJSON.
    pub fn rank_layer(&self, layer: Layer) -> Result<String, SitingError> {
        let candidates = normalize(layer).map_err(SitingError::Data)?;
        let infra = self.infrastructure.load().map_err(SitingError::Infrastructure)?;

        let ranked = compute_nearest(candidates, &infra)
            .and_then(|layer| score(&layer))
            .map_err(SitingError::Unexpected)?;
        info!(candidates = ranked.len(), top = self.top_n, "ranked candidate sites");

        export_top(&ranked, self.top_n).map_err(SitingError::Unexpected)
    }

    /// Read, rank and export a candidate shapefile.
    pub fn rank_shapefile(&self, path: &Path) -> Result<String, SitingError> {
        let layer = Layer::from_shapefile(path)
            .with_context(|| format!("Failed to read {}", path.display()))
            .map_err(SitingError::Data)?;
        info!(path = %path.display(), records = layer.len(), "loaded candidate sites");

        self.rank_layer(layer)
    }

    /// Unpack an archive, find its shapefile and rank it.
    pub fn rank_archive(&self, archive: &Path, extract_dir: &Path, delete_after: bool) -> Result<String, SitingError> {
        common::extract_zip(archive, extract_dir, delete_after).map_err(SitingError::InvalidArchive)?;
        let shapefile = common::find_shapefile(extract_dir)
            .map_err(SitingError::Unexpected)?
            .ok_or(SitingError::NoShapefile)?;

        self.rank_shapefile(&shapefile)
    }

    /// Open a request scope under the upload directory.
    pub fn scope(&self) -> Result<RequestScope, SitingError> {
        RequestScope::new(&self.upload_dir).map_err(SitingError::Unexpected)
    }

    /// Rank the archive saved in `scope` and persist the result.
    /// The scope's scratch space is removed on return, whatever the outcome.
    pub fn process(&self, scope: RequestScope) -> Result<Artifact, SitingError> {
        let _span = info_span!("request", id = %scope.id()).entered();

        let result = self.rank_archive(&scope.archive_path(), &scope.extract_dir(), true)
            .and_then(|geojson| scope.write_artifact(&geojson).map_err(SitingError::Unexpected));

        match result {
            Ok(path) => {
                info!(path = %path.display(), "wrote ranked sites");
                Ok(Artifact { request_id: scope.id(), path })
            }
            Err(err) => {
                error!("{err}");
                Err(err)
            }
        }
    }

    /// Validate, store and process an uploaded archive in a fresh scope.
    pub fn handle_upload(&self, name: &str, bytes: &[u8]) -> Result<Artifact, SitingError> {
        validate_upload_name(name)?;
        let scope = self.scope()?;
        scope.save_archive(bytes).map_err(SitingError::Unexpected)?;
        self.process(scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use crate::{config::InfrastructureConfig, infra::DiskInfrastructure};

    fn make_test_pipeline(upload_dir: &Path) -> Pipeline {
        let missing = InfrastructureConfig {
            health: upload_dir.join("none.shp"),
            police: upload_dir.join("none.shp"),
            roads: upload_dir.join("none.shp"),
            ..Default::default()
        };
        Pipeline::new(Box::new(DiskInfrastructure::new(missing)), upload_dir.to_path_buf(), 5)
    }

    #[test]
    fn upload_names() {
        assert!(matches!(validate_upload_name(""), Err(SitingError::EmptyFilename)));
        assert!(matches!(validate_upload_name("sites.shp"), Err(SitingError::UnsupportedExtension)));
        assert!(matches!(validate_upload_name("sites"), Err(SitingError::UnsupportedExtension)));
        assert!(validate_upload_name("sites.zip").is_ok());
        assert!(validate_upload_name("SITES.ZIP").is_ok());
    }

    #[test]
    fn corrupt_archive_leaves_nothing_behind() {
        let root = tempfile::tempdir().unwrap();
        let pipeline = make_test_pipeline(root.path());

        let err = pipeline.handle_upload("sites.zip", b"definitely not a zip").unwrap_err();
        assert!(matches!(err, SitingError::InvalidArchive(_)));
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn archive_without_shapefile() {
        use std::io::Write;

        let root = tempfile::tempdir().unwrap();
        let pipeline = make_test_pipeline(root.path());

        let mut bytes = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut bytes));
            zip.start_file("readme.txt", zip::write::SimpleFileOptions::default()).unwrap();
            zip.write_all(b"no shapes here").unwrap();
            zip.finish().unwrap();
        }

        let err = pipeline.handle_upload("sites.zip", &bytes).unwrap_err();
        assert!(matches!(err, SitingError::NoShapefile));
        assert_eq!(err.to_string(), "No .shp file found in ZIP");
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn rejected_names_touch_nothing() {
        let root = tempfile::tempdir().unwrap();
        let pipeline = make_test_pipeline(&root.path().join("uploads"));
        assert!(pipeline.handle_upload("sites.geojson", b"{}").is_err());
        assert!(!root.path().join("uploads").exists());
    }
}
