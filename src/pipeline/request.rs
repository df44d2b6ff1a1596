use std::{fs, path::{Path, PathBuf}};

use anyhow::{Context, Result};
use tempfile::TempDir;
use uuid::Uuid;

use crate::common;

/// File name of the ranked output inside a request's directory.
pub const ARTIFACT_NAME: &str = "top5.geojson";

/// Working space for one upload. The scratch directory (archive and extracted
/// files) is removed when the scope is dropped; only the output directory
/// `<upload_root>/<id>/` outlives it.
#[derive(Debug)]
pub struct RequestScope {
    id: Uuid,
    scratch: TempDir,
    output_dir: PathBuf,
}

impl RequestScope {
    /// Open a fresh scope under `upload_root`.
    pub fn new(upload_root: &Path) -> Result<Self> {
        common::ensure_dir_exists(upload_root)?;

        let id = Uuid::new_v4();
        let scratch = tempfile::Builder::new()
            .prefix(&format!(".scratch-{id}-"))
            .tempdir_in(upload_root)
            .with_context(|| format!("Failed to create scratch directory in {}", upload_root.display()))?;

        Ok(Self { id, scratch, output_dir: upload_root.join(id.to_string()) })
    }

    #[inline] pub fn id(&self) -> Uuid { self.id }

    /// Directory removed when the scope drops.
    #[inline] pub fn scratch_dir(&self) -> &Path { self.scratch.path() }

    /// Where the uploaded archive is stored.
    #[inline] pub fn archive_path(&self) -> PathBuf { self.scratch.path().join("upload.zip") }

    /// Where the archive is unpacked.
    #[inline] pub fn extract_dir(&self) -> PathBuf { self.scratch.path().join("extracted") }

    #[inline] pub fn output_dir(&self) -> &Path { &self.output_dir }

    #[inline] pub fn output_path(&self) -> PathBuf { self.output_dir.join(ARTIFACT_NAME) }

    /// Store the uploaded archive bytes.
    pub fn save_archive(&self, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.archive_path();
        fs::write(&path, bytes)
            .with_context(|| format!("Failed to save upload to {}", path.display()))?;
        Ok(path)
    }

    /// Write the ranked output, creating the request's output directory.
    pub(crate) fn write_artifact(&self, contents: &str) -> Result<PathBuf> {
        common::ensure_dir_exists(&self.output_dir)?;
        let path = self.output_path();
        fs::write(&path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scratch_is_removed_on_drop() {
        let root = tempfile::tempdir().unwrap();
        let scope = RequestScope::new(&root.path().join("uploads")).unwrap();

        let archive = scope.save_archive(b"not really a zip").unwrap();
        assert!(archive.starts_with(scope.scratch_dir()));
        assert!(archive.exists());

        let scratch = scope.scratch_dir().to_path_buf();
        let output = scope.output_path();
        drop(scope);

        assert!(!scratch.exists());
        assert!(!output.exists());
    }

    #[test]
    fn artifact_outlives_scope() {
        let root = tempfile::tempdir().unwrap();
        let scope = RequestScope::new(root.path()).unwrap();
        let id = scope.id();

        let path = scope.write_artifact("{}").unwrap();
        drop(scope);

        assert_eq!(path, root.path().join(id.to_string()).join(ARTIFACT_NAME));
        assert_eq!(fs::read_to_string(path).unwrap(), "{}");
    }

    #[test]
    fn scopes_are_unique() {
        let root = tempfile::tempdir().unwrap();
        let a = RequestScope::new(root.path()).unwrap();
        let b = RequestScope::new(root.path()).unwrap();
        assert_ne!(a.id(), b.id());
        assert_ne!(a.scratch_dir(), b.scratch_dir());
    }
}
