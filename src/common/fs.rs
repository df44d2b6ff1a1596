use std::{fs, path::{Path, PathBuf}};

use anyhow::{Context, Result};
use tracing::{debug, warn};
use walkdir::WalkDir;
use zip::ZipArchive;

/// Create the directory if it doesn’t exist; error if a non-directory exists there.
pub(crate) fn ensure_dir_exists(path: &Path) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            anyhow::bail!("Path exists but is not a directory: {}", path.display());
        }
    } else {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {}", path.display()))?;
    }
    Ok(())
}

/// Extracts the given `.zip` file to the target directory.
/// If `delete_after` is `true`, removes the `.zip` file after a successful extraction.
pub(crate) fn extract_zip(zip_path: &Path, dest_dir: &Path, delete_after: bool) -> Result<()> {
    let file = fs::File::open(zip_path)
        .map_err(|e| anyhow::anyhow!("failed to open {:?}: {}", zip_path, e))?;
    let mut archive = ZipArchive::new(file)
        .map_err(|e| anyhow::anyhow!("failed to read zip archive {:?}: {}", zip_path, e))?;

    ensure_dir_exists(dest_dir)?;
    archive
        .extract(dest_dir)
        .map_err(|e| anyhow::anyhow!("failed to extract {:?} to {:?}: {}", zip_path, dest_dir, e))?;
    debug!(entries = archive.len(), dest = %dest_dir.display(), "extracted archive");

    if delete_after {
        fs::remove_file(zip_path)
            .map_err(|e| anyhow::anyhow!("failed to delete {:?}: {}", zip_path, e))?;
    }

    Ok(())
}

/// Find the `.shp` file inside an extracted archive, searching subdirectories too.
/// When several are present the lexicographically first path is chosen.
pub(crate) fn find_shapefile(dir: &Path) -> Result<Option<PathBuf>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to list {}", dir.display()))?;
        let is_shp = entry.path().extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("shp"));
        if entry.file_type().is_file() && is_shp {
            found.push(entry.into_path());
        }
    }
    found.sort();

    if found.len() > 1 {
        warn!(
            count = found.len(),
            chosen = %found[0].display(),
            "archive contains several shapefiles, using the first in lexicographic order"
        );
    }

    Ok(found.into_iter().next())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn ensure_dir_rejects_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("taken");
        fs::write(&file, b"x").unwrap();

        assert!(ensure_dir_exists(&file).is_err());
        assert!(ensure_dir_exists(&dir.path().join("a/b")).is_ok());
        assert!(dir.path().join("a/b").is_dir());
    }

    #[test]
    fn find_shapefile_is_lexicographic_and_recursive() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("zeta.shp"), b"").unwrap();
        fs::write(dir.path().join("nested/alpha.SHP"), b"").unwrap();
        fs::write(dir.path().join("beta.dbf"), b"").unwrap();

        let found = find_shapefile(dir.path()).unwrap().unwrap();
        assert_eq!(found, dir.path().join("nested/alpha.SHP"));
    }

    #[test]
    fn find_shapefile_none_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("readme.txt"), b"hello").unwrap();
        assert!(find_shapefile(dir.path()).unwrap().is_none());
    }

    #[test]
    fn extract_zip_deletes_archive() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = dir.path().join("upload.zip");
        {
            let mut writer = zip::ZipWriter::new(fs::File::create(&zip_path).unwrap());
            writer.start_file("sites.shp", zip::write::SimpleFileOptions::default()).unwrap();
            writer.write_all(b"shape").unwrap();
            writer.finish().unwrap();
        }

        let dest = dir.path().join("extracted");
        extract_zip(&zip_path, &dest, true).unwrap();

        assert!(!zip_path.exists());
        assert_eq!(fs::read(dest.join("sites.shp")).unwrap(), b"shape");
    }

    #[test]
    fn extract_zip_rejects_non_archives() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = dir.path().join("upload.zip");
        fs::write(&zip_path, b"definitely not a zip").unwrap();

        assert!(extract_zip(&zip_path, &dir.path().join("out"), true).is_err());
        assert!(zip_path.exists());
    }
}
