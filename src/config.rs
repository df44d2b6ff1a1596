use std::{fs, net::SocketAddr, path::{Path, PathBuf}};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::{export::DEFAULT_TOP_N, infra::InfraKey, nearest::NearestStrategy};

/// Runtime configuration. Every field has a default, so an empty file is valid.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Root directory for per-request scratch space and output artifacts.
    pub upload_dir: PathBuf,
    /// Number of top-ranked sites to export.
    pub top_n: usize,
    pub infrastructure: InfrastructureConfig,
    pub server: ServerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            top_n: DEFAULT_TOP_N,
            infrastructure: InfrastructureConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Locations of the fixed infrastructure datasets and how they are queried.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InfrastructureConfig {
    pub health: PathBuf,
    pub police: PathBuf,
    pub roads: PathBuf,
    /// Keep the loaded layers between requests, reloading when the files change.
    pub cache: bool,
    pub nearest: NearestStrategy,
}

impl Default for InfrastructureConfig {
    fn default() -> Self {
        Self {
            health: PathBuf::from("dataset/Health Facilities.shp"),
            police: PathBuf::from("dataset/Police Stations.shp"),
            roads: PathBuf::from("dataset/Trunk Roads N13.shp"),
            cache: false,
            nearest: NearestStrategy::default(),
        }
    }
}

impl InfrastructureConfig {
    /// Dataset path for a single layer.
    pub fn path(&self, key: InfraKey) -> &Path {
        match key {
            InfraKey::Health => &self.health,
            InfraKey::Police => &self.police,
            InfraKey::Roads => &self.roads,
        }
    }

    /// Dataset paths in key order.
    pub fn paths(&self) -> impl Iterator<Item = (InfraKey, &Path)> {
        InfraKey::ALL.into_iter().map(|key| (key, self.path(key)))
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    /// Largest accepted upload body, in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 5000)),
            max_upload_bytes: 64 * 1024 * 1024,
        }
    }
}
