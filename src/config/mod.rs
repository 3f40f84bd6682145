//! Tool configuration
//!
//! `mapcat` reads its paths from a TOML file (`mapcat.toml` by default),
//! with CLI flags layered on top. Two precedence layers are enough here:
//! built-in defaults live in the serde `default` functions, the file
//! overrides them, and the CLI overrides the file.
//!
//! `maps_dir` and `legacy_catalog` are resolved relative to `root` (section
//! names are derived from that same root); `base_template` and `output` are
//! used as given.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "mapcat.toml";

/// Errors when loading or validating the tool configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{what} not found: {path}")]
    PathMissing { what: &'static str, path: PathBuf },
}

/// Catalog build configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Client root directory; section names are relative to this
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Maps tree, relative to `root`
    #[serde(default = "default_maps_dir")]
    pub maps_dir: PathBuf,

    /// Previous catalog, relative to `root`; fallback data source
    #[serde(default = "default_legacy_catalog")]
    pub legacy_catalog: PathBuf,

    /// Template the output is seeded from
    #[serde(default = "default_base_template")]
    pub base_template: PathBuf,

    /// Regenerated catalog
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Report listing maps excluded for missing titles
    #[serde(default = "default_missing_report")]
    pub missing_report: PathBuf,

    /// Release manifest checked by `new-files`
    pub version_manifest: Option<PathBuf>,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_maps_dir() -> PathBuf {
    PathBuf::from("Maps/Yuri's Revenge")
}

fn default_legacy_catalog() -> PathBuf {
    PathBuf::from("INI/MPMaps.ini")
}

fn default_base_template() -> PathBuf {
    PathBuf::from("MPMapsBase.ini")
}

fn default_output() -> PathBuf {
    PathBuf::from("MPMaps.ini")
}

fn default_missing_report() -> PathBuf {
    PathBuf::from("missing_titles.json")
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            maps_dir: default_maps_dir(),
            legacy_catalog: default_legacy_catalog(),
            base_template: default_base_template(),
            output: default_output(),
            missing_report: default_missing_report(),
            version_manifest: None,
        }
    }
}

/// CLI-level overrides, applied on top of the file layer
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub root: Option<PathBuf>,
    pub maps_dir: Option<PathBuf>,
    pub legacy_catalog: Option<PathBuf>,
    pub base_template: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub version_manifest: Option<PathBuf>,
}

impl CatalogConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply CLI overrides (highest precedence layer)
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(root) = overrides.root {
            self.root = root;
        }
        if let Some(maps_dir) = overrides.maps_dir {
            self.maps_dir = maps_dir;
        }
        if let Some(legacy) = overrides.legacy_catalog {
            self.legacy_catalog = legacy;
        }
        if let Some(base) = overrides.base_template {
            self.base_template = base;
        }
        if let Some(output) = overrides.output {
            self.output = output;
        }
        if let Some(manifest) = overrides.version_manifest {
            self.version_manifest = Some(manifest);
        }
        self
    }

    /// Path to the maps tree
    pub fn maps_path(&self) -> PathBuf {
        self.root.join(&self.maps_dir)
    }

    /// Path to the legacy catalog
    pub fn legacy_path(&self) -> PathBuf {
        self.root.join(&self.legacy_catalog)
    }

    /// Check that every input path exists before a run starts
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.root.is_dir() {
            return Err(ConfigError::PathMissing {
                what: "catalog root",
                path: self.root.clone(),
            });
        }
        if !self.maps_path().is_dir() {
            return Err(ConfigError::PathMissing {
                what: "maps directory",
                path: self.maps_path(),
            });
        }
        if !self.legacy_path().is_file() {
            return Err(ConfigError::PathMissing {
                what: "legacy catalog",
                path: self.legacy_path(),
            });
        }
        if !self.base_template.is_file() {
            return Err(ConfigError::PathMissing {
                what: "base template",
                path: self.base_template.clone(),
            });
        }
        Ok(())
    }
}
