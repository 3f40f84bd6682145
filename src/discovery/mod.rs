//! Map discovery
//!
//! Walks the maps tree and yields one entry per map description file,
//! together with the section name the catalog will file it under. Section
//! names are the root-relative path with the `.map` suffix stripped, the
//! same derivation the legacy tool used, so legacy sections line up.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

/// File kinds that ship in a map release
const MAP_GLOB: &str = "**/*.map";
const PREVIEW_GLOB: &str = "**/*.png";

/// Errors during discovery
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("failed to walk maps directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("glob pattern error: {0}")]
    Glob(#[from] globset::Error),

    #[error("map {path} is not under the catalog root {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },
}

/// One discovered map description file
#[derive(Debug, Clone)]
pub struct DiscoveredMap {
    /// Absolute path to the `.map` file
    pub path: PathBuf,
    /// Catalog section name derived from the root-relative path
    pub section: String,
}

/// Derive the catalog section name for a map path.
///
/// The root prefix and the 4-character `.map` suffix are stripped; the
/// relative path in between is the section name, verbatim.
pub fn section_name(path: &Path, root: &Path) -> Result<String, DiscoveryError> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| DiscoveryError::OutsideRoot {
            path: path.to_path_buf(),
            root: root.to_path_buf(),
        })?;
    let relative = relative.to_string_lossy();
    let trimmed = relative.strip_suffix(".map").unwrap_or(&relative);
    Ok(trimmed.to_string())
}

/// Enumerate map description files under `maps_dir`, in stable path order
pub fn scan_maps(root: &Path, maps_dir: &Path) -> Result<Vec<DiscoveredMap>, DiscoveryError> {
    let matcher = glob_set(&[MAP_GLOB])?;
    let mut maps = Vec::new();

    for entry in WalkDir::new(maps_dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if !matcher.is_match(entry.path()) {
            continue;
        }
        let section = section_name(entry.path(), root)?;
        maps.push(DiscoveredMap {
            path: entry.path().to_path_buf(),
            section,
        });
    }

    Ok(maps)
}

/// Enumerate every release file (maps and previews) under `maps_dir`,
/// as root-relative paths in stable order
pub fn scan_release_files(root: &Path, maps_dir: &Path) -> Result<Vec<String>, DiscoveryError> {
    let matcher = glob_set(&[MAP_GLOB, PREVIEW_GLOB])?;
    let mut files = Vec::new();

    for entry in WalkDir::new(maps_dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if !matcher.is_match(entry.path()) {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|_| DiscoveryError::OutsideRoot {
                path: entry.path().to_path_buf(),
                root: root.to_path_buf(),
            })?;
        files.push(relative.to_string_lossy().into_owned());
    }

    Ok(files)
}

fn glob_set(patterns: &[&str]) -> Result<GlobSet, globset::Error> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    builder.build()
}
