//! Test fixtures for catalog-build integration tests
//!
//! Builds a throwaway client tree: a maps directory, a legacy catalog, and a
//! base template, with helpers to drop map files and PNG previews into it.

use std::fs;
use std::path::{Path, PathBuf};

use mapcat::CatalogConfig;
use tempfile::TempDir;

/// A client root in a temp directory
pub struct ClientFixture {
    pub dir: TempDir,
}

impl ClientFixture {
    /// Create a fixture with an empty maps tree, an empty legacy catalog,
    /// and a minimal base template
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        fs::create_dir_all(dir.path().join("Maps")).unwrap();
        fs::create_dir_all(dir.path().join("INI")).unwrap();
        fs::write(dir.path().join("INI/MPMaps.ini"), "").unwrap();
        fs::write(dir.path().join("MPMapsBase.ini"), "[MultiMaps]\n").unwrap();
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write a map description file under `Maps/`
    pub fn write_map(&self, name: &str, content: &str) {
        let path = self.dir.path().join("Maps").join(format!("{}.map", name));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    /// Write a PNG preview next to the map of the same name
    pub fn write_preview(&self, name: &str, width: u32, height: u32) {
        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.extend_from_slice(&13u32.to_be_bytes());
        bytes.extend_from_slice(b"IHDR");
        bytes.extend_from_slice(&width.to_be_bytes());
        bytes.extend_from_slice(&height.to_be_bytes());

        let path = self.dir.path().join("Maps").join(format!("{}.png", name));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, bytes).unwrap();
    }

    /// Replace the legacy catalog content
    pub fn write_legacy(&self, content: &str) {
        fs::write(self.dir.path().join("INI/MPMaps.ini"), content).unwrap();
    }

    /// Replace the base template content
    pub fn write_base(&self, content: &str) {
        fs::write(self.dir.path().join("MPMapsBase.ini"), content).unwrap();
    }

    /// A build configuration pointing into this fixture
    pub fn config(&self) -> CatalogConfig {
        CatalogConfig {
            root: self.dir.path().to_path_buf(),
            maps_dir: PathBuf::from("Maps"),
            legacy_catalog: PathBuf::from("INI/MPMaps.ini"),
            base_template: self.dir.path().join("MPMapsBase.ini"),
            output: self.dir.path().join("MPMaps.ini"),
            missing_report: self.dir.path().join("missing_titles.json"),
            version_manifest: None,
        }
    }

    /// Read the built catalog
    pub fn output(&self) -> String {
        fs::read_to_string(self.dir.path().join("MPMaps.ini")).expect("read built catalog")
    }

    pub fn output_exists(&self) -> bool {
        self.dir.path().join("MPMaps.ini").exists()
    }
}
