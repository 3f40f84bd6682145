//! Run summary
//!
//! Every build produces a summary: what was discovered, what was emitted,
//! what fell back, and digests of the legacy input and the written output so
//! a rebuild can be compared without diffing catalogs. Serialized as JSON
//! next to the catalog when requested; the human line goes to the console.

use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Schema version for the run summary
pub const SUMMARY_SCHEMA_VERSION: u32 = 1;

/// Schema identifier for the run summary
pub const SUMMARY_SCHEMA_ID: &str = "mapcat/run_summary@1";

/// Summary of one catalog build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Schema version
    pub schema_version: u32,

    /// Schema identifier
    pub schema_id: String,

    /// Run identifier
    pub run_id: String,

    /// When the summary was created
    pub created_at: DateTime<Utc>,

    /// Maps discovered under the maps tree
    pub maps_discovered: usize,

    /// Records emitted into the catalog
    pub maps_emitted: usize,

    /// Maps excluded for missing titles
    pub titles_missing: usize,

    /// Diagnostic notes appended to the catalog
    pub notes_recorded: usize,

    /// SHA-256 of the legacy catalog consumed as fallback source
    pub legacy_catalog_sha256: String,

    /// SHA-256 of the written catalog
    pub output_sha256: String,

    /// Where the catalog was written
    pub output_path: String,

    /// Wall-clock duration of the build in milliseconds
    pub duration_ms: u64,

    /// Human-readable summary
    pub human_summary: String,
}

impl RunSummary {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        run_id: String,
        maps_discovered: usize,
        maps_emitted: usize,
        titles_missing: usize,
        notes_recorded: usize,
        legacy_catalog_sha256: String,
        output_sha256: String,
        output_path: String,
        duration_ms: u64,
    ) -> Self {
        let human_summary = Self::generate_human_summary(
            maps_emitted,
            maps_discovered,
            titles_missing,
            notes_recorded,
            &output_path,
        );
        Self {
            schema_version: SUMMARY_SCHEMA_VERSION,
            schema_id: SUMMARY_SCHEMA_ID.to_string(),
            run_id,
            created_at: Utc::now(),
            maps_discovered,
            maps_emitted,
            titles_missing,
            notes_recorded,
            legacy_catalog_sha256,
            output_sha256,
            output_path,
            duration_ms,
            human_summary,
        }
    }

    fn generate_human_summary(
        emitted: usize,
        discovered: usize,
        missing: usize,
        notes: usize,
        output_path: &str,
    ) -> String {
        let mut line = format!("Built {} with {}/{} maps", output_path, emitted, discovered);
        if missing > 0 {
            line.push_str(&format!(", {} excluded for missing titles", missing));
        }
        if notes > 0 {
            line.push_str(&format!(
                ", {} note(s) on missing data appended to the end of the file",
                notes
            ));
        }
        line
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write to file
    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let json = self
            .to_json()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("JSON error: {}", e)))?;
        fs::write(path, json)
    }
}

/// Generate a new run_id using ULID (sortable, filesystem-safe)
pub fn generate_run_id() -> String {
    ulid::Ulid::new().to_string().to_lowercase()
}

/// SHA-256 digest of a file's raw bytes, hex-encoded
pub fn sha256_file(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}
