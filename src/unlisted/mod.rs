//! Release-manifest freshness check
//!
//! Map releases also have to be listed in the client's version manifest or
//! they never reach players. `find_unlisted` compares the discovered release
//! files (maps and previews) against the manifest's entries and returns the
//! paths the manifest does not know about yet.

use std::collections::HashSet;
use std::io;
use std::path::Path;

/// Release files whose paths are absent from the manifest.
///
/// Only manifest lines under `maps_prefix` participate; `release_files` are
/// root-relative paths in discovery order, which the result preserves.
pub fn find_unlisted(manifest: &str, maps_prefix: &str, release_files: &[String]) -> Vec<String> {
    let listed: HashSet<&str> = manifest
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| line.starts_with(maps_prefix))
        .collect();

    release_files
        .iter()
        .filter(|path| !listed.contains(path.as_str()))
        .cloned()
        .collect()
}

/// Write the unlisted paths, one per line
pub fn write_report(path: &Path, unlisted: &[String]) -> io::Result<()> {
    let mut content = unlisted.join("\n");
    if !content.is_empty() {
        content.push('\n');
    }
    std::fs::write(path, content)
}
