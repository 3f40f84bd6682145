//! Catalog build pipeline
//!
//! Orchestrates one full regeneration: discover maps, resolve titles, gate
//! on unresolved ones, sort, reconcile each map in order, append diagnostic
//! notes, write the catalog. Single-threaded and synchronous; the legacy
//! catalog and the map files are read-only for the whole run, the output is
//! the only thing mutated.
//!
//! The output file is seeded from the base template before the
//! reconciliation loop starts, so an unwritable destination aborts the run
//! up front instead of after minutes of work.

use std::io;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::{CatalogConfig, ConfigError};
use crate::discovery::{self, DiscoveredMap, DiscoveryError};
use crate::notes::Notes;
use crate::reconcile::Reconciler;
use crate::store::{IniDocument, StoreError};
use crate::summary::{self, RunSummary};
use crate::title::{self, MissingTitle, TitleOutcome, TitleResolver};

/// Errors that abort a catalog build
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("output {0} already exists (pass --force to overwrite)")]
    OutputExists(PathBuf),

    #[error("run aborted: {0} map(s) have no valid title")]
    Aborted(usize),

    #[error("failed to write report {path}: {source}")]
    Report { path: PathBuf, source: io::Error },

    #[error("failed to digest {path}: {source}")]
    Digest { path: PathBuf, source: io::Error },
}

/// Decision point invoked once when some maps have no resolvable title.
///
/// The core only asks; turning this into a prompt, a flag, or an API
/// response is the surrounding shell's business.
pub trait ConfirmGate {
    /// `true` to proceed excluding the listed maps, `false` to abort
    fn confirm_exclusion(&self, missing: &[MissingTitle]) -> bool;
}

/// Gate that always proceeds (`--yes`, tests)
pub struct AssumeYes;

impl ConfirmGate for AssumeYes {
    fn confirm_exclusion(&self, _missing: &[MissingTitle]) -> bool {
        true
    }
}

/// Gate that always aborts
pub struct DenyAll;

impl ConfirmGate for DenyAll {
    fn confirm_exclusion(&self, _missing: &[MissingTitle]) -> bool {
        false
    }
}

/// A map that survived title resolution
struct ResolvedMap {
    map: DiscoveredMap,
    title: String,
}

/// Build the catalog described by `config`.
///
/// `force` allows overwriting an existing output file. Returns the run
/// summary; the catalog, the missing-title report (when applicable), and
/// nothing else have been written on success.
pub fn build_catalog(
    config: &CatalogConfig,
    gate: &dyn ConfirmGate,
    force: bool,
) -> Result<RunSummary, BuildError> {
    let started = Instant::now();

    config.validate()?;
    let legacy = IniDocument::from_file(&config.legacy_path())?;
    let base = IniDocument::from_file(&config.base_template)?;

    // Phase 1: discovery
    let discovered = discovery::scan_maps(&config.root, &config.maps_path())?;
    let maps_discovered = discovered.len();

    // Phase 2: title resolution; titleless maps are collected, not dropped
    // silently
    let resolver = TitleResolver::new();
    let mut resolved = Vec::new();
    let mut missing = Vec::new();
    for map in discovered {
        let own = IniDocument::from_file(&map.path)?;
        let outcome = resolver.resolve(
            &map.section,
            own.get("Basic", "Name"),
            legacy.get(&map.section, "Description"),
        );
        match outcome {
            TitleOutcome::Resolved(title) => resolved.push(ResolvedMap { map, title }),
            TitleOutcome::Missing(entry) => missing.push(entry),
        }
    }

    // Phase 3: the confirm-or-abort gate. Declined means no output at all.
    if !missing.is_empty() {
        let report = title::missing_report_json(&missing).map_err(|e| BuildError::Report {
            path: config.missing_report.clone(),
            source: io::Error::new(io::ErrorKind::InvalidData, e),
        })?;
        std::fs::write(&config.missing_report, report).map_err(|source| BuildError::Report {
            path: config.missing_report.clone(),
            source,
        })?;
        if !gate.confirm_exclusion(&missing) {
            return Err(BuildError::Aborted(missing.len()));
        }
    }

    // Phase 4: deterministic order. Title first, path as tiebreaker; paths
    // are unique, so this is a strict total order.
    resolved.sort_by_key(|r| format!("{}{}", r.title, r.map.path.to_string_lossy()));

    // Phase 5: seed the output. Failing to create it is fatal before any
    // reconciliation happens.
    if config.output.exists() && !force {
        return Err(BuildError::OutputExists(config.output.clone()));
    }
    let mut doc = base;
    doc.write_to_file(&config.output)?;

    // Phase 6: reconcile and emit, one map at a time, in order
    let reconciler = Reconciler::new();
    let mut notes = Notes::new();
    for (index, item) in resolved.iter().enumerate() {
        doc.set("MultiMaps", &index.to_string(), &item.map.section);

        let own = IniDocument::from_file(&item.map.path)?;
        let record = reconciler.reconcile(
            &item.map.section,
            &item.title,
            &item.map.path,
            &own,
            &legacy,
            &mut notes,
        );
        record.emit(&mut doc);
    }

    // Phase 7: diagnostic notes become trailing comments, emission order
    for note in notes.entries() {
        doc.append_trailing_comment(note);
    }
    doc.write_to_file(&config.output)?;

    let legacy_digest =
        summary::sha256_file(&config.legacy_path()).map_err(|source| BuildError::Digest {
            path: config.legacy_path(),
            source,
        })?;
    let output_digest =
        summary::sha256_file(&config.output).map_err(|source| BuildError::Digest {
            path: config.output.clone(),
            source,
        })?;

    Ok(RunSummary::new(
        summary::generate_run_id(),
        maps_discovered,
        resolved.len(),
        missing.len(),
        notes.len(),
        legacy_digest,
        output_digest,
        config.output.display().to_string(),
        started.elapsed().as_millis() as u64,
    ))
}
