//! mapcat - Multiplayer map catalog regenerator
//!
//! This crate rebuilds a client's multiplayer map catalog from the map files
//! themselves plus the previous catalog, reconciling each field with
//! per-field source priority, format validation, and defaulting. Maps
//! without a resolvable display title are excluded behind a confirm-or-abort
//! gate; every fallback taken along the way is appended to the catalog as a
//! trailing comment.

pub mod config;
pub mod discovery;
pub mod notes;
pub mod pipeline;
pub mod preview;
pub mod reconcile;
pub mod store;
pub mod summary;
pub mod title;
pub mod unlisted;

pub use config::{CatalogConfig, ConfigError, ConfigOverrides};
pub use pipeline::{build_catalog, AssumeYes, BuildError, ConfirmGate};
pub use store::IniDocument;
pub use summary::RunSummary;
pub use title::{MissingTitle, TitleResolver};
