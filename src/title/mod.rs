//! Canonical title resolution
//!
//! Every emitted catalog record needs a display title of the form
//! `[<digit>] <text>`; the leading bracket carries the player count the
//! lobby sorts on. The map's own `[Basic] Name` wins outright when it
//! conforms; otherwise the legacy catalog's `Description` for the derived
//! section is tried. Items with no conforming title from either source are
//! excluded from the catalog and reported instead.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

/// Pattern a canonical display title must match
const TITLE_PATTERN: &str = r"^\[\d\] \S.+$";

/// An item for which neither source yielded a conforming title
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingTitle {
    /// Section name derived from the map path
    pub section: String,
    /// Raw `[Basic] Name` from the map, if any
    pub name_in_map: Option<String>,
    /// Raw `Description` from the legacy catalog, if any
    pub name_in_legacy: Option<String>,
}

impl MissingTitle {
    /// One-line console rendering
    pub fn to_human(&self) -> String {
        let shown = |v: &Option<String>| match v {
            Some(raw) => format!("\"{}\"", raw),
            None => "not found".to_string(),
        };
        format!(
            "{}: name in map was {}, name in catalog was {}",
            self.section,
            shown(&self.name_in_map),
            shown(&self.name_in_legacy)
        )
    }
}

/// Outcome of resolving one item's title
#[derive(Debug, Clone)]
pub enum TitleOutcome {
    Resolved(String),
    Missing(MissingTitle),
}

/// Two-source title resolver
pub struct TitleResolver {
    pattern: Regex,
}

impl Default for TitleResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl TitleResolver {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(TITLE_PATTERN).unwrap(),
        }
    }

    /// Whether a string is a canonical title
    pub fn is_canonical(&self, title: &str) -> bool {
        self.pattern.is_match(title)
    }

    /// Resolve a title from the map's own name and the legacy description.
    ///
    /// The map's own name takes absolute priority when conforming; legacy
    /// content is never consulted in that case.
    pub fn resolve(
        &self,
        section: &str,
        own: Option<&str>,
        legacy: Option<&str>,
    ) -> TitleOutcome {
        if let Some(name) = own {
            if self.is_canonical(name) {
                return TitleOutcome::Resolved(name.to_string());
            }
        }
        if let Some(description) = legacy {
            if self.is_canonical(description) {
                return TitleOutcome::Resolved(description.to_string());
            }
        }
        TitleOutcome::Missing(MissingTitle {
            section: section.to_string(),
            name_in_map: own.map(str::to_string),
            name_in_legacy: legacy.map(str::to_string),
        })
    }
}

/// Serialize the missing-title report
pub fn missing_report_json(missing: &[MissingTitle]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(missing)
}
