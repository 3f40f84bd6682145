//! Field reconciliation engine
//!
//! For each map that survived title resolution, this module merges the map's
//! own fields with the legacy catalog entry into one `ReconciledRecord`,
//! field by field. Every field has its own source priority: some trust the
//! legacy catalog first (authors and mode lists get curated there), some
//! trust the map first, and the coop flag combines both. The asymmetry is
//! deliberate and part of the output contract; do not unify it.
//!
//! Failures degrade per field: a default plus a note, or omission. Nothing
//! here fails the item.

mod coop;
mod lookup;
mod modes;

pub use coop::{is_coop, EnemyHouseChain, EnemyHouses};
pub use lookup::Lookup;
pub use modes::normalize as normalize_game_modes;

use std::path::Path;

use regex_lite::Regex;

use crate::notes::Notes;
use crate::preview::{self, PreviewError};
use crate::store::IniDocument;

/// Pattern for auto-generated placeholder briefings that carry no content
const PLACEHOLDER_BRIEFING_PATTERN: &str = r"^Brief:(ALL|TRN)\d{2}(md)?$";

/// Author substituted when neither source has one
const DEFAULT_AUTHOR: &str = "Unknown Author";

/// Game-mode list substituted when neither source has one
const DEFAULT_GAME_MODES: &str = "Battle";

/// Coop-only fields of a record
#[derive(Debug, Clone, Default)]
pub struct CoopRecord {
    pub disallowed_sides: Option<String>,
    pub disallowed_colors: Option<String>,
    /// Enemy-house entries, verbatim, indexed from zero
    pub enemy_houses: Vec<String>,
}

/// One fully reconciled catalog record, ready for emission
#[derive(Debug, Clone)]
pub struct ReconciledRecord {
    pub section: String,
    pub description: String,
    pub author: String,
    pub briefing: Option<String>,
    pub game_modes: String,
    pub coop: Option<CoopRecord>,
    /// Surviving waypoints: present and not coop-excluded, positional
    /// indices preserved
    pub waypoints: Vec<(u32, String)>,
    pub min_players: u32,
    pub max_players: u32,
    pub forced_options: Option<Vec<String>>,
    pub forced_spawn_options: Option<Vec<String>>,
    /// Copied verbatim; empty when the map has none
    pub size: String,
    pub local_size: String,
    pub preview_size: Option<(u32, u32)>,
}

impl ReconciledRecord {
    /// Write the record into the aggregate document.
    ///
    /// Key order matches the legacy tool; downstream parsers are not
    /// supposed to care, but diffs against old catalogs should stay clean.
    pub fn emit(&self, doc: &mut IniDocument) {
        let section = self.section.as_str();

        doc.set(section, "Description", &self.description);
        doc.set(section, "Author", &self.author);
        if let Some(briefing) = &self.briefing {
            doc.set(section, "Briefing", briefing);
        }
        doc.set(section, "GameModes", &self.game_modes);

        if let Some(coop) = &self.coop {
            doc.set(section, "IsCoopMission", "yes");
            if let Some(sides) = &coop.disallowed_sides {
                doc.set(section, "DisallowedPlayerSides", sides);
            }
            if let Some(colors) = &coop.disallowed_colors {
                doc.set(section, "DisallowedPlayerColors", colors);
            }
            for (index, entry) in coop.enemy_houses.iter().enumerate() {
                doc.set(section, &format!("EnemyHouse{}", index), entry);
            }
        }

        for (index, value) in &self.waypoints {
            doc.set(section, &format!("Waypoint{}", index), value);
        }
        doc.set(section, "MinPlayers", &self.min_players.to_string());
        doc.set(section, "MaxPlayers", &self.max_players.to_string());
        doc.set(section, "EnforceMaxPlayers", "True");

        if let Some(block) = &self.forced_options {
            let name = format!("ForcedOptions-{}", section);
            doc.set(section, "ForcedOptions", &name);
            doc.set_raw_section(&name, block);
        }
        if let Some(block) = &self.forced_spawn_options {
            let name = format!("ForcedSpawnIniOptions-{}", section);
            doc.set(section, "ForcedSpawnIniOptions", &name);
            doc.set_raw_section(&name, block);
        }

        doc.set(section, "Size", &self.size);
        doc.set(section, "LocalSize", &self.local_size);
        if let Some((width, height)) = self.preview_size {
            doc.set(section, "PreviewSize", &format!("{},{}", width, height));
        }
    }
}

/// The per-item merge engine
pub struct Reconciler {
    placeholder_briefing: Regex,
    enemy_houses: EnemyHouses,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl Reconciler {
    pub fn new() -> Self {
        Self {
            placeholder_briefing: Regex::new(PLACEHOLDER_BRIEFING_PATTERN).unwrap(),
            enemy_houses: EnemyHouses::new(),
        }
    }

    /// Reconcile every field of one map into a record.
    ///
    /// `title` has already been resolved (§title); `own` is the map's parsed
    /// description, `legacy` the previous catalog. Fallbacks and omissions
    /// are recorded in `notes` as they happen.
    pub fn reconcile(
        &self,
        section: &str,
        title: &str,
        map_path: &Path,
        own: &IniDocument,
        legacy: &IniDocument,
        notes: &mut Notes,
    ) -> ReconciledRecord {
        // Author: the legacy catalog is curated, so it wins over the map
        let author = match Lookup::start()
            .then(legacy.get(section, "Author"))
            .then(own.get("Basic", "Author"))
            .found()
        {
            Some(author) => author.to_string(),
            None => {
                notes.record(format!(
                    "{} missing Author, set to \"{}\"",
                    section, DEFAULT_AUTHOR
                ));
                DEFAULT_AUTHOR.to_string()
            }
        };

        // Briefing: the map wins unless its briefing is a generated
        // placeholder; omitted entirely when both sources come up empty
        let briefing = Lookup::start()
            .then_if(own.get("Basic", "Briefing"), |v| {
                !self.placeholder_briefing.is_match(v)
            })
            .then(legacy.get(section, "Briefing"))
            .found()
            .map(str::to_string);

        // Game modes: legacy first (many maps never set theirs correctly),
        // normalized either way
        let raw_modes = match Lookup::start()
            .then(legacy.get(section, "GameModes"))
            .then(own.get("Basic", "GameMode"))
            .found()
        {
            Some(modes) => modes.to_string(),
            None => {
                notes.record(format!(
                    "{} missing GameModes, set to \"{}\"",
                    section, DEFAULT_GAME_MODES
                ));
                DEFAULT_GAME_MODES.to_string()
            }
        };
        let game_modes = normalize_game_modes(&raw_modes);

        // Coop block, and the waypoint exclusions it implies
        let mut excluded = std::collections::BTreeSet::new();
        let coop = if is_coop(
            own.get("Basic", "IsCoopMission"),
            legacy.get(section, "IsCoopMission"),
        ) {
            let mut record = CoopRecord::default();

            for (key, slot) in [
                ("DisallowedPlayerSides", &mut record.disallowed_sides),
                ("DisallowedPlayerColors", &mut record.disallowed_colors),
            ] {
                match Lookup::start()
                    .then(own.get("Basic", key))
                    .then(legacy.get(section, key))
                    .found()
                {
                    Some(value) => *slot = Some(value.to_string()),
                    None => notes.record(format!("{} missing {}", section, key)),
                }
            }

            match self.enemy_houses.read_chain(own, legacy, section) {
                EnemyHouseChain::Entries(entries) => {
                    excluded = self.enemy_houses.excluded_waypoints(&entries);
                    record.enemy_houses = entries;
                }
                EnemyHouseChain::Invalid => {
                    notes.record(format!(
                        "{} missing EnemyHouse entries (this has affected Waypoint entries as well)",
                        section
                    ));
                }
            }

            Some(record)
        } else {
            None
        };

        // Start waypoints: indices 0..8 while present, stop at the first
        // gap; coop-excluded positions are dropped without renumbering
        let mut present = 0u32;
        let mut waypoints = Vec::new();
        for index in 0..=8u32 {
            match own.get("Waypoints", &index.to_string()) {
                Some(value) => {
                    present += 1;
                    if !excluded.contains(&index) {
                        waypoints.push((index, value.to_string()));
                    }
                }
                None => break,
            }
        }
        let max_players = present.saturating_sub(excluded.len() as u32);

        // Forced option blocks: map only, omitted silently when absent
        let forced_options = own.raw_section("ForcedOptions");
        let forced_spawn_options = own.raw_section("ForcedSpawnIniOptions");

        // Sizes are copied verbatim; an absent size stays an empty string
        let size = own.get("Map", "Size").unwrap_or_default().to_string();
        let local_size = own.get("Map", "LocalSize").unwrap_or_default().to_string();

        // Preview dimensions come from the companion image header
        let preview_size = match preview::png_dimensions(&preview::preview_path(map_path)) {
            Ok(dims) => Some(dims),
            Err(PreviewError::NotFound(_) | PreviewError::NotPng(_) | PreviewError::Read { .. }) => {
                notes.record(format!("{} missing PreviewSize", section));
                None
            }
        };

        ReconciledRecord {
            section: section.to_string(),
            description: title.to_string(),
            author,
            briefing,
            game_modes,
            coop,
            waypoints,
            min_players: 2,
            max_players,
            forced_options,
            forced_spawn_options,
            size,
            local_size,
            preview_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn reconcile(own: &str, legacy: &str) -> (ReconciledRecord, Notes) {
        let own = IniDocument::parse(own);
        let legacy = IniDocument::parse(legacy);
        let mut notes = Notes::new();
        let record = Reconciler::new().reconcile(
            "Maps/a",
            "[2] Some Map",
            &PathBuf::from("/nonexistent/Maps/a.map"),
            &own,
            &legacy,
            &mut notes,
        );
        (record, notes)
    }

    #[test]
    fn test_author_prefers_legacy() {
        let (record, _) = reconcile(
            "[Basic]\nAuthor=Map Author\n",
            "[Maps/a]\nAuthor=Catalog Author\n",
        );
        assert_eq!(record.author, "Catalog Author");
    }

    #[test]
    fn test_author_falls_back_to_map() {
        let (record, _) = reconcile("[Basic]\nAuthor=Map Author\n", "[Maps/a]\n");
        assert_eq!(record.author, "Map Author");
    }

    #[test]
    fn test_author_default_records_one_note() {
        let (record, notes) = reconcile("[Basic]\n", "[Maps/a]\n");
        assert_eq!(record.author, "Unknown Author");
        let author_notes: Vec<_> = notes
            .entries()
            .iter()
            .filter(|n| n.contains("Author"))
            .collect();
        assert_eq!(author_notes.len(), 1);
        assert_eq!(
            author_notes[0],
            "Maps/a missing Author, set to \"Unknown Author\""
        );
    }

    #[test]
    fn test_briefing_placeholder_rejected() {
        let (record, notes) = reconcile(
            "[Basic]\nBriefing=Brief:ALL03md\n",
            "[Maps/a]\nBriefing=Real briefing text\n",
        );
        assert_eq!(record.briefing.as_deref(), Some("Real briefing text"));
        assert!(notes.is_empty() || !notes.entries().iter().any(|n| n.contains("Briefing")));
    }

    #[test]
    fn test_briefing_omitted_without_note() {
        let (record, notes) = reconcile("[Basic]\nBriefing=Brief:TRN12\n", "[Maps/a]\n");
        assert_eq!(record.briefing, None);
        assert!(!notes.entries().iter().any(|n| n.contains("Briefing")));
    }

    #[test]
    fn test_briefing_own_wins_when_real() {
        let (record, _) = reconcile(
            "[Basic]\nBriefing=From the map\n",
            "[Maps/a]\nBriefing=From the catalog\n",
        );
        assert_eq!(record.briefing.as_deref(), Some("From the map"));
    }

    #[test]
    fn test_game_modes_legacy_first_and_normalized() {
        let (record, _) = reconcile(
            "[Basic]\nGameMode=meat grinder\n",
            "[Maps/a]\nGameModes=standard, infantry\n",
        );
        assert_eq!(record.game_modes, "Battle, Infantry");
    }

    #[test]
    fn test_game_modes_default_with_note() {
        let (record, notes) = reconcile("[Basic]\n", "[Maps/a]\n");
        assert_eq!(record.game_modes, "Battle");
        assert!(notes
            .entries()
            .iter()
            .any(|n| n == "Maps/a missing GameModes, set to \"Battle\""));
    }

    #[test]
    fn test_non_coop_skips_coop_fields() {
        let (record, notes) = reconcile(
            "[Basic]\nIsCoopMission=no\nDisallowedPlayerSides=1,2\n",
            "[Maps/a]\n",
        );
        assert!(record.coop.is_none());
        assert!(!notes.entries().iter().any(|n| n.contains("Disallowed")));
    }

    #[test]
    fn test_coop_exclusions_and_max_players() {
        let own = "\
[Basic]
IsCoopMission=yes
DisallowedPlayerSides=0,1
DisallowedPlayerColors=2
EnemyHouse0=0,0,6
EnemyHouse1=1,1,7
[Waypoints]
0=100
1=101
2=102
3=103
4=104
5=105
6=106
7=107
";
        let (record, _) = reconcile(own, "[Maps/a]\n");
        let coop = record.coop.expect("coop record");
        assert_eq!(coop.enemy_houses, vec!["0,0,6", "1,1,7"]);

        // 8 present waypoints, 2 excluded
        assert_eq!(record.max_players, 6);
        let indices: Vec<u32> = record.waypoints.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_invalid_enemy_houses_degrade_to_no_exclusions() {
        let own = "\
[Basic]
IsCoopMission=yes
DisallowedPlayerSides=0
DisallowedPlayerColors=0
EnemyHouse0=bogus
[Waypoints]
0=100
1=101
";
        let (record, notes) = reconcile(own, "[Maps/a]\n");
        assert!(record.coop.as_ref().unwrap().enemy_houses.is_empty());
        assert_eq!(record.max_players, 2);
        assert!(notes
            .entries()
            .iter()
            .any(|n| n.contains("missing EnemyHouse entries")));
    }

    #[test]
    fn test_missing_disallowed_lists_noted() {
        let (record, notes) = reconcile("[Basic]\nIsCoopMission=yes\n", "[Maps/a]\n");
        let coop = record.coop.expect("coop record");
        assert!(coop.disallowed_sides.is_none());
        assert!(coop.disallowed_colors.is_none());
        assert!(notes
            .entries()
            .iter()
            .any(|n| n == "Maps/a missing DisallowedPlayerSides"));
        assert!(notes
            .entries()
            .iter()
            .any(|n| n == "Maps/a missing DisallowedPlayerColors"));
    }

    #[test]
    fn test_waypoints_stop_at_first_gap() {
        let own = "[Waypoints]\n0=100\n1=101\n3=103\n";
        let (record, _) = reconcile(own, "[Maps/a]\n");
        assert_eq!(record.waypoints.len(), 2);
        assert_eq!(record.max_players, 2);
        assert_eq!(record.min_players, 2);
    }

    #[test]
    fn test_sizes_verbatim_or_empty() {
        let (record, notes) = reconcile("[Map]\nSize=0,0,120,120\n", "[Maps/a]\n");
        assert_eq!(record.size, "0,0,120,120");
        assert_eq!(record.local_size, "");
        assert!(!notes.entries().iter().any(|n| n.contains("Size")
            && !n.contains("PreviewSize")));
    }

    #[test]
    fn test_missing_preview_noted_and_omitted() {
        let (record, notes) = reconcile("[Basic]\n", "[Maps/a]\n");
        assert_eq!(record.preview_size, None);
        assert!(notes
            .entries()
            .iter()
            .any(|n| n == "Maps/a missing PreviewSize"));
    }

    #[test]
    fn test_emit_key_order_and_constants() {
        let (record, _) = reconcile(
            "[Basic]\nAuthor=A\n[Waypoints]\n0=100\n1=101\n[Map]\nSize=0,0,1,1\n",
            "[Maps/a]\n",
        );
        let mut doc = IniDocument::new();
        record.emit(&mut doc);

        assert_eq!(doc.get("Maps/a", "Description"), Some("[2] Some Map"));
        assert_eq!(doc.get("Maps/a", "MinPlayers"), Some("2"));
        assert_eq!(doc.get("Maps/a", "MaxPlayers"), Some("2"));
        assert_eq!(doc.get("Maps/a", "EnforceMaxPlayers"), Some("True"));

        let rendered = doc.render();
        let pos = |key: &str| rendered.find(key).unwrap();
        assert!(pos("Description=") < pos("Author="));
        assert!(pos("Author=") < pos("GameModes="));
        assert!(pos("GameModes=") < pos("Waypoint0="));
        assert!(pos("Waypoint0=") < pos("MinPlayers="));
        assert!(pos("MaxPlayers=") < pos("EnforceMaxPlayers="));
        assert!(pos("EnforceMaxPlayers=") < pos("Size="));
        assert!(pos("Size=") < pos("LocalSize="));
    }

    #[test]
    fn test_emit_forced_blocks() {
        let own = "\
[ForcedOptions]
Crates=no
[ForcedSpawnIniOptions]
Ra2Mode=yes
";
        let (record, _) = reconcile(own, "[Maps/a]\n");
        let mut doc = IniDocument::new();
        record.emit(&mut doc);

        assert_eq!(
            doc.get("Maps/a", "ForcedOptions"),
            Some("ForcedOptions-Maps/a")
        );
        assert_eq!(doc.get("ForcedOptions-Maps/a", "Crates"), Some("no"));
        assert_eq!(
            doc.get("Maps/a", "ForcedSpawnIniOptions"),
            Some("ForcedSpawnIniOptions-Maps/a")
        );
        assert_eq!(doc.get("ForcedSpawnIniOptions-Maps/a", "Ra2Mode"), Some("yes"));
    }
}
