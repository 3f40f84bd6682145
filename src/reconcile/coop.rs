//! Cooperative-mission fields
//!
//! Coop maps reserve some start positions for computer-controlled enemy
//! houses. Each enemy-house entry is `<house>,<color>,<waypoint>` with an
//! optional trailing comment; the waypoint named by the entry's final digit
//! must not be offered to players. This module derives the coop flag, reads
//! the enemy-house chain, and computes the excluded waypoint set.

use std::collections::BTreeSet;

use regex_lite::Regex;

use crate::store::IniDocument;

/// Pattern a well-formed enemy-house entry must match; group 1 is the
/// entry with any trailing comment stripped
const ENEMY_HOUSE_PATTERN: &str = r"^(\d+,\d+,\d+)\s*;?.*$";

/// Outcome of reading a map's enemy-house chain
#[derive(Debug, Clone, PartialEq)]
pub enum EnemyHouseChain {
    /// Entries 0..n, in index order, from a single source
    Entries(Vec<String>),
    /// Entry 0 was invalid in both sources; no coop derivation possible
    Invalid,
}

/// Whether either source declares the map a coop mission.
///
/// `yes` and `true` are equivalent, case-insensitively, and either source
/// saying so wins; a legacy `yes` turns coop on even when the map itself
/// says `no`.
pub fn is_coop(own: Option<&str>, legacy: Option<&str>) -> bool {
    let affirmative = |v: &str| {
        let lower = v.to_ascii_lowercase();
        lower == "yes" || lower == "true"
    };
    own.is_some_and(affirmative) || legacy.is_some_and(affirmative)
}

/// Reader for enemy-house chains and waypoint exclusions
pub struct EnemyHouses {
    pattern: Regex,
}

impl Default for EnemyHouses {
    fn default() -> Self {
        Self::new()
    }
}

impl EnemyHouses {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(ENEMY_HOUSE_PATTERN).unwrap(),
        }
    }

    /// Read the enemy-house chain for one map.
    ///
    /// Entry 0 decides the source: the map's own entry if well-formed,
    /// otherwise the legacy entry. The switch is all-or-nothing; once the
    /// legacy source is chosen, every later index reads from legacy too.
    /// Later entries are taken verbatim while present, without
    /// re-validation, up to index 8.
    pub fn read_chain(
        &self,
        own: &IniDocument,
        legacy: &IniDocument,
        section: &str,
    ) -> EnemyHouseChain {
        let own_first = own
            .get("Basic", "EnemyHouse0")
            .filter(|v| self.pattern.is_match(v));

        let (use_legacy, first) = match own_first {
            Some(v) => (false, v),
            None => {
                match legacy
                    .get(section, "EnemyHouse0")
                    .filter(|v| self.pattern.is_match(v))
                {
                    Some(v) => (true, v),
                    None => return EnemyHouseChain::Invalid,
                }
            }
        };

        let mut entries = vec![first.to_string()];
        for index in 1..=8 {
            let key = format!("EnemyHouse{}", index);
            let next = if use_legacy {
                legacy.get(section, &key)
            } else {
                own.get("Basic", &key)
            };
            match next {
                Some(v) => entries.push(v.to_string()),
                None => break,
            }
        }

        EnemyHouseChain::Entries(entries)
    }

    /// The waypoint indices reserved for enemy houses.
    ///
    /// The final character of each comment-stripped entry names a waypoint;
    /// the result is the union across entries. Entries whose final character
    /// is not a digit contribute nothing.
    pub fn excluded_waypoints(&self, entries: &[String]) -> BTreeSet<u32> {
        let mut excluded = BTreeSet::new();
        for entry in entries {
            let stripped = match self.pattern.captures(entry) {
                Some(caps) => caps.get(1).map(|m| m.as_str()).unwrap_or(entry),
                None => entry.as_str(),
            };
            if let Some(waypoint) = stripped.chars().last().and_then(|c| c.to_digit(10)) {
                excluded.insert(waypoint);
            }
        }
        excluded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_coop_flag_from_either_source() {
        assert!(is_coop(Some("yes"), None));
        assert!(is_coop(None, Some("true")));
        assert!(is_coop(Some("YES"), None));
        assert!(is_coop(Some("True"), None));
        assert!(!is_coop(None, None));
        assert!(!is_coop(Some("no"), Some("false")));
    }

    #[test]
    fn test_legacy_true_wins_over_own_no() {
        assert!(is_coop(Some("no"), Some("true")));
    }

    #[test]
    fn test_exclusions_from_entries() {
        let houses = EnemyHouses::new();
        let excluded = houses.excluded_waypoints(&entries(&["1,2,3;comment", "4,5,6"]));
        assert_eq!(excluded, BTreeSet::from([3, 6]));
    }

    #[test]
    fn test_duplicate_waypoints_count_once() {
        let houses = EnemyHouses::new();
        let excluded = houses.excluded_waypoints(&entries(&["1,2,7", "3,4,7"]));
        assert_eq!(excluded, BTreeSet::from([7]));
    }

    #[test]
    fn test_multi_digit_waypoint_uses_final_character() {
        let houses = EnemyHouses::new();
        let excluded = houses.excluded_waypoints(&entries(&["0,0,12"]));
        assert_eq!(excluded, BTreeSet::from([2]));
    }

    #[test]
    fn test_non_digit_final_contributes_nothing() {
        let houses = EnemyHouses::new();
        let excluded = houses.excluded_waypoints(&entries(&["scrambled"]));
        assert!(excluded.is_empty());
    }

    #[test]
    fn test_chain_prefers_own() {
        let own = IniDocument::parse("[Basic]\nEnemyHouse0=1,2,3\nEnemyHouse1=4,5,6\n");
        let legacy = IniDocument::parse("[Maps/a]\nEnemyHouse0=7,7,7\n");
        let houses = EnemyHouses::new();
        assert_eq!(
            houses.read_chain(&own, &legacy, "Maps/a"),
            EnemyHouseChain::Entries(entries(&["1,2,3", "4,5,6"]))
        );
    }

    #[test]
    fn test_chain_switches_whole_source() {
        // own entry 0 is malformed, so the whole chain comes from legacy,
        // even though own has a well-formed entry 1
        let own = IniDocument::parse("[Basic]\nEnemyHouse0=garbage\nEnemyHouse1=1,1,1\n");
        let legacy = IniDocument::parse("[Maps/a]\nEnemyHouse0=2,2,2\nEnemyHouse1=3,3,3\n");
        let houses = EnemyHouses::new();
        assert_eq!(
            houses.read_chain(&own, &legacy, "Maps/a"),
            EnemyHouseChain::Entries(entries(&["2,2,2", "3,3,3"]))
        );
    }

    #[test]
    fn test_chain_invalid_in_both() {
        let own = IniDocument::parse("[Basic]\nEnemyHouse0=garbage\n");
        let legacy = IniDocument::parse("[Maps/a]\n");
        let houses = EnemyHouses::new();
        assert_eq!(
            houses.read_chain(&own, &legacy, "Maps/a"),
            EnemyHouseChain::Invalid
        );
    }

    #[test]
    fn test_chain_stops_at_first_gap() {
        let own =
            IniDocument::parse("[Basic]\nEnemyHouse0=1,1,1\nEnemyHouse2=2,2,2\n");
        let legacy = IniDocument::parse("[Maps/a]\n");
        let houses = EnemyHouses::new();
        assert_eq!(
            houses.read_chain(&own, &legacy, "Maps/a"),
            EnemyHouseChain::Entries(entries(&["1,1,1"]))
        );
    }

    #[test]
    fn test_chain_caps_at_nine_entries() {
        let mut own = String::from("[Basic]\n");
        for i in 0..=9 {
            own.push_str(&format!("EnemyHouse{}=1,1,{}\n", i, i));
        }
        let own = IniDocument::parse(&own);
        let legacy = IniDocument::parse("[Maps/a]\n");
        let houses = EnemyHouses::new();
        match houses.read_chain(&own, &legacy, "Maps/a") {
            EnemyHouseChain::Entries(list) => assert_eq!(list.len(), 9),
            EnemyHouseChain::Invalid => panic!("expected entries"),
        }
    }

    #[test]
    fn test_later_entries_not_revalidated() {
        let own = IniDocument::parse("[Basic]\nEnemyHouse0=1,1,1\nEnemyHouse1=odd value\n");
        let legacy = IniDocument::parse("[Maps/a]\n");
        let houses = EnemyHouses::new();
        assert_eq!(
            houses.read_chain(&own, &legacy, "Maps/a"),
            EnemyHouseChain::Entries(entries(&["1,1,1", "odd value"]))
        );
    }
}
