//! Game-mode list normalization
//!
//! Map authors write mode lists in every capitalization imaginable, and many
//! older maps still use the pre-rename mode `standard`. The catalog stores
//! the normalized form: `standard` renamed to `battle` (first occurrence),
//! then every word title-cased.

/// Normalize a raw game-mode list for the catalog
pub fn normalize(raw: &str) -> String {
    title_case(&raw.replacen("standard", "battle", 1))
}

/// Capitalize the first letter of each word, lowercasing the rest.
///
/// A word is a maximal run of ASCII letters; any other character ends it.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut cap_next = true;
    for c in s.chars() {
        if cap_next {
            if c.is_ascii_alphabetic() {
                out.push(c.to_ascii_uppercase());
                cap_next = false;
            } else {
                out.push(c);
            }
        } else if c.is_ascii_alphabetic() {
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
            cap_next = true;
        }
    }
    out
}
