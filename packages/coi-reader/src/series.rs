//! Series-name canonicalization and alignment.
//!
//! Free-text preferred-stock labels ("Series B Preferred Stock", "Series
//! A-1", "Seed Preferred Stock") reduce to a short canonical token ("B",
//! "A-1", "Seed"). Two labels denote the same series iff their tokens are
//! string-equal. Tokens are derived on every pass and never stored.
//!
//! Equality is on the whole token, hyphenated suffix included, so "A" never
//! matches "A-1". Mapping iteration order is insertion order (`IndexMap`), so
//! when two mapping keys genuinely carry the same token the first inserted
//! wins, deterministically.

use indexmap::IndexMap;
use regex::Regex;

/// Token pattern: uppercase run with optional digits and hyphenated
/// suffixes, the literal "Seed", or a bare number. The parenthetical branch
/// cannot end at the trailing `\b` (a `)` before a space or end of string is
/// no word boundary), so "Series FF(A1)" tokenizes as "FF"; both sides of an
/// alignment reduce the same way, so such labels still join.
const SERIES_TOKEN: &str = r"\b(?:[A-Z]+(?:\d+)?(?:\([A-Z0-9]+\))?(?:-[A-Z0-9]+)*|Seed|\d+)\b";

fn token_pattern() -> Regex {
    Regex::new(SERIES_TOKEN).unwrap()
}

/// Extract the canonical token from a series label.
///
/// Returns the first pattern match, or `None` for labels with no
/// recognizable token (lowercase prose, empty strings).
///
/// ```
/// use coi_reader::canonical_token;
///
/// assert_eq!(canonical_token("Series B Preferred Stock"), Some("B".to_string()));
/// assert_eq!(canonical_token("Series A-1"), Some("A-1".to_string()));
/// assert_eq!(canonical_token("Seed Preferred Stock"), Some("Seed".to_string()));
/// ```
pub fn canonical_token(label: &str) -> Option<String> {
    token_pattern()
        .find(label)
        .map(|m| m.as_str().to_string())
}

/// Align a per-field mapping against a reference series list.
///
/// For every reference label, exactly one entry in reference order: the value
/// of the first mapping key whose canonical token equals the reference's
/// token, or `None` when nothing matches. Unmatched mapping keys produce no
/// entries. A reference without a match is not an error; the caller decides
/// the sentinel.
pub fn align_series<'m, V>(
    references: &[String],
    mapping: &'m IndexMap<String, V>,
) -> IndexMap<String, Option<&'m V>> {
    let pattern = token_pattern();

    // Tokenize mapping keys once, preserving insertion order.
    let keyed: Vec<(Option<&str>, &'m V)> = mapping
        .iter()
        .map(|(k, v)| (pattern.find(k).map(|m| m.as_str()), v))
        .collect();

    references
        .iter()
        .map(|reference| {
            let token = pattern.find(reference).map(|m| m.as_str());
            let value = token.and_then(|t| {
                keyed
                    .iter()
                    .find(|(key_token, _)| *key_token == Some(t))
                    .map(|(_, v)| *v)
            });
            (reference.clone(), value)
        })
        .collect()
}
