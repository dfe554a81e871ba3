//! Title matching for search.
//!
//! Both sides are folded the same way before comparison: transliterated to
//! ASCII (so `é` becomes `e`) and lowercased.

use unidecode::unidecode;

/// Fold text for case- and diacritic-insensitive comparison
pub fn fold_for_search(text: &str) -> String {
    unidecode(text).to_lowercase()
}

/// True when `title` contains an already folded needle
pub fn title_matches(title: &str, folded_needle: &str) -> bool {
    fold_for_search(title).contains(folded_needle)
}
