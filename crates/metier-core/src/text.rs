//! Text normalization for accent-insensitive matching.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Fold `value` for comparison: trim, decompose, drop diacritics, lowercase.
///
/// `"Études"` and `"etudes"` normalize to the same string.
pub fn normalize_for_search(value: &str) -> String {
    value
        .trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}
