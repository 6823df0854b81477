//! Occupation identifier parsing.
//!
//! Clients address an occupation either by its code (one uppercase letter
//! followed by four digits, e.g. `M1805`) or by its slug.

use once_cell::sync::Lazy;
use regex::Regex;

static CODE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]\d{4}$").expect("valid occupation code regex"));

/// How an incoming identifier should be looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OccupationIdentifier {
    Code(String),
    Slug(String),
}

impl OccupationIdentifier {
    /// Classify a raw path segment.
    ///
    /// Anything that is not a well-formed code is treated as a slug, trimmed
    /// and lowercased.
    pub fn parse(raw: &str) -> Self {
        if is_occupation_code(raw) {
            OccupationIdentifier::Code(raw.to_string())
        } else {
            OccupationIdentifier::Slug(raw.trim().to_lowercase())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            OccupationIdentifier::Code(c) => c,
            OccupationIdentifier::Slug(s) => s,
        }
    }
}

/// Whether `value` is a well-formed occupation code.
pub fn is_occupation_code(value: &str) -> bool {
    CODE_PATTERN.is_match(value)
}
