//! URL-safe slug derivation for listing titles.

use once_cell::sync::Lazy;
use regex::Regex;

/// Slug used when a title contains no usable characters
pub const FALLBACK_SLUG: &str = "listing";

static DISALLOWED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^a-z0-9\s]").expect("valid slug character pattern")
});

static WHITESPACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").expect("valid whitespace pattern")
});

/// Derive a slug from a title.
///
/// The title is lowercased, every character outside `[a-z0-9]` and whitespace
/// is dropped, and whitespace runs become a single `-`.
///
/// # Example
/// ```
/// use rc_shared::slug::slugify;
///
/// assert_eq!(slugify("Canon EOS R5 (body only!)"), "canon-eos-r5-body-only");
/// ```
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let cleaned = DISALLOWED.replace_all(&lowered, "");
    let slug = WHITESPACE.replace_all(cleaned.trim(), "-");

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug.into_owned()
    }
}

/// Candidate slug for the given collision counter (`0` is the bare slug).
pub fn slug_with_suffix(base: &str, counter: u32) -> String {
    if counter == 0 {
        base.to_string()
    } else {
        format!("{}-{}", base, counter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic_title() {
        assert_eq!(slugify("Mountain Bike"), "mountain-bike");
    }

    #[test]
    fn test_slugify_drops_punctuation_and_collapses_spaces() {
        assert_eq!(slugify("  Tent,   4-person!  "), "tent-4person");
    }

    #[test]
    fn test_slugify_drops_non_ascii_letters() {
        assert_eq!(slugify("Café Grinder"), "caf-grinder");
    }

    #[test]
    fn test_slugify_empty_falls_back() {
        assert_eq!(slugify("!!!"), FALLBACK_SLUG);
        assert_eq!(slugify(""), FALLBACK_SLUG);
    }

    #[test]
    fn test_slug_with_suffix() {
        assert_eq!(slug_with_suffix("drill", 0), "drill");
        assert_eq!(slug_with_suffix("drill", 2), "drill-2");
    }
}
