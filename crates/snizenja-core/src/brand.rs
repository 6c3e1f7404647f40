//! Brand canonicalization.
//!
//! Store markup disagrees about brands constantly: the same label shows up
//! as `"CALVIN_KLEIN_JEANS"`, `"ck"`, or as the first capitalized word of a
//! product name — which is sometimes not a brand at all but `"MUSKA"`.
//! Everything funnels through one alias table so the catalog stores a single
//! canonical uppercase form per brand.

use crate::text::latinize;

/// Gender words that scrapers occasionally misreport as brands.
const GENDER_WORDS: &[&str] = &[
    "MUSKA", "MUSKE", "MUSKI", "MUSKO", "ZENSKA", "ZENSKE", "ZENSKI", "ZENSKO", "DECIJA",
    "DECIJE", "DECIJI", "DECJA", "DECJE", "UNISEX", "MEN", "WOMEN", "KIDS", "JUNIOR",
];

/// Category words that scrapers occasionally misreport as brands.
const CATEGORY_WORDS: &[&str] = &[
    "PATIKE", "KOPACKE", "CIPELE", "CIZME", "PAPUCE", "SANDALE", "MAJICA", "MAJICE", "TOP",
    "DUKS", "DUKSEVI", "JAKNA", "JAKNE", "TRENERKA", "TRENERKE", "PANTALONE", "HELANKE",
    "SORC", "HALJINA", "SUKNJA", "KOSULJA", "DRES", "CARAPE", "RANAC", "TORBA", "LOPTA",
    "KACKET", "KAPA", "RUKAVICE", "KUPACI", "KOMBINEZON",
];

/// Alias → canonical mappings. Keys are in cleaned form (uppercase,
/// underscores already replaced by spaces).
const ALIASES: &[(&str, &str)] = &[
    ("TOMMY", "TOMMY HILFIGER"),
    ("TOMMY JEANS", "TOMMY HILFIGER"),
    ("CK", "CALVIN KLEIN"),
    ("CALVIN KLEIN JEANS", "CALVIN KLEIN"),
    ("CALVIN KLEIN UNDERWEAR", "CALVIN KLEIN"),
    ("NB", "NEW BALANCE"),
    ("TNF", "THE NORTH FACE"),
    ("NORTH FACE", "THE NORTH FACE"),
    ("UA", "UNDER ARMOUR"),
    ("LEVIS", "LEVI'S"),
    ("LEVI STRAUSS", "LEVI'S"),
    ("ADIDAS ORIGINALS", "ADIDAS"),
    ("ADIDAS PERFORMANCE", "ADIDAS"),
    ("CONVERSE ALL STAR", "CONVERSE"),
    ("JACK JONES", "JACK & JONES"),
    ("JACK&JONES", "JACK & JONES"),
    ("US POLO", "US POLO ASSN"),
    ("U.S. POLO ASSN.", "US POLO ASSN"),
    ("DR MARTENS", "DR. MARTENS"),
];

/// Multi-word brands recognized as prefixes of product names. Checked before
/// any single-word heuristic, since a naive first-word match would truncate
/// "THE NORTH FACE" to "THE" or "NEW BALANCE" to "NEW".
const MULTI_WORD_BRANDS: &[&str] = &[
    "THE NORTH FACE",
    "NEW BALANCE",
    "NEW ERA",
    "UNDER ARMOUR",
    "TOMMY HILFIGER",
    "TOMMY JEANS",
    "CALVIN KLEIN JEANS",
    "CALVIN KLEIN",
    "JACK WOLFSKIN",
    "HELLY HANSEN",
    "HUGO BOSS",
    "KARL LAGERFELD",
    "US POLO ASSN",
    "JACK & JONES",
    "DR. MARTENS",
];

/// Uppercases, latinizes, turns underscores into spaces, and collapses
/// whitespace runs.
fn clean(raw: &str) -> String {
    latinize(raw)
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

fn is_reserved_word(cleaned: &str) -> bool {
    GENDER_WORDS.contains(&cleaned) || CATEGORY_WORDS.contains(&cleaned)
}

fn alias_lookup(cleaned: &str) -> Option<&'static str> {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == cleaned)
        .map(|(_, canonical)| *canonical)
}

/// Canonicalizes a raw brand token.
///
/// Steps, in order: clean (trim/uppercase/underscores), reject known
/// gender/category words (a common scraper error is treating the first
/// capitalized word of a name as a brand), resolve aliases, otherwise return
/// the cleaned token as-is.
///
/// Returns `None` for empty input and for reserved words.
#[must_use]
pub fn normalize(raw: &str) -> Option<String> {
    let cleaned = clean(raw);
    if cleaned.is_empty() || is_reserved_word(&cleaned) {
        return None;
    }
    if let Some(canonical) = alias_lookup(&cleaned) {
        return Some(canonical.to_string());
    }
    Some(cleaned)
}

/// Extracts a brand from a product name.
///
/// Known multi-word brands (and multi-word aliases) are checked as prefixes
/// first; only then does the first word go through the single-word
/// heuristic in [`normalize`].
#[must_use]
pub fn extract_from_name(product_name: &str) -> Option<String> {
    let cleaned = clean(product_name);
    if cleaned.is_empty() {
        return None;
    }

    for brand in MULTI_WORD_BRANDS {
        if cleaned.starts_with(brand) {
            // A multi-word prefix may itself be an alias ("CALVIN KLEIN
            // JEANS"); resolve it to the canonical form.
            return Some(
                alias_lookup(brand)
                    .unwrap_or(brand)
                    .to_string(),
            );
        }
    }

    let first_word = cleaned.split(' ').next()?;
    normalize(first_word)
}

/// Expands a canonical brand into every known alias and casing variant.
///
/// Used when filtering the persisted catalog by brand, so records stored
/// under a stale alias are not invisible to search.
#[must_use]
pub fn expand_variants(canonical_brand: &str) -> Vec<String> {
    let canonical = clean(canonical_brand);
    if canonical.is_empty() {
        return Vec::new();
    }
    // Resolve through the alias table in case the caller passed an alias.
    let canonical = alias_lookup(&canonical)
        .map_or(canonical, str::to_string);

    let mut variants = vec![canonical.clone()];
    for (alias, target) in ALIASES {
        if *target == canonical {
            variants.push((*alias).to_string());
        }
    }

    let mut out: Vec<String> = Vec::new();
    for v in variants {
        let lower = v.to_lowercase();
        let underscored = v.replace(' ', "_");
        for form in [v, lower, underscored] {
            if !out.contains(&form) {
                out.push(form);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_cleans_and_passes_unknown_brands_through() {
        assert_eq!(normalize("  nike "), Some("NIKE".to_string()));
        assert_eq!(normalize("Peak_Performance"), Some("PEAK PERFORMANCE".to_string()));
    }

    #[test]
    fn normalize_rejects_gender_words() {
        assert_eq!(normalize("MUSKA"), None);
        assert_eq!(normalize("ŽENSKE"), None);
        assert_eq!(normalize("decije"), None);
    }

    #[test]
    fn normalize_rejects_category_words() {
        assert_eq!(normalize("PATIKE"), None);
        assert_eq!(normalize("majica"), None);
    }

    #[test]
    fn normalize_never_returns_reserved_words() {
        for word in GENDER_WORDS.iter().chain(CATEGORY_WORDS) {
            assert_eq!(normalize(word), None, "{word} must not pass as a brand");
        }
    }

    #[test]
    fn normalize_resolves_aliases() {
        assert_eq!(normalize("CK"), Some("CALVIN KLEIN".to_string()));
        assert_eq!(normalize("CALVIN_KLEIN_JEANS"), Some("CALVIN KLEIN".to_string()));
        assert_eq!(normalize("tommy"), Some("TOMMY HILFIGER".to_string()));
        assert_eq!(normalize("NB"), Some("NEW BALANCE".to_string()));
    }

    #[test]
    fn normalize_empty_is_none() {
        assert_eq!(normalize("   "), None);
    }

    #[test]
    fn extract_multi_word_brand_before_single_word() {
        assert_eq!(
            extract_from_name("THE NORTH FACE JAKNA MUSKA"),
            Some("THE NORTH FACE".to_string())
        );
        assert_eq!(
            extract_from_name("New Balance 574 patike"),
            Some("NEW BALANCE".to_string())
        );
    }

    #[test]
    fn extract_multi_word_alias_resolves_to_canonical() {
        assert_eq!(
            extract_from_name("CALVIN KLEIN JEANS MAJICA"),
            Some("CALVIN KLEIN".to_string())
        );
    }

    #[test]
    fn extract_single_word_brand() {
        assert_eq!(
            extract_from_name("NIKE AIR MAX PATIKE ZENSKE"),
            Some("NIKE".to_string())
        );
    }

    #[test]
    fn extract_rejects_reserved_first_word() {
        // First capitalized word is a gender word, not a brand.
        assert_eq!(extract_from_name("MUSKA JAKNA SA KAPULJACOM"), None);
        assert_eq!(extract_from_name("PATIKE ZA TRCANJE"), None);
    }

    #[test]
    fn expand_variants_includes_aliases_and_casings() {
        let variants = expand_variants("CALVIN KLEIN");
        assert!(variants.contains(&"CALVIN KLEIN".to_string()));
        assert!(variants.contains(&"CK".to_string()));
        assert!(variants.contains(&"calvin klein".to_string()));
        assert!(variants.contains(&"CALVIN_KLEIN".to_string()));
        assert!(variants.contains(&"CALVIN KLEIN JEANS".to_string()));
    }

    #[test]
    fn expand_variants_accepts_an_alias_as_input() {
        let variants = expand_variants("ck");
        assert!(variants.contains(&"CALVIN KLEIN".to_string()));
        assert!(variants.contains(&"CK".to_string()));
    }

    #[test]
    fn expand_variants_of_unknown_brand_is_just_casings() {
        let variants = expand_variants("NIKE");
        assert_eq!(variants, vec!["NIKE".to_string(), "nike".to_string()]);
    }
}
