//! Gender classification with an explicit, ordered fallback chain.
//!
//! Precedence is kids → women → men: kids tokens are the most specific and
//! the costliest to get wrong (a kids' item sold as adult), and checking
//! women before men also keeps "women"/"zenske" from matching the men rules
//! via their embedded "men"/"ensk" substrings.

use serde::{Deserialize, Serialize};

use crate::text::{latinize, tokens};

/// Target audience of a deal. Stored lowercase (`muski`, `zenski`, `deca`,
/// `unisex`); `unisex` is the default whenever nothing matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Muski,
    Zenski,
    Deca,
    Unisex,
}

impl Gender {
    /// Storage form of the bucket.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Muski => "muski",
            Gender::Zenski => "zenski",
            Gender::Deca => "deca",
            Gender::Unisex => "unisex",
        }
    }

    /// Parses the storage form, defaulting to [`Gender::Unisex`] for any
    /// unknown value so old rows never fail to load.
    #[must_use]
    pub fn from_db(value: &str) -> Self {
        match value {
            "muski" => Gender::Muski,
            "zenski" => Gender::Zenski,
            "deca" => Gender::Deca,
            _ => Gender::Unisex,
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serbian inflection stems that indicate a kids' product.
const KIDS_STEMS: &[&str] = &["decij", "decj", "decak", "devojcic", "beb"];
/// Whole-word kids indicators (mostly English site vocabulary).
const KIDS_TOKENS: &[&str] = &["deca", "kids", "junior", "boys", "girls", "infant", "jr"];

const WOMEN_STEMS: &[&str] = &["zensk"];
const WOMEN_TOKENS: &[&str] = &["zene", "zena", "women", "woman", "womens", "female"];

const MEN_STEMS: &[&str] = &["musk"];
const MEN_TOKENS: &[&str] = &["men", "man", "mens", "male"];

/// URL path segments per tier, matched against the lowercased URL.
const KIDS_SEGMENTS: &[&str] = &["/deca", "/decije", "/kids", "/junior", "-kids-", "-jr-"];
const WOMEN_SEGMENTS: &[&str] = &["/zene", "/zenske", "/zenski", "/women", "-w-", "-zene-"];
const MEN_SEGMENTS: &[&str] = &["/muskarci", "/muske", "/muski", "/men", "-m-", "-muskarci-"];

fn matches_tier(latin: &str, words: &[&str], stems: &[&str], exact: &[&str]) -> bool {
    stems.iter().any(|s| latin.contains(s)) || exact.iter().any(|e| words.contains(e))
}

/// Classifies free text (a product name, a breadcrumb, a structured
/// "audience" field) into a gender bucket.
///
/// Returns `None` when nothing matches so callers can fall through to the
/// next tier of hints.
#[must_use]
pub fn classify(text: &str) -> Option<Gender> {
    let latin = latinize(text);
    let words = tokens(&latin);

    if matches_tier(&latin, &words, KIDS_STEMS, KIDS_TOKENS) {
        return Some(Gender::Deca);
    }
    if matches_tier(&latin, &words, WOMEN_STEMS, WOMEN_TOKENS) {
        return Some(Gender::Zenski);
    }
    if matches_tier(&latin, &words, MEN_STEMS, MEN_TOKENS) {
        return Some(Gender::Muski);
    }
    None
}

/// Classifies the URL path alone, using positional segment heuristics.
#[must_use]
pub fn classify_url(url: &str) -> Option<Gender> {
    let lower = latinize(url);

    if KIDS_SEGMENTS.iter().any(|s| lower.contains(s)) {
        return Some(Gender::Deca);
    }
    if WOMEN_SEGMENTS.iter().any(|s| lower.contains(s)) {
        return Some(Gender::Zenski);
    }
    if MEN_SEGMENTS.iter().any(|s| lower.contains(s)) {
        return Some(Gender::Muski);
    }
    None
}

/// Free-text fallback chain: URL segments first (site navigation is the
/// strongest signal), then the product name, then [`Gender::Unisex`].
///
/// Always returns a value. The matched tier is logged by callers that care
/// about diagnosing site-structure drift.
#[must_use]
pub fn classify_with_default(name: &str, url: &str) -> Gender {
    classify_url(url)
        .or_else(|| classify(name))
        .unwrap_or(Gender::Unisex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kids_beat_women_and_men() {
        assert_eq!(classify("decije patike za devojcice"), Some(Gender::Deca));
        assert_eq!(classify("JAKNA ZA DEČAKE"), Some(Gender::Deca));
        // Mixed signals: kids tier is checked first.
        assert_eq!(classify("zenske decije carape"), Some(Gender::Deca));
    }

    #[test]
    fn women_beat_men() {
        assert_eq!(classify("ZENSKE PATIKE"), Some(Gender::Zenski));
        // "women" embeds "men"; precedence keeps it in the women bucket.
        assert_eq!(classify("running shoes women"), Some(Gender::Zenski));
    }

    #[test]
    fn men_tier_matches_serbian_inflections() {
        assert_eq!(classify("MUŠKA MAJICA"), Some(Gender::Muski));
        assert_eq!(classify("patike muskarci"), Some(Gender::Muski));
    }

    #[test]
    fn unmatched_text_is_none() {
        assert_eq!(classify("AIR MAX 90"), None);
    }

    #[test]
    fn url_segments_classify() {
        assert_eq!(
            classify_url("https://example.rs/zene/obuca/patike-1"),
            Some(Gender::Zenski)
        );
        assert_eq!(
            classify_url("https://example.rs/proizvod/nike-air-w-903"),
            Some(Gender::Zenski)
        );
        assert_eq!(
            classify_url("https://example.rs/kids/patike"),
            Some(Gender::Deca)
        );
        assert_eq!(classify_url("https://example.rs/proizvod/patike-903"), None);
    }

    #[test]
    fn with_default_prefers_url_then_name_then_unisex() {
        assert_eq!(
            classify_with_default("AIR MAX", "https://example.rs/muskarci/patike"),
            Gender::Muski
        );
        assert_eq!(
            classify_with_default("ZENSKE PATIKE", "https://example.rs/proizvod/1"),
            Gender::Zenski
        );
        assert_eq!(
            classify_with_default("AIR MAX", "https://example.rs/proizvod/1"),
            Gender::Unisex
        );
    }

    #[test]
    fn storage_form_round_trips() {
        for g in [Gender::Muski, Gender::Zenski, Gender::Deca, Gender::Unisex] {
            assert_eq!(Gender::from_db(g.as_str()), g);
        }
        assert_eq!(Gender::from_db("anything-else"), Gender::Unisex);
    }
}
