//! Text normalization shared by every classifier.
//!
//! Serbian retail sites mix Latin script with and without diacritics
//! ("ženske", "zenske", "ŽENSKE") and occasionally Cyrillic-free uppercase.
//! Everything downstream matches against the latinized form so keyword
//! tables only need one spelling per concept.

/// Lowercases `text` and maps each Serbian diacritic to its closest ASCII
/// letter: š→s, č→c, ć→c, ž→z, đ→dj.
///
/// Total function with no failure mode, and idempotent — the output contains
/// no characters the mapping would touch again.
#[must_use]
pub fn latinize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        match c {
            'š' => out.push('s'),
            'č' | 'ć' => out.push('c'),
            'ž' => out.push('z'),
            'đ' => out.push_str("dj"),
            _ => out.push(c),
        }
    }
    out
}

/// Splits latinized text into alphanumeric tokens.
///
/// Used by classifiers that need word-level matches (e.g. "top" must not
/// match inside "laptop").
#[must_use]
pub fn tokens(latinized: &str) -> Vec<&str> {
    latinized
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect()
}
