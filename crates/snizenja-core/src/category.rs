//! Two-level category classification from free text.
//!
//! One ordered rule table shared by every store's list and detail scrapers,
//! so classification never forks per store. Rule order is load-bearing:
//! specific footwear terms run before generic ones, "top" runs before the
//! t-shirt stem, and swimwear/jumpsuits run before all generic clothing so
//! compound product names are not shadowed.

use serde::Serialize;

use crate::text::{latinize, tokens};

/// A `main/sub` taxonomy key, e.g. `obuca/patike`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CategoryPath {
    pub main: &'static str,
    pub sub: &'static str,
}

impl CategoryPath {
    /// Renders the storage form, e.g. `"obuca/patike"`.
    #[must_use]
    pub fn as_path(&self) -> String {
        format!("{}/{}", self.main, self.sub)
    }
}

impl std::fmt::Display for CategoryPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.main, self.sub)
    }
}

/// One classification rule: substring stems and/or exact word tokens.
///
/// Stems match anywhere in the latinized text ("patik" matches "patike" and
/// "patikama"); exact tokens match whole words only, for short terms like
/// "top" that would otherwise fire inside unrelated words.
struct Rule {
    stems: &'static [&'static str],
    exact: &'static [&'static str],
    main: &'static str,
    sub: &'static str,
}

const fn stems(stems: &'static [&'static str], main: &'static str, sub: &'static str) -> Rule {
    Rule {
        stems,
        exact: &[],
        main,
        sub,
    }
}

const fn exact(exact: &'static [&'static str], main: &'static str, sub: &'static str) -> Rule {
    Rule {
        stems: &[],
        exact,
        main,
        sub,
    }
}

/// Ordered rule table; first match wins.
const RULES: &[Rule] = &[
    // Specific footwear before the generic sneaker stem.
    stems(&["kopack"], "obuca", "kopacke"),
    stems(&["cizm"], "obuca", "cizme"),
    stems(&["papuc", "japank", "natikac"], "obuca", "papuce"),
    stems(&["sandal"], "obuca", "sandale"),
    stems(&["patik", "tenisic"], "obuca", "patike"),
    stems(&["cipel"], "obuca", "cipele"),
    // Swimwear and jumpsuits ahead of every generic clothing stem, so
    // "kupaci kostim majica-kroj" never lands in majice.
    stems(&["kupac", "bikini"], "odeca", "kupaci"),
    stems(&["kombinezon"], "odeca", "kombinezoni"),
    // "top" is a whole-word match and must precede the majice stem.
    exact(&["top", "topic", "topovi"], "odeca", "topovi"),
    stems(&["majic"], "odeca", "majice"),
    stems(&["duks", "hudi"], "odeca", "duksevi"),
    stems(&["jakn", "prsluk", "suskavac"], "odeca", "jakne"),
    stems(&["trenerk"], "odeca", "trenerke"),
    stems(&["helank"], "odeca", "helanke"),
    stems(&["pantalon", "farmerk"], "odeca", "pantalone"),
    stems(&["sorc", "bermud"], "odeca", "sorcevi"),
    stems(&["haljin"], "odeca", "haljine"),
    stems(&["suknj"], "odeca", "suknje"),
    stems(&["kosulj"], "odeca", "kosulje"),
    exact(&["dres", "dresovi"], "odeca", "dresovi"),
    stems(&["carap"], "odeca", "carape"),
    stems(&["ranac", "ranc", "ruksak"], "oprema", "rancevi"),
    stems(&["torb"], "oprema", "torbe"),
    stems(&["lopt"], "oprema", "lopte"),
    exact(&["kapa", "kape", "kacket", "kacketi"], "oprema", "kape"),
    stems(&["rukavic"], "oprema", "rukavice"),
];

/// Maps free text (product name, URL path, a store's structured field) to a
/// category path.
///
/// Returns `None` when nothing matches — callers must treat that as
/// "uncategorized", never as an error.
#[must_use]
pub fn classify(text: &str) -> Option<CategoryPath> {
    let latin = latinize(text);
    let words = tokens(&latin);

    for rule in RULES {
        let stem_hit = rule.stems.iter().any(|s| latin.contains(s));
        let token_hit = rule.exact.iter().any(|e| words.contains(e));
        if stem_hit || token_hit {
            return Some(CategoryPath {
                main: rule.main,
                sub: rule.sub,
            });
        }
    }
    None
}
