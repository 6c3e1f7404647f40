//! Registry of supported retailers.
//!
//! The set of stores is fixed and compiled in: entry URLs change only when a
//! retailer restructures its site, which is a code change here, not runtime
//! configuration. Each store carries the per-store policy knobs the pipeline
//! needs (transport, cleanup floor, empty-sizes handling).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a store's sale listings are fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Plain HTTP fetch + DOM parse.
    Http,
    /// Headless browser; the listing only materializes via JS or a
    /// "load more" control.
    Browser,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Store {
    Planeta,
    Djak,
    SportVision,
    NSport,
    Buzz,
    OfficeShoes,
    Tike,
    Intersport,
}

impl Store {
    pub const ALL: [Store; 8] = [
        Store::Planeta,
        Store::Djak,
        Store::SportVision,
        Store::NSport,
        Store::Buzz,
        Store::OfficeShoes,
        Store::Tike,
        Store::Intersport,
    ];

    /// Stable storage key, also the prefix of every deal id for this store.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Store::Planeta => "planeta",
            Store::Djak => "djak",
            Store::SportVision => "sport-vision",
            Store::NSport => "n-sport",
            Store::Buzz => "buzz",
            Store::OfficeShoes => "office-shoes",
            Store::Tike => "tike",
            Store::Intersport => "intersport",
        }
    }

    #[must_use]
    pub fn base_url(self) -> &'static str {
        match self {
            Store::Planeta => "https://www.planetasport.rs",
            Store::Djak => "https://www.djaksport.com",
            Store::SportVision => "https://www.sportvision.rs",
            Store::NSport => "https://www.n-sport.net",
            Store::Buzz => "https://www.buzzsneakers.rs",
            Store::OfficeShoes => "https://www.officeshoes.rs",
            Store::Tike => "https://www.tike.rs",
            Store::Intersport => "https://www.intersport.rs",
        }
    }

    /// Sale/outlet entry points for the list pass. Stores that split their
    /// sale section by audience have one entry per section; the section
    /// order decides attribution for products listed in more than one.
    #[must_use]
    pub fn entry_urls(self) -> &'static [&'static str] {
        match self {
            Store::Planeta => &["https://www.planetasport.rs/akcija"],
            Store::Djak => &[
                "https://www.djaksport.com/muskarci/snizenje",
                "https://www.djaksport.com/zene/snizenje",
                "https://www.djaksport.com/deca/snizenje",
            ],
            Store::SportVision => &["https://www.sportvision.rs/outlet"],
            Store::NSport => &["https://www.n-sport.net/outlet?sort=discount_desc"],
            Store::Buzz => &["https://www.buzzsneakers.rs/snizenje"],
            Store::OfficeShoes => &["https://www.officeshoes.rs/akcija"],
            Store::Tike => &["https://www.tike.rs/outlet"],
            Store::Intersport => &["https://www.intersport.rs/outlet"],
        }
    }

    #[must_use]
    pub fn transport(self) -> Transport {
        match self {
            Store::Djak | Store::SportVision | Store::Buzz => Transport::Browser,
            _ => Transport::Http,
        }
    }

    /// Whether the store has a detail enrichment pass. Intersport listing
    /// cards already expose sizes and a structured product-type field, so a
    /// second pass would add nothing.
    #[must_use]
    pub fn has_detail_pass(self) -> bool {
        !matches!(self, Store::Intersport)
    }

    /// Minimum number of qualifying deals a list run must yield before
    /// stale cleanup is allowed to delete anything for this store. Sized to
    /// each store's usual sale assortment.
    #[must_use]
    pub fn cleanup_floor(self) -> i64 {
        match self {
            Store::Planeta | Store::SportVision | Store::Djak => 40,
            Store::Buzz | Store::OfficeShoes | Store::Intersport => 20,
            Store::NSport | Store::Tike => 10,
        }
    }

    /// Whether a detail pass that finds zero in-stock sizes deletes the
    /// deal. Office Shoes carries accessories (bags, care products) that
    /// legitimately have no sizes, so it keeps such deals.
    #[must_use]
    pub fn delete_on_empty_sizes(self) -> bool {
        !matches!(self, Store::OfficeShoes | Store::Intersport)
    }
}

impl std::fmt::Display for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Error)]
#[error("unknown store '{0}'")]
pub struct StoreParseError(String);

impl std::str::FromStr for Store {
    type Err = StoreParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Store::ALL
            .into_iter()
            .find(|store| store.key() == s)
            .ok_or_else(|| StoreParseError(s.to_string()))
    }
}
