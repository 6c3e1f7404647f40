pub mod browser;
pub mod client;
pub mod error;
pub mod pass;
pub mod price;
mod retry;
pub mod stores;
pub mod types;

pub use client::HttpClient;
pub use error::ScraperError;
pub use pass::{DelayPolicy, PassPhase, PassTracker};
pub use stores::{fetch_detail, scrape_list, ListContext};
pub use types::{DetailData, DetailPage, ListHarvest, RawListing};
