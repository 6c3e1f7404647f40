use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {domain} (retry after {retry_after_secs}s)")]
    RateLimited {
        domain: String,
        retry_after_secs: u64,
    },

    #[error("page not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("browser error: {0}")]
    Browser(String),

    #[error("extraction error for {url}: {reason}")]
    Extraction { url: String, reason: String },

    #[error("pagination limit reached for {entry_url}: exceeded {max_pages} pages")]
    PaginationLimit { entry_url: String, max_pages: usize },
}
