pub mod app_config;
pub mod brand;
pub mod category;
pub mod deal;
pub mod gender;
pub mod stores;
pub mod text;

pub use app_config::{AppConfig, ConfigError};
pub use category::CategoryPath;
pub use deal::{deal_id, discount_percent, Deal, ScrapeRun};
pub use gender::Gender;
pub use stores::{Store, StoreParseError, Transport};
