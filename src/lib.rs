// 公开导出的模块，供外部使用
pub mod models;
pub mod errors;
pub mod config;
pub mod scrapers;
pub mod services;
pub mod table;
pub mod util;

// 重新导出常用类型，方便使用
pub use config::Config;
pub use errors::{Result, ScraperError};
pub use models::stock::{StockQuote, StockRequest, StockResponse};
pub use services::scrape_service::ScrapeService;
