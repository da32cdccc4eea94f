use thiserror::Error;
use std::time::Duration;

/// Fatal errors: any of these stops the run before output is written.
#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Excel parsing error: {0}")]
    ExcelError(#[from] calamine::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Missing required column '{0}' in input data")]
    MissingColumn(String),

    #[error("Invalid row data at line {line}: {reason}")]
    ValidationError { line: usize, reason: String },

    #[error("Invalid selector '{selector}': {reason}")]
    SelectorError { selector: String, reason: String },

    #[error("Browser error: {0}")]
    BrowserError(String),

    #[error("Data error: {0}")]
    DataError(String),
}

pub type Result<T> = std::result::Result<T, ScraperError>;

/// Error reported by a [`PageDriver`](crate::scrapers::base::PageDriver) implementation.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct DriverError(pub String);

impl From<String> for DriverError {
    fn from(s: String) -> Self {
        DriverError(s)
    }
}

impl From<&str> for DriverError {
    fn from(s: &str) -> Self {
        DriverError(s.to_string())
    }
}

/// The page for a stock could not be brought into a scrapeable state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PageLoadError {
    #[error("Stock details page not found, redirected to price explorer: {url}")]
    Redirected { url: String },

    #[error(
        "Required web elements not found within {timeout:?}, \
         structure of the website may have changed for {url}"
    )]
    TimedOut { url: String, timeout: Duration },

    #[error("Failed to load {url}: {reason}")]
    Transport { url: String, reason: String },
}

/// The page loaded but its content did not have the expected shape.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    #[error("Element not found for selector '{selector}'")]
    ElementNotFound { selector: String },

    #[error("Price text '{text}' is not a number")]
    InvalidPrice { text: String },
}

/// Request-scoped failure; converted into an empty response by the scrape service.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScrapeFailure {
    #[error("page load failed: {0}")]
    PageLoad(#[from] PageLoadError),

    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractionError),
}
