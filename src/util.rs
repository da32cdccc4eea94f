use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

use crate::config::{SiteConfig, OUTPUT_TIMESTAMP_FORMAT};
use crate::errors::ExtractionError;
use crate::models::stock::StockRequest;

/// Builds the stock details page URL:
/// `<base>/<endpoint>/<stock_code>/<company-name-slug>`.
///
/// The stock code is used verbatim. Only spaces in the company name are
/// replaced, no other characters are escaped.
pub fn build_stock_url(site: &SiteConfig, request: &StockRequest) -> String {
    let slug = request.company_name().to_lowercase().replace(' ', "-");
    [
        site.base_url.as_str(),
        site.stock_endpoint.as_str(),
        request.stock_code(),
        slug.as_str(),
    ]
    .join("/")
}

/// Parses a displayed price such as ` 1,234.50 ` into a number.
pub fn parse_price(text: &str) -> Result<f64, ExtractionError> {
    let cleaned = text.trim().replace(',', "");
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ExtractionError::InvalidPrice {
            text: text.trim().to_string(),
        })
}

// 列名统一：去掉首尾空白，小写，空格替换为下划线
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Appends `_<timestamp>` to the file stem, keeping the extension.
pub fn timestamped_path(path: &Path, at: &NaiveDateTime) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name = format!("{}_{}", stem, at.format(OUTPUT_TIMESTAMP_FORMAT));
    if let Some(ext) = path.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    path.with_file_name(name)
}
