pub mod reader;
pub mod writer;

pub const COMPANY_NAME: &str = "company_name";
pub const STOCK_CODE: &str = "stock_code";
pub const TIMESTAMP: &str = "timestamp";
pub const VALUE: &str = "value";

pub const REQUIRED_COLUMNS: [&str; 2] = [COMPANY_NAME, STOCK_CODE];
pub const OUTPUT_COLUMNS: [&str; 4] = [COMPANY_NAME, STOCK_CODE, TIMESTAMP, VALUE];

pub use reader::{parse_requests, read_requests, read_table, InputTable};
pub use writer::{write_responses, OutputFormat};
