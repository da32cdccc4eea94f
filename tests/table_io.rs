use lse_scraper::models::stock::{StockQuote, StockRequest, StockResponse};
use lse_scraper::table;
use lse_scraper::ScraperError;

use std::fs;
use std::path::{Path, PathBuf};

fn write_csv(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("lse_input.csv");
    fs::write(&path, content).unwrap();
    path
}

fn expected() -> Vec<StockRequest> {
    vec![
        StockRequest::new("Alpha Beta Corp", "ABC"),
        StockRequest::new("Flobotics", "FBT"),
    ]
}

#[test]
fn reads_header_variants() {
    let inputs = [
        // mixed case and spaces in column names
        "STOCK CODE,Company name,timestamp,value\nABC,Alpha Beta Corp,,\nFBT,Flobotics,,\n",
        // exact column names
        "stock_code,company_name,timestamp,value\nABC,Alpha Beta Corp,,\nFBT,Flobotics,,\n",
        // only the relevant columns
        "stock_code,company_name\nABC,Alpha Beta Corp\nFBT,Flobotics\n",
        // extra column, shuffled order
        "extra_col,timestamp,STOCK CODE,value,company_name\nignored,,ABC,,Alpha Beta Corp\nignored,123,FBT,,Flobotics\n",
    ];

    for content in inputs {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), content);
        let requests = table::read_requests(&path).unwrap();
        assert_eq!(requests, expected(), "input: {}", content);
    }
}

#[test]
fn nonexistent_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = table::read_requests(&dir.path().join("nonexistent_file.csv"));
    assert!(matches!(result, Err(ScraperError::IoError(_))));
}

#[test]
fn misnamed_or_missing_columns_fail() {
    let inputs = [
        "stock-code,company_name,timestamp,value\nABC,Alpha Beta Corp,,\n",
        "stock_code,timestamp,value\nABC,,\n",
    ];

    for content in inputs {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), content);
        assert!(
            matches!(table::read_requests(&path), Err(ScraperError::MissingColumn(_))),
            "input: {}",
            content
        );
    }
}

#[test]
fn empty_required_values_fail_validation() {
    let inputs = [
        "company_name,stock_code\nAlpha Beta Corp,\n",
        "company_name,stock_code\n,ABC\n",
        "company_name,stock_code\nAlpha Beta Corp,ABC\n,\n",
        "company_name,stock_code\nAlpha Beta Corp,   \n",
    ];

    for content in inputs {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), content);
        assert!(
            matches!(table::read_requests(&path), Err(ScraperError::ValidationError { .. })),
            "input: {}",
            content
        );
    }
}

#[test]
fn blank_lines_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(
        dir.path(),
        "company_name,stock_code\nAlpha Beta Corp,ABC\n\nFlobotics,FBT\n\n",
    );
    assert_eq!(table::read_requests(&path).unwrap(), expected());
}

#[test]
fn ragged_rows_are_read_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), "company_name,stock_code\nAlpha Beta Corp,ABC,extra\n");
    assert!(matches!(table::read_requests(&path), Err(ScraperError::CsvError(_))));
}

#[test]
fn writes_json_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("prices.json");
    let responses = vec![
        StockResponse::success(
            StockRequest::new("Xylion Devices", "XD"),
            StockQuote {
                value: 160.35,
                timestamp: "14.09.25 13:03:33 BST".to_string(),
            },
        ),
        StockResponse::failed(StockRequest::new("Flobotics", "FBT")),
    ];

    table::write_responses(&path, &responses).unwrap();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            {
                "company_name": "Xylion Devices",
                "stock_code": "XD",
                "timestamp": "14.09.25 13:03:33 BST",
                "value": 160.35,
            },
            {
                "company_name": "Flobotics",
                "stock_code": "FBT",
                "timestamp": null,
                "value": null,
            },
        ])
    );
}

#[test]
fn empty_run_writes_header_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.csv");

    table::write_responses(&path, &[]).unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "company_name,stock_code,timestamp,value\n"
    );
}
