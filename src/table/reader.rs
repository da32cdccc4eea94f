use calamine::{open_workbook_auto, Reader};
use csv::StringRecord;
use log::{info, warn};
use std::io;
use std::path::Path;

use crate::errors::{Result, ScraperError};
use crate::models::stock::StockRequest;
use crate::table::REQUIRED_COLUMNS;
use crate::util;

/// Input rows reduced to the request columns, with normalised headers.
#[derive(Debug, Clone)]
pub struct InputTable {
    pub headers: StringRecord,
    pub rows: Vec<StringRecord>,
}

fn is_workbook(path: &Path) -> bool {
    matches!(
        path.extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .as_deref(),
        Some("xlsx") | Some("xlsm") | Some("xls") | Some("ods")
    )
}

fn read_csv_rows(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }
    Ok((headers, rows))
}

// 读取工作簿的第一个工作表，首行作为表头
fn read_workbook_rows(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ScraperError::DataError(format!("No worksheet in {}", path.display())))??;

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect::<Vec<_>>());
    let headers = rows.next().unwrap_or_default();
    // 工作表中完全空白的行相当于 CSV 的空行，直接跳过
    let rows = rows
        .filter(|row| !row.iter().all(|cell| cell.trim().is_empty()))
        .collect();
    Ok((headers, rows))
}

fn select_columns(headers: &[String], rows: Vec<Vec<String>>) -> Result<InputTable> {
    let normalized: Vec<String> = headers.iter().map(|h| util::normalize_column_name(h)).collect();

    let mut indices = Vec::with_capacity(REQUIRED_COLUMNS.len());
    for column in REQUIRED_COLUMNS {
        let mut matches = normalized
            .iter()
            .enumerate()
            .filter(|(_, h)| h.as_str() == column)
            .map(|(i, _)| i);
        let index = matches
            .next()
            .ok_or_else(|| ScraperError::MissingColumn(column.to_string()))?;
        if matches.next().is_some() {
            warn!("Column '{}' appears more than once, using the first one", column);
        }
        indices.push(index);
    }

    let rows = rows
        .into_iter()
        .map(|row| {
            indices
                .iter()
                .map(|&i| row.get(i).map(String::as_str).unwrap_or(""))
                .collect::<StringRecord>()
        })
        .collect();

    Ok(InputTable {
        headers: StringRecord::from(REQUIRED_COLUMNS.to_vec()),
        rows,
    })
}

/// Reads the input file and keeps only the company name and stock code columns.
///
/// Header names are matched after normalisation, so `Stock Code` and
/// `stock_code` are the same column. Other columns are ignored.
pub fn read_table(path: &Path) -> Result<InputTable> {
    if !path.is_file() {
        return Err(ScraperError::IoError(io::Error::new(
            io::ErrorKind::NotFound,
            format!("Input file not found: {}", path.display()),
        )));
    }

    let (headers, rows) = if is_workbook(path) {
        read_workbook_rows(path)?
    } else {
        read_csv_rows(path)?
    };

    let table = select_columns(&headers, rows)?;
    info!("Read {} rows from {}", table.rows.len(), path.display());
    Ok(table)
}

/// Validates every row against the request schema; the first bad row fails the whole table.
pub fn parse_requests(table: &InputTable) -> Result<Vec<StockRequest>> {
    table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            row.deserialize::<StockRequest>(Some(&table.headers))
                .map_err(|e| ScraperError::ValidationError {
                    // 第 1 行是表头
                    line: i + 2,
                    reason: format!("{:?} | {}", row.iter().collect::<Vec<_>>(), e),
                })
        })
        .collect()
}

pub fn read_requests(path: &Path) -> Result<Vec<StockRequest>> {
    let table = read_table(path)?;
    parse_requests(&table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{COMPANY_NAME, STOCK_CODE};

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn selects_required_columns_in_fixed_order() {
        let table = select_columns(
            &headers(&["extra_col", "timestamp", "STOCK CODE", "value", "Company name"]),
            vec![headers(&["ignored", "", "ABC", "", "Alpha Beta Corp"])],
        )
        .unwrap();

        assert_eq!(table.headers, StringRecord::from(vec![COMPANY_NAME, STOCK_CODE]));
        assert_eq!(table.rows[0], StringRecord::from(vec!["Alpha Beta Corp", "ABC"]));
    }

    #[test]
    fn hyphenated_header_is_not_accepted() {
        let err = select_columns(
            &headers(&["stock-code", "company_name"]),
            vec![headers(&["ABC", "Alpha Beta Corp"])],
        )
        .unwrap_err();
        assert!(matches!(err, ScraperError::MissingColumn(c) if c == STOCK_CODE));
    }

    #[test]
    fn delimiter_only_row_fails_validation() {
        let table = select_columns(
            &headers(&["company_name", "stock_code"]),
            vec![headers(&["Flobotics", "FBT"]), headers(&["", ""])],
        )
        .unwrap();
        assert_eq!(table.rows.len(), 2);
        assert!(matches!(
            parse_requests(&table),
            Err(ScraperError::ValidationError { line: 3, .. })
        ));
    }

    #[test]
    fn extra_field_fails_validation() {
        let table = InputTable {
            headers: StringRecord::from(vec!["company_name", "stock_code", "sector"]),
            rows: vec![StringRecord::from(vec!["Alpha Beta Corp", "ABC", "Tech"])],
        };
        assert!(matches!(
            parse_requests(&table),
            Err(ScraperError::ValidationError { line: 2, .. })
        ));
    }

    #[test]
    fn missing_stock_code_fails_validation() {
        let table = InputTable {
            headers: StringRecord::from(vec!["company_name"]),
            rows: vec![
                StringRecord::from(vec!["Alpha Beta Corp"]),
                StringRecord::from(vec!["Flobotics"]),
            ],
        };
        assert!(matches!(
            parse_requests(&table),
            Err(ScraperError::ValidationError { .. })
        ));
    }

    #[test]
    fn parses_valid_rows() {
        let table = InputTable {
            headers: StringRecord::from(vec!["company_name", "stock_code"]),
            rows: vec![StringRecord::from(vec!["Alpha Beta Corp", "ABC"])],
        };
        let requests = parse_requests(&table).unwrap();
        assert_eq!(requests, vec![StockRequest::new("Alpha Beta Corp", "ABC")]);
    }
}
