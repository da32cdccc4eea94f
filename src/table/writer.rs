use log::info;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::errors::Result;
use crate::models::stock::StockResponse;
use crate::table::OUTPUT_COLUMNS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().map(|e| e.to_string_lossy().to_lowercase()) {
            Some(ext) if ext == "json" => OutputFormat::Json,
            _ => OutputFormat::Csv,
        }
    }
}

/// Writes one row per response, in the order given.
///
/// CSV output always starts with the four-column header, even for an empty
/// run; failed scrapes leave `timestamp` and `value` empty.
pub fn write_responses(path: &Path, responses: &[StockResponse]) -> Result<()> {
    // 确保目录存在
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    match OutputFormat::from_path(path) {
        OutputFormat::Csv => {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_path(path)?;
            writer.write_record(OUTPUT_COLUMNS)?;
            for response in responses {
                writer.serialize(response)?;
            }
            writer.flush()?;
        }
        OutputFormat::Json => {
            let mut writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(&mut writer, responses)?;
            writer.flush()?;
        }
    }

    info!("Output saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_format_from_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("out.json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_path(Path::new("out.JSON")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_path(Path::new("out.csv")), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_path(Path::new("out")), OutputFormat::Csv);
    }
}
