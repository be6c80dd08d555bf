use tracing::debug;

use crate::domain::error::EstimatorError;
use crate::usecase::ports::source::{FileFormat, TableReader, TabularData};

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvTableReader;

impl TableReader for CsvTableReader {
    fn read_table(&self, source_name: &str, bytes: &[u8]) -> Result<TabularData, EstimatorError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(bytes);
        let headers = reader
            .headers()
            .map_err(|e| EstimatorError::parse(source_name, format!("failed to read headers: {e}")))?
            .clone();

        if headers.is_empty() {
            return Err(EstimatorError::parse(source_name, "csv header is required"));
        }

        let columns: Vec<String> = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();

        let header_len = columns.len();
        let mut rows = Vec::new();
        for (row_idx, record) in reader.records().enumerate() {
            let record = record.map_err(|e| {
                EstimatorError::parse(source_name, format!("row {}: {e}", row_idx + 1))
            })?;
            let row = (0..header_len)
                .map(|col_idx| record.get(col_idx).unwrap_or("").to_string())
                .collect();
            rows.push(row);
        }

        debug!(source = source_name, rows = rows.len(), "parsed csv table");
        Ok(TabularData { columns, rows })
    }

    fn format(&self) -> FileFormat {
        FileFormat::Csv
    }
}
