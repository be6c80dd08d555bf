use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use tracing::debug;

use crate::domain::error::EstimatorError;
use crate::usecase::ports::source::{FileFormat, TableReader, TabularData};

pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(v) => v.trim().to_string(),
        Data::Float(v) => v.to_string(),
        Data::Int(v) => v.to_string(),
        Data::Bool(v) => v.to_string(),
        Data::DateTime(v) => v.to_string(),
        Data::DateTimeIso(v) => v.to_string(),
        Data::DurationIso(v) => v.to_string(),
        Data::Error(v) => format!("{v:?}"),
        Data::Empty => String::new(),
    }
}

/// Reads the first worksheet; its first row is the header.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxTableReader;

impl TableReader for XlsxTableReader {
    fn read_table(&self, source_name: &str, bytes: &[u8]) -> Result<TabularData, EstimatorError> {
        let mut workbook: Xlsx<_> = calamine::open_workbook_from_rs(Cursor::new(bytes))
            .map_err(|e| EstimatorError::parse(source_name, format!("failed to open xlsx: {e}")))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| EstimatorError::parse(source_name, "workbook has no worksheets"))?
            .map_err(|e| {
                EstimatorError::parse(source_name, format!("failed to read first sheet: {e}"))
            })?;

        let mut sheet_rows = range.rows();
        let columns: Vec<String> = sheet_rows
            .next()
            .map(|header| header.iter().map(cell_to_string).collect())
            .unwrap_or_default();

        if columns.iter().all(|c| c.is_empty()) {
            return Err(EstimatorError::parse(source_name, "xlsx header row is required"));
        }

        let header_len = columns.len();
        let rows: Vec<Vec<String>> = sheet_rows
            .map(|r| {
                (0..header_len)
                    .map(|idx| r.get(idx).map(cell_to_string).unwrap_or_default())
                    .collect()
            })
            .collect();

        debug!(source = source_name, rows = rows.len(), "parsed xlsx sheet");
        Ok(TabularData { columns, rows })
    }

    fn format(&self) -> FileFormat {
        FileFormat::Spreadsheet
    }
}
