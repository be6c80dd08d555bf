use std::path::Path;

use crate::domain::error::EstimatorError;

/// Raw header + string cells, before any schema is applied.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TabularData {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Spreadsheet,
}

impl FileFormat {
    /// Classifies a file by extension, case-insensitively.
    pub fn from_file_name(file_name: &str) -> Result<Self, EstimatorError> {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(FileFormat::Csv),
            "xlsx" => Ok(FileFormat::Spreadsheet),
            _ => Err(EstimatorError::UnsupportedFormat {
                file_name: file_name.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, EstimatorError> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_string();
        Ok(Self::new(name, bytes))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    DefaultAsset,
    Uploaded(UploadedFile),
}

/// Parses a file body into untyped rows.
pub trait TableReader: Send + Sync {
    fn read_table(&self, source_name: &str, bytes: &[u8]) -> Result<TabularData, EstimatorError>;

    fn format(&self) -> FileFormat;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_extensions() {
        assert_eq!(FileFormat::from_file_name("bom.csv").ok(), Some(FileFormat::Csv));
        assert_eq!(
            FileFormat::from_file_name("BOM.XLSX").ok(),
            Some(FileFormat::Spreadsheet)
        );
    }

    #[test]
    fn rejects_other_extensions() {
        for name in ["bom.xls", "bom.pdf", "bom", "csv"] {
            let result = FileFormat::from_file_name(name);
            assert!(
                matches!(result, Err(EstimatorError::UnsupportedFormat { .. })),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn from_path_takes_the_file_name_and_body() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let path = dir.path().join("Pumps.CSV");
        std::fs::write(&path, "Item\nPump\n").expect("should write file");

        let file = UploadedFile::from_path(&path).expect("should read file");

        assert_eq!(file, UploadedFile::new("Pumps.CSV", "Item\nPump\n"));
    }
}
