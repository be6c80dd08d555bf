use crate::domain::schema::CanonicalColumn;

#[derive(Debug, thiserror::Error)]
pub enum EstimatorError {
    #[error("unsupported file format: '{file_name}'. Upload a .csv or .xlsx file")]
    UnsupportedFormat { file_name: String },

    #[error("missing required column(s): {}", join_columns(.columns))]
    MissingColumn { columns: Vec<CanonicalColumn> },

    #[error("failed to parse {source_name}: {reason}")]
    Parse { source_name: String, reason: String },

    #[error("{what} is out of range")]
    Overflow { what: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EstimatorError {
    pub fn parse(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        EstimatorError::Parse {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }
}

fn join_columns(columns: &[CanonicalColumn]) -> String {
    columns
        .iter()
        .map(|column| column.header())
        .collect::<Vec<_>>()
        .join(", ")
}
