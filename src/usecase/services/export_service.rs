use rust_decimal::Decimal;
use tracing::info;

use crate::domain::entities::scenario::{AdjustedLineItem, ScenarioResult};
use crate::domain::error::EstimatorError;
use crate::domain::schema::{
    CanonicalColumn, ADJUSTED_COST_HEADER, ADJUSTED_QTY_HEADER, DERIVED_HEADERS,
    FINAL_UNIT_PRICE_HEADER,
};
use crate::infra::import::csv::CsvTableReader;
use crate::usecase::ports::source::TableReader;
use crate::usecase::services::normalize::{normalize, parse_decimal};

/// An exported document parsed back into rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedTable {
    pub extra_columns: Vec<String>,
    pub rows: Vec<AdjustedLineItem>,
}

pub struct ExportService {
    file_name: String,
}

impl ExportService {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn header(result: &ScenarioResult) -> Vec<String> {
        CanonicalColumn::ALL
            .iter()
            .map(|column| column.header().to_string())
            .chain(result.extra_columns.iter().cloned())
            .chain(DERIVED_HEADERS.iter().map(|h| h.to_string()))
            .collect()
    }

    /// Serializes the adjusted rows as UTF-8 comma-separated text.
    pub fn to_csv(&self, result: &ScenarioResult) -> Result<Vec<u8>, EstimatorError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(Self::header(result))
            .map_err(|e| EstimatorError::parse(&self.file_name, e.to_string()))?;

        for row in &result.rows {
            let line = &row.line;
            let mut record = vec![
                line.item.clone(),
                line.category.clone(),
                format_decimal(line.quantity),
                line.unit.clone(),
                format_decimal(line.unit_price),
                line.supplier.clone(),
                format_decimal(line.total_cost),
            ];
            record.extend(line.extras.iter().cloned());
            record.push(format_decimal(row.adjusted_qty));
            record.push(format_decimal(row.final_unit_price));
            record.push(format_decimal(row.adjusted_cost));
            writer
                .write_record(&record)
                .map_err(|e| EstimatorError::parse(&self.file_name, e.to_string()))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| EstimatorError::parse(&self.file_name, e.to_string()))?;
        info!(
            file = %self.file_name,
            rows = result.rows.len(),
            bytes = bytes.len(),
            "exported adjusted table"
        );
        Ok(bytes)
    }

    /// Serializes like [`ExportService::to_csv`], then reads the document back
    /// and rejects it unless it reproduces the adjusted rows and columns.
    pub fn to_verified_csv(&self, result: &ScenarioResult) -> Result<Vec<u8>, EstimatorError> {
        let bytes = self.to_csv(result)?;
        let written = self.read_back(&bytes)?;
        if written.extra_columns != result.extra_columns {
            return Err(EstimatorError::parse(
                &self.file_name,
                format!(
                    "exported columns {:?} do not match {:?}",
                    written.extra_columns, result.extra_columns
                ),
            ));
        }
        if written.rows != result.rows {
            return Err(EstimatorError::parse(
                &self.file_name,
                format!(
                    "exported rows do not match ({} read back, {} expected)",
                    written.rows.len(),
                    result.rows.len()
                ),
            ));
        }
        Ok(bytes)
    }

    /// Parses a document produced by [`ExportService::to_csv`].
    pub fn read_back(&self, bytes: &[u8]) -> Result<ExportedTable, EstimatorError> {
        let table = CsvTableReader.read_table(&self.file_name, bytes)?;
        let derived_positions = DERIVED_HEADERS
            .iter()
            .map(|header| {
                table
                    .columns
                    .iter()
                    .position(|c| c == header)
                    .ok_or_else(|| {
                        EstimatorError::parse(
                            &self.file_name,
                            format!("exported table lacks '{header}' column"),
                        )
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let raw_rows = table.rows.clone();
        let dataset = normalize(&self.file_name, table)?;
        if dataset.items.len() != raw_rows.len() {
            return Err(EstimatorError::parse(
                &self.file_name,
                "exported table contains blank rows",
            ));
        }

        let rows = dataset
            .items
            .into_iter()
            .zip(raw_rows)
            .enumerate()
            .map(|(row_idx, (line, raw))| {
                let derived = |position: usize, header: &str| -> Result<Decimal, EstimatorError> {
                    let cell = raw.get(position).map(String::as_str).unwrap_or_default();
                    parse_decimal(cell).ok_or_else(|| {
                        EstimatorError::parse(
                            &self.file_name,
                            format!("row {}, column '{header}': '{cell}' is not a number", row_idx + 1),
                        )
                    })
                };
                Ok(AdjustedLineItem {
                    adjusted_qty: derived(derived_positions[0], ADJUSTED_QTY_HEADER)?,
                    final_unit_price: derived(derived_positions[1], FINAL_UNIT_PRICE_HEADER)?,
                    adjusted_cost: derived(derived_positions[2], ADJUSTED_COST_HEADER)?,
                    line,
                })
            })
            .collect::<Result<Vec<_>, EstimatorError>>()?;

        Ok(ExportedTable {
            extra_columns: dataset.extra_columns,
            rows,
        })
    }
}

fn format_decimal(value: Decimal) -> String {
    value.normalize().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::line_item::{Dataset, LineItem, TotalCostOrigin};
    use crate::domain::entities::scenario::ScenarioParameters;
    use crate::usecase::services::scenario_service::ScenarioService;
    use rust_decimal_macros::dec;

    fn sample_result() -> ScenarioResult {
        let dataset = Dataset {
            source_name: "bom.csv".into(),
            extra_columns: vec!["Lead Time".into()],
            items: vec![
                LineItem {
                    item: "Duct, galvanised".into(),
                    category: "HVAC".into(),
                    quantity: dec!(10),
                    unit: "m".into(),
                    unit_price: dec!(5.0),
                    supplier: "Ductworks \"North\"".into(),
                    total_cost: dec!(50),
                    extras: vec!["2 weeks".into()],
                },
                LineItem {
                    item: "Copper pipe".into(),
                    category: "Piping".into(),
                    quantity: dec!(4),
                    unit: "m".into(),
                    unit_price: dec!(12.5),
                    supplier: "PipeCo".into(),
                    total_cost: dec!(50),
                    extras: vec![String::new()],
                },
            ],
            total_cost_origin: TotalCostOrigin::Supplied,
        };
        let params = ScenarioParameters {
            markup_pct: dec!(10),
            waste_pct: dec!(5),
            ..Default::default()
        };
        ScenarioService
            .apply(&dataset, &params)
            .expect("scenario should compute")
    }

    #[test]
    fn header_lists_canonical_extra_and_derived_columns() {
        let header = ExportService::header(&sample_result());

        assert_eq!(
            header,
            vec![
                "Item",
                "Category",
                "Quantity",
                "Unit",
                "Unit Price",
                "Supplier",
                "Total Cost",
                "Lead Time",
                "Adjusted Qty",
                "Final Unit Price",
                "Adjusted Cost",
            ]
        );
    }

    #[test]
    fn writes_normalized_numbers() {
        let service = ExportService::new("adjusted_BOM.csv");

        let bytes = service.to_csv(&sample_result()).expect("export should succeed");
        let text = String::from_utf8(bytes).expect("export should be utf-8");

        let first_row = text.lines().nth(1).expect("first data row");
        assert_eq!(
            first_row,
            "\"Duct, galvanised\",HVAC,10,m,5,\"Ductworks \"\"North\"\"\",50,2 weeks,10.5,5.5,57.75"
        );
    }

    #[test]
    fn exported_table_reads_back_identically() {
        let service = ExportService::new("adjusted_BOM.csv");
        let result = sample_result();

        let bytes = service.to_csv(&result).expect("export should succeed");
        let table = service.read_back(&bytes).expect("read back should succeed");

        assert_eq!(table.extra_columns, result.extra_columns);
        assert_eq!(table.rows, result.rows);
    }

    #[test]
    fn empty_result_exports_header_only() {
        let service = ExportService::new("adjusted_BOM.csv");
        let result = ScenarioResult::default();

        let bytes = service.to_csv(&result).expect("export should succeed");
        let table = service.read_back(&bytes).expect("read back should succeed");

        assert!(table.rows.is_empty());
        assert_eq!(String::from_utf8_lossy(&bytes).lines().count(), 1);
    }

    #[test]
    fn verified_export_returns_the_written_document() {
        let service = ExportService::new("adjusted_BOM.csv");
        let result = sample_result();

        let verified = service.to_verified_csv(&result).expect("export should verify");

        assert_eq!(verified, service.to_csv(&result).expect("export should succeed"));
    }

    #[test]
    fn verified_export_rejects_rows_that_do_not_survive_reload() {
        let service = ExportService::new("adjusted_BOM.csv");
        let mut result = sample_result();
        result.rows[0].line.item = "  Duct  ".into();

        let err = service
            .to_verified_csv(&result)
            .expect_err("padded item text is trimmed on reload");

        assert!(err.to_string().contains("do not match"), "{err}");
    }
}
