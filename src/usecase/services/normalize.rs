use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::entities::line_item::{Dataset, LineItem, TotalCostOrigin};
use crate::domain::error::EstimatorError;
use crate::domain::schema::{
    canonical_for_header, header_languages, is_derived_header, CanonicalColumn,
};
use crate::usecase::ports::source::TabularData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnRole {
    Canonical(CanonicalColumn),
    Extra,
    Dropped,
}

#[derive(Debug)]
struct ColumnPlan {
    roles: Vec<ColumnRole>,
    positions: [Option<usize>; 7],
}

impl ColumnPlan {
    fn from_headers(columns: &[String]) -> Self {
        let mut positions = [None; 7];
        let roles = columns
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                if is_derived_header(header) {
                    return ColumnRole::Dropped;
                }
                match canonical_for_header(header) {
                    Some(column) if positions[column as usize].is_none() => {
                        positions[column as usize] = Some(idx);
                        ColumnRole::Canonical(column)
                    }
                    _ => ColumnRole::Extra,
                }
            })
            .collect();
        Self { roles, positions }
    }

    fn position(&self, column: CanonicalColumn) -> Option<usize> {
        self.positions[column as usize]
    }

    fn missing_required(&self) -> Vec<CanonicalColumn> {
        CanonicalColumn::REQUIRED
            .into_iter()
            .filter(|column| self.position(*column).is_none())
            .collect()
    }
}

/// Applies the canonical schema to a raw table.
///
/// Localized headers are renamed through the locale table, unknown headers
/// pass through as extra columns, and `Total Cost` is derived as
/// `quantity * unit_price` when the source does not carry it.
pub fn normalize(source_name: &str, table: TabularData) -> Result<Dataset, EstimatorError> {
    let plan = ColumnPlan::from_headers(&table.columns);
    let languages = header_languages(&table.columns);

    let missing = plan.missing_required();
    if !missing.is_empty() {
        return Err(EstimatorError::MissingColumn { columns: missing });
    }

    let total_cost_origin = if plan.position(CanonicalColumn::TotalCost).is_some() {
        TotalCostOrigin::Supplied
    } else {
        TotalCostOrigin::Derived
    };

    let extra_indices: Vec<usize> = plan
        .roles
        .iter()
        .enumerate()
        .filter(|(_, role)| **role == ColumnRole::Extra)
        .map(|(idx, _)| idx)
        .collect();
    let extra_columns = extra_indices
        .iter()
        .map(|idx| table.columns[*idx].clone())
        .collect();

    let mut items = Vec::with_capacity(table.rows.len());
    for (row_idx, row) in table.rows.iter().enumerate() {
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let cells = RowCells {
            source_name,
            row_number: row_idx + 1,
            row,
            plan: &plan,
        };

        let quantity = cells.decimal(CanonicalColumn::Quantity)?;
        let unit_price = cells.decimal(CanonicalColumn::UnitPrice)?;
        let total_cost = match total_cost_origin {
            TotalCostOrigin::Supplied if !cells.text(CanonicalColumn::TotalCost).is_empty() => {
                cells.decimal(CanonicalColumn::TotalCost)?
            }
            _ => quantity.checked_mul(unit_price).ok_or_else(|| {
                cells.error(
                    CanonicalColumn::TotalCost,
                    format!("{quantity} x {unit_price} is out of range"),
                )
            })?,
        };

        items.push(LineItem {
            item: cells.text(CanonicalColumn::Item),
            category: cells.text(CanonicalColumn::Category),
            quantity,
            unit: cells.text(CanonicalColumn::Unit),
            unit_price,
            supplier: cells.text(CanonicalColumn::Supplier),
            total_cost,
            extras: extra_indices
                .iter()
                .map(|idx| row.get(*idx).cloned().unwrap_or_default())
                .collect(),
        });
    }

    debug!(
        source = source_name,
        rows = items.len(),
        origin = ?total_cost_origin,
        languages = ?languages,
        "normalized dataset"
    );

    Ok(Dataset {
        source_name: source_name.to_string(),
        extra_columns,
        items,
        total_cost_origin,
    })
}

struct RowCells<'a> {
    source_name: &'a str,
    row_number: usize,
    row: &'a [String],
    plan: &'a ColumnPlan,
}

impl RowCells<'_> {
    fn text(&self, column: CanonicalColumn) -> String {
        self.plan
            .position(column)
            .and_then(|idx| self.row.get(idx))
            .map(|value| value.trim().to_string())
            .unwrap_or_default()
    }

    fn decimal(&self, column: CanonicalColumn) -> Result<Decimal, EstimatorError> {
        let raw = self.text(column);
        parse_decimal(&raw).ok_or_else(|| self.error(column, format!("'{raw}' is not a number")))
    }

    fn error(&self, column: CanonicalColumn, detail: String) -> EstimatorError {
        EstimatorError::parse(
            self.source_name,
            format!("row {}, column '{}': {}", self.row_number, column, detail),
        )
    }
}

/// Accepts plain and scientific notation. `,` is only accepted as a thousands
/// separator in well-formed groups (`1,234.50`); a decimal comma such as
/// `12,5` is rejected rather than misread.
pub fn parse_decimal(value: &str) -> Option<Decimal> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let cleaned = if value.contains(',') {
        strip_thousands_separators(value)?
    } else {
        value.to_string()
    };
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
}

fn strip_thousands_separators(value: &str) -> Option<String> {
    let body = value
        .strip_prefix('-')
        .or_else(|| value.strip_prefix('+'))
        .unwrap_or(value);
    let (integer, fraction) = match body.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (body, None),
    };
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());

    let mut groups = integer.split(',');
    let leading = groups.next()?;
    let well_formed = (1..=3).contains(&leading.len())
        && all_digits(leading)
        && groups.all(|group| group.len() == 3 && all_digits(group))
        && fraction.map_or(true, |f| !f.is_empty() && all_digits(f));
    well_formed.then(|| value.replace(',', ""))
}
