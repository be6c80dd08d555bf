use std::collections::BTreeSet;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::domain::entities::line_item::{Dataset, LineItem};
use crate::domain::entities::scenario::{
    AdjustedLineItem, CostAggregate, FilterOptions, ScenarioParameters, ScenarioResult, Selection,
};
use crate::domain::error::EstimatorError;

/// Filter, adjust and aggregate a dataset for one set of scenario inputs.
///
/// Stateless: every call recomputes from the dataset and parameters, so one
/// instance can serve any number of sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScenarioService;

impl ScenarioService {
    pub fn filter_options(&self, dataset: &Dataset) -> FilterOptions {
        FilterOptions {
            categories: with_all(dataset.categories()),
            suppliers: with_all(dataset.suppliers()),
        }
    }

    /// Fails with [`EstimatorError::Overflow`] when an adjusted value or a sum
    /// leaves the representable range; no partial result is returned.
    pub fn apply(
        &self,
        dataset: &Dataset,
        params: &ScenarioParameters,
    ) -> Result<ScenarioResult, EstimatorError> {
        let waste_factor = percent_factor(params.waste_pct);
        let markup_factor = percent_factor(params.markup_pct);

        let rows = dataset
            .items
            .iter()
            .filter(|line| {
                params.category_filter.matches(&line.category)
                    && params.supplier_filter.matches(&line.supplier)
            })
            .map(|line| adjust(line, waste_factor, markup_factor))
            .collect::<Result<Vec<AdjustedLineItem>, EstimatorError>>()
            .inspect_err(|err| warn!(error = %err, "scenario could not be computed"))?;

        let mut grand_total = Decimal::ZERO;
        let mut by_category = CostAggregate::new();
        let mut by_supplier = CostAggregate::new();
        for row in &rows {
            grand_total = checked_sum(grand_total, row.adjusted_cost, || "grand total".into())?;
            accumulate(&mut by_category, &row.line.category, row.adjusted_cost)?;
            accumulate(&mut by_supplier, &row.line.supplier, row.adjusted_cost)?;
        }

        debug!(
            category = params.category_filter.label(),
            supplier = params.supplier_filter.label(),
            markup = %params.markup_pct,
            waste = %params.waste_pct,
            rows = rows.len(),
            total = %grand_total,
            "recomputed scenario"
        );

        Ok(ScenarioResult {
            extra_columns: dataset.extra_columns.clone(),
            rows,
            grand_total,
            by_category,
            by_supplier,
        })
    }
}

fn with_all(values: BTreeSet<&str>) -> Vec<Selection> {
    std::iter::once(Selection::All)
        .chain(values.into_iter().map(|v| Selection::Only(v.to_string())))
        .collect()
}

fn percent_factor(pct: Decimal) -> Decimal {
    Decimal::ONE + pct / Decimal::ONE_HUNDRED
}

fn adjust(
    line: &LineItem,
    waste_factor: Decimal,
    markup_factor: Decimal,
) -> Result<AdjustedLineItem, EstimatorError> {
    let out_of_range = |field: &str| EstimatorError::Overflow {
        what: format!("{field} of '{}'", line.item),
    };
    let adjusted_qty = line
        .quantity
        .checked_mul(waste_factor)
        .ok_or_else(|| out_of_range("adjusted quantity"))?;
    let final_unit_price = line
        .unit_price
        .checked_mul(markup_factor)
        .ok_or_else(|| out_of_range("final unit price"))?;
    let adjusted_cost = adjusted_qty
        .checked_mul(final_unit_price)
        .ok_or_else(|| out_of_range("adjusted cost"))?;
    Ok(AdjustedLineItem {
        line: line.clone(),
        adjusted_qty,
        final_unit_price,
        adjusted_cost,
    })
}

fn checked_sum(
    total: Decimal,
    value: Decimal,
    what: impl FnOnce() -> String,
) -> Result<Decimal, EstimatorError> {
    total
        .checked_add(value)
        .ok_or_else(|| EstimatorError::Overflow { what: what() })
}

fn accumulate(
    aggregate: &mut CostAggregate,
    key: &str,
    value: Decimal,
) -> Result<(), EstimatorError> {
    let entry = aggregate.entry(key.to_string()).or_insert(Decimal::ZERO);
    *entry = checked_sum(*entry, value, || format!("total for '{key}'"))?;
    Ok(())
}
