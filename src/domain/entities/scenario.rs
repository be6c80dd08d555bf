use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::domain::entities::line_item::LineItem;

/// A dropdown choice. `All` means "no constraint" and never equals a real label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(expected) => expected == value,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Selection::All => "All",
            Selection::Only(value) => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScenarioParameters {
    pub category_filter: Selection,
    pub supplier_filter: Selection,
    pub markup_pct: Decimal,
    pub waste_pct: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustedLineItem {
    pub line: LineItem,
    pub adjusted_qty: Decimal,
    pub final_unit_price: Decimal,
    pub adjusted_cost: Decimal,
}

/// Sum of `adjusted_cost` per label, one entry per label present.
pub type CostAggregate = BTreeMap<String, Decimal>;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScenarioResult {
    /// Pass-through column names, aligned with each row's `line.extras`.
    pub extra_columns: Vec<String>,
    pub rows: Vec<AdjustedLineItem>,
    pub grand_total: Decimal,
    pub by_category: CostAggregate,
    pub by_supplier: CostAggregate,
}

impl ScenarioResult {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Dropdown contents: `All` first, then sorted distinct labels.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterOptions {
    pub categories: Vec<Selection>,
    pub suppliers: Vec<Selection>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_matches_every_value() {
        assert!(Selection::All.matches("HVAC"));
        assert!(Selection::All.matches(""));
    }

    #[test]
    fn only_matches_exact_value() {
        let selection = Selection::Only("HVAC".into());
        assert!(selection.matches("HVAC"));
        assert!(!selection.matches("hvac"));
        assert!(!selection.matches("Piping"));
    }

    #[test]
    fn a_category_named_all_is_not_the_sentinel() {
        let selection = Selection::Only("All".into());
        assert_ne!(selection, Selection::All);
        assert!(!selection.matches("HVAC"));
    }
}
