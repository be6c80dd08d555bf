use std::collections::BTreeSet;

use rust_decimal::Decimal;

/// One row of a Bill of Materials after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub item: String,
    pub category: String,
    pub quantity: Decimal,
    pub unit: String,
    pub unit_price: Decimal,
    pub supplier: String,
    /// Taken from the source when supplied, otherwise `quantity * unit_price`.
    pub total_cost: Decimal,
    /// Pass-through values, aligned with [`Dataset::extra_columns`].
    pub extras: Vec<String>,
}

/// How the total cost column was populated at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalCostOrigin {
    Supplied,
    Derived,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    pub source_name: String,
    pub extra_columns: Vec<String>,
    pub items: Vec<LineItem>,
    pub total_cost_origin: TotalCostOrigin,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn categories(&self) -> BTreeSet<&str> {
        self.items.iter().map(|item| item.category.as_str()).collect()
    }

    pub fn suppliers(&self) -> BTreeSet<&str> {
        self.items.iter().map(|item| item.supplier.as_str()).collect()
    }
}
