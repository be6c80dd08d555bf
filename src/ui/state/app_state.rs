use std::sync::Arc;

use dioxus::prelude::{use_signal, Signal};

use crate::config::DashboardConfig;
use crate::domain::entities::line_item::Dataset;
use crate::domain::entities::scenario::{ScenarioParameters, Selection};

pub struct AppState {
    pub dataset: Signal<Option<Arc<Dataset>>>,
    pub category: Signal<Selection>,
    pub supplier: Signal<Selection>,
    pub markup: Signal<u32>,
    pub waste: Signal<u32>,
    pub busy: Signal<bool>,
    pub status: Signal<String>,
}

impl AppState {
    pub fn new(config: &DashboardConfig) -> Self {
        let markup_default = config.markup.default;
        let waste_default = config.waste.default;
        Self {
            dataset: use_signal(|| None::<Arc<Dataset>>),
            category: use_signal(|| Selection::All),
            supplier: use_signal(|| Selection::All),
            markup: use_signal(move || markup_default),
            waste: use_signal(move || waste_default),
            busy: use_signal(|| false),
            status: use_signal(|| "Ready".to_string()),
        }
    }
}

const ALL_OPTION_VALUE: &str = "*";
const ONLY_OPTION_PREFIX: char = '=';

#[derive(Clone, Debug, PartialEq)]
pub struct DropdownOption {
    pub value: String,
    pub label: String,
}

/// Encodes a selection as a `<select>` value. Real labels are prefixed so no
/// label, including a literal "All", can collide with the sentinel.
pub fn selection_value(selection: &Selection) -> String {
    match selection {
        Selection::All => ALL_OPTION_VALUE.to_string(),
        Selection::Only(value) => format!("{ONLY_OPTION_PREFIX}{value}"),
    }
}

pub fn selection_from_value(value: &str) -> Selection {
    match value.strip_prefix(ONLY_OPTION_PREFIX) {
        Some(label) => Selection::Only(label.to_string()),
        None => Selection::All,
    }
}

pub fn dropdown_options(choices: &[Selection]) -> Vec<DropdownOption> {
    choices
        .iter()
        .map(|choice| DropdownOption {
            value: selection_value(choice),
            label: choice.label().to_string(),
        })
        .collect()
}

/// Keeps `current` when the new dataset still offers it, otherwise falls back to `All`.
pub fn retain_selection(current: &Selection, choices: &[Selection]) -> Selection {
    if choices.contains(current) {
        current.clone()
    } else {
        Selection::All
    }
}

pub fn scenario_parameters(
    config: &DashboardConfig,
    category: Selection,
    supplier: Selection,
    markup: u32,
    waste: u32,
) -> ScenarioParameters {
    ScenarioParameters {
        category_filter: category,
        supplier_filter: supplier,
        markup_pct: config.markup.to_decimal(markup),
        waste_pct: config.waste.to_decimal(waste),
    }
}
