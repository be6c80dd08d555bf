use std::sync::Arc;

use anyhow::{Context, Result};
use dioxus::prelude::*;
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageLevel};

use crate::config::DashboardConfig;
use crate::domain::entities::line_item::Dataset;
use crate::domain::entities::scenario::{FilterOptions, ScenarioResult};
use crate::infra::assets::BundledAsset;
use crate::infra::cache::DefaultDatasetCache;
use crate::platform::desktop::blocking::run_blocking;
use crate::ui::chart::{bar_layout, donut_layout, DonutGeometry, PlotArea};
use crate::ui::format::{display_rows, format_currency, format_share, status_timestamp};
use crate::ui::state::app_state::{
    dropdown_options, retain_selection, scenario_parameters, selection_from_value,
    selection_value, AppState, DropdownOption,
};
use crate::usecase::ports::source::{DatasetSource, UploadedFile};
use crate::usecase::services::export_service::ExportService;
use crate::usecase::services::load_service::LoadService;
use crate::usecase::services::scenario_service::ScenarioService;

const BAR_AREA: PlotArea = PlotArea {
    width: 480.0,
    height: 300.0,
    label_band: 40.0,
};

const DONUT: DonutGeometry = DonutGeometry {
    cx: 150.0,
    cy: 150.0,
    outer: 130.0,
    inner: 39.0,
};

/// Everything the shell calls into. Shared read-only across handlers.
pub struct Services {
    pub loader: LoadService,
    pub scenario: ScenarioService,
    pub export: ExportService,
}

impl Services {
    pub fn new(config: &DashboardConfig) -> Self {
        let asset = BundledAsset::default_dataset();
        let cache = Arc::new(DefaultDatasetCache::new(asset.id));
        Self {
            loader: LoadService::new(asset, cache),
            scenario: ScenarioService,
            export: ExportService::new(config.export_file_name.clone()),
        }
    }
}

fn report_error(title: &str, err: &anyhow::Error) {
    tracing::error!(error = %format!("{err:#}"), "{title}");
    MessageDialog::new()
        .set_level(MessageLevel::Error)
        .set_title(title)
        .set_description(format!("{err:#}"))
        .set_buttons(MessageButtons::Ok)
        .show();
}

fn table_header_cell_style() -> &'static str {
    "border: 1px solid #bbb; padding: 6px; background: #f3f3f3; position: sticky; top: 0; text-align: left;"
}

fn table_cell_style() -> &'static str {
    "border: 1px solid #ddd; padding: 4px 6px; white-space: nowrap;"
}

#[component]
pub fn App() -> Element {
    let config = use_hook(|| Arc::new(DashboardConfig::default()));
    let services = use_hook(|| Arc::new(Services::new(&config)));

    let AppState {
        mut dataset,
        mut category,
        mut supplier,
        mut markup,
        mut waste,
        mut busy,
        mut status,
    } = AppState::new(&config);

    let services_for_init = services.clone();
    use_effect(move || {
        *busy.write() = true;
        let loaded = run_blocking("load bundled dataset", || {
            services_for_init.loader.load(&DatasetSource::DefaultAsset)
        });
        match loaded {
            Ok(default_dataset) => {
                *status.write() = format!(
                    "Loaded {} line items from the bundled dataset at {}",
                    default_dataset.len(),
                    status_timestamp()
                );
                *dataset.write() = Some(default_dataset);
            }
            Err(err) => {
                tracing::error!(error = %err, "bundled dataset failed to load");
                *status.write() = format!("Failed to load bundled dataset: {err}");
            }
        }
        *busy.write() = false;
    });

    let current_dataset = dataset();
    let params = scenario_parameters(&config, category(), supplier(), markup(), waste());
    let (options, result, scenario_error) = match current_dataset.as_deref() {
        Some(loaded) => {
            let options = services.scenario.filter_options(loaded);
            match services.scenario.apply(loaded, &params) {
                Ok(result) => (options, result, None),
                Err(err) => (
                    options,
                    ScenarioResult::default(),
                    Some(format!("Scenario could not be computed: {err}")),
                ),
            }
        }
        None => (FilterOptions::default(), ScenarioResult::default(), None),
    };

    let category_options = dropdown_options(&options.categories);
    let supplier_options = dropdown_options(&options.suppliers);
    let selected_category = selection_value(&params.category_filter);
    let selected_supplier = selection_value(&params.supplier_filter);

    let symbol = config.currency_symbol.clone();
    let table_columns = ExportService::header(&result);
    let table_rows = display_rows(&result, &symbol);
    let grand_total = format_currency(&symbol, result.grand_total);
    let bar_views: Vec<_> = bar_layout(&result.by_category, BAR_AREA)
        .into_iter()
        .map(|bar| {
            let value_label = result
                .by_category
                .get(&bar.label)
                .map(|cost| format_currency(&symbol, *cost))
                .unwrap_or_default();
            (bar, value_label)
        })
        .collect();
    let slice_views: Vec<_> = donut_layout(&result.by_category, DONUT)
        .into_iter()
        .map(|slice| {
            let share_label = format!("{:.1}%", slice.share * 100.0);
            (slice, share_label)
        })
        .collect();
    let supplier_rows: Vec<(String, String, String)> = result
        .by_supplier
        .iter()
        .map(|(name, cost)| {
            (
                name.clone(),
                format_currency(&symbol, *cost),
                format_share(*cost, result.grand_total),
            )
        })
        .collect();
    let source_label = current_dataset
        .as_ref()
        .map(|d| d.source_name.clone())
        .unwrap_or_else(|| "(none)".to_string());
    let row_summary = format!(
        "{} of {} line items",
        result.row_count(),
        current_dataset.as_ref().map(|d| d.len()).unwrap_or(0)
    );

    let nothing_to_export = result.is_empty();
    let status_text = status();
    let markup_range = config.markup;
    let waste_range = config.waste;
    let markup_value = markup();
    let waste_value = waste();

    let services_for_upload = services.clone();
    let services_for_export = services.clone();
    let export_snapshot = Arc::new(result);

    rsx! {
        div {
            style: "display: flex; min-height: 100vh; font-family: sans-serif; color: #222;",

            aside {
                style: "width: 280px; padding: 16px; background: #f6f7f9; border-right: 1px solid #ddd; display: flex; flex-direction: column; gap: 18px;",

                section {
                    h3 { "Upload BOM File" }
                    button {
                        disabled: busy(),
                        onclick: move |_| {
                            if busy() {
                                return;
                            }

                            let Some(file_path) = FileDialog::new()
                                .add_filter("Bill of Materials", &["csv", "xlsx"])
                                .pick_file() else {
                                *status.write() = "Upload cancelled".to_string();
                                return;
                            };

                            *busy.write() = true;
                            *status.write() = format!("Loading {}", file_path.display());

                            let outcome = run_blocking("load upload", || -> Result<Arc<Dataset>> {
                                let file = UploadedFile::from_path(&file_path)
                                    .with_context(|| format!("failed to read {}", file_path.display()))?;
                                let loaded = services_for_upload
                                    .loader
                                    .load(&DatasetSource::Uploaded(file))?;
                                Ok(loaded)
                            });

                            match outcome {
                                Ok(loaded) => {
                                    let next_options = services_for_upload.scenario.filter_options(&loaded);
                                    let next_category = retain_selection(&category(), &next_options.categories);
                                    let next_supplier = retain_selection(&supplier(), &next_options.suppliers);
                                    category.set(next_category);
                                    supplier.set(next_supplier);
                                    *status.write() = format!(
                                        "Loaded {} line items from {} at {}",
                                        loaded.len(),
                                        loaded.source_name,
                                        status_timestamp()
                                    );
                                    dataset.set(Some(loaded));
                                }
                                Err(err) => {
                                    *status.write() = format!("Upload failed: {err:#}");
                                    report_error("Upload failed", &err);
                                }
                            }

                            *busy.write() = false;
                        },
                        "Upload CSV or Excel"
                    }
                    p { style: "font-size: 12px; color: #666;", "Current source: {source_label}" }
                }

                section {
                    h3 { "Filters" }
                    FilterSelect {
                        label: "Category",
                        options: category_options,
                        selected: selected_category,
                        on_select: move |value: String| category.set(selection_from_value(&value)),
                    }
                    FilterSelect {
                        label: "Supplier",
                        options: supplier_options,
                        selected: selected_supplier,
                        on_select: move |value: String| supplier.set(selection_from_value(&value)),
                    }
                }

                section {
                    h3 { "Scenario Simulator" }
                    label { style: "display: block;",
                        "Markup: {markup_value}%"
                        input {
                            r#type: "range",
                            style: "width: 100%;",
                            min: "{markup_range.min}",
                            max: "{markup_range.max}",
                            step: "1",
                            value: "{markup_value}",
                            oninput: move |event| {
                                let raw = event.value().parse::<i64>().unwrap_or(i64::from(markup_range.default));
                                markup.set(markup_range.clamp(raw));
                            },
                        }
                    }
                    label { style: "display: block; margin-top: 10px;",
                        "Waste Factor: {waste_value}%"
                        input {
                            r#type: "range",
                            style: "width: 100%;",
                            min: "{waste_range.min}",
                            max: "{waste_range.max}",
                            step: "1",
                            value: "{waste_value}",
                            oninput: move |event| {
                                let raw = event.value().parse::<i64>().unwrap_or(i64::from(waste_range.default));
                                waste.set(waste_range.clamp(raw));
                            },
                        }
                    }
                }
            }

            main {
                style: "flex: 1; padding: 16px 24px; overflow: auto;",

                h1 { "Mechanical Estimation Dashboard" }
                p {
                    "Upload a Bill of Materials, filter by category or supplier, simulate markup and waste scenarios, compare supplier pricing and export the adjusted table."
                }

                if let Some(message) = scenario_error {
                    p { style: "color: #b00020; font-weight: 600;", "{message}" }
                }

                section {
                    h2 { "Estimated Total Cost" }
                    div {
                        style: "display: inline-block; padding: 12px 18px; border: 1px solid #ddd; border-radius: 8px; background: #fff;",
                        div { style: "font-size: 13px; color: #666;", "Adjusted Total Cost" }
                        div { style: "font-size: 28px; font-weight: 600;", "{grand_total}" }
                        div { style: "font-size: 12px; color: #888;", "{row_summary}" }
                    }
                }

                div {
                    style: "display: flex; gap: 24px; flex-wrap: wrap; margin-top: 16px;",

                    section {
                        h3 { "Cost by Category" }
                        if bar_views.is_empty() {
                            p { style: "color: #888;", "No line items match the current filters." }
                        } else {
                            svg {
                                width: BAR_AREA.width,
                                height: BAR_AREA.height,
                                for (bar, value_label) in bar_views.iter() {
                                    g { key: "{bar.label}",
                                        rect {
                                            x: bar.x,
                                            y: bar.y,
                                            width: bar.width,
                                            height: bar.height,
                                            fill: "{bar.color}",
                                        }
                                        text {
                                            x: bar.x + bar.width / 2.0,
                                            y: (bar.y - 4.0).max(12.0),
                                            style: "text-anchor: middle; font-size: 11px;",
                                            "{value_label}"
                                        }
                                        text {
                                            x: bar.x + bar.width / 2.0,
                                            y: BAR_AREA.height - BAR_AREA.label_band / 2.0,
                                            style: "text-anchor: middle; font-size: 11px;",
                                            "{bar.label}"
                                        }
                                    }
                                }
                            }
                        }
                    }

                    section {
                        h3 { "Cost Distribution" }
                        if slice_views.is_empty() {
                            p { style: "color: #888;", "Nothing to distribute." }
                        } else {
                            div { style: "display: flex; gap: 12px; align-items: center;",
                                svg {
                                    width: DONUT.cx * 2.0,
                                    height: DONUT.cy * 2.0,
                                    for (slice, _) in slice_views.iter() {
                                        path {
                                            key: "{slice.label}",
                                            d: "{slice.path}",
                                            fill: "{slice.color}",
                                            stroke: "#fff",
                                        }
                                    }
                                }
                                ul { style: "list-style: none; padding: 0; font-size: 13px;",
                                    for (slice, share_label) in slice_views.iter() {
                                        li { key: "{slice.label}",
                                            span { style: "display: inline-block; width: 10px; height: 10px; margin-right: 6px; background: {slice.color};" }
                                            "{slice.label} ({share_label})"
                                        }
                                    }
                                }
                            }
                        }
                    }
                }

                section {
                    h3 { "Supplier Comparison" }
                    table { style: "border-collapse: collapse; background: #fff;",
                        thead {
                            tr {
                                th { style: "{table_header_cell_style()}", "Supplier" }
                                th { style: "{table_header_cell_style()}", "Adjusted Cost" }
                                th { style: "{table_header_cell_style()}", "Share" }
                            }
                        }
                        tbody {
                            for (name, cost, share) in supplier_rows.iter() {
                                tr { key: "{name}",
                                    td { style: "{table_cell_style()}", "{name}" }
                                    td { style: "{table_cell_style()} text-align: right;", "{cost}" }
                                    td { style: "{table_cell_style()} text-align: right;", "{share}" }
                                }
                            }
                        }
                    }
                }

                section {
                    h3 { "Bill of Materials (Filtered and Adjusted)" }
                    div { style: "max-height: 420px; overflow: auto; border: 1px solid #ddd;",
                        table { style: "border-collapse: collapse; width: 100%; background: #fff;",
                            thead {
                                tr {
                                    for header in table_columns.iter() {
                                        th { style: "{table_header_cell_style()}", "{header}" }
                                    }
                                }
                            }
                            tbody {
                                for (row_idx, row) in table_rows.iter().enumerate() {
                                    tr { key: "{row_idx}",
                                        for cell in row.iter() {
                                            td { style: "{table_cell_style()}", "{cell}" }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }

                button {
                    style: "margin-top: 12px;",
                    disabled: busy() || nothing_to_export,
                    onclick: move |_| {
                        let Some(target) = FileDialog::new()
                            .set_file_name(services_for_export.export.file_name())
                            .add_filter("CSV", &["csv"])
                            .save_file() else {
                            *status.write() = "Export cancelled".to_string();
                            return;
                        };

                        let outcome = run_blocking("export adjusted table", || -> Result<usize> {
                            let bytes = services_for_export.export.to_verified_csv(&export_snapshot)?;
                            std::fs::write(&target, &bytes)
                                .with_context(|| format!("failed to write {}", target.display()))?;
                            Ok(export_snapshot.row_count())
                        });

                        match outcome {
                            Ok(rows) => {
                                *status.write() = format!(
                                    "Exported {rows} line items to {} at {}",
                                    target.display(),
                                    status_timestamp()
                                );
                            }
                            Err(err) => {
                                *status.write() = format!("Export failed: {err:#}");
                                report_error("Export failed", &err);
                            }
                        }
                    },
                    "Download Adjusted BOM (CSV)"
                }

                footer { style: "margin-top: 16px; font-size: 12px; color: #666;", "{status_text}" }
            }
        }
    }
}

#[component]
fn FilterSelect(
    label: &'static str,
    options: Vec<DropdownOption>,
    selected: String,
    on_select: EventHandler<String>,
) -> Element {
    rsx! {
        label { style: "display: block; margin-bottom: 8px;",
            div { style: "font-size: 13px; margin-bottom: 4px;", "{label}" }
            select {
                style: "width: 100%; padding: 4px;",
                value: "{selected}",
                onchange: move |event| on_select.call(event.value()),
                for choice in options.iter() {
                    option {
                        key: "{choice.value}",
                        value: "{choice.value}",
                        selected: choice.value == selected,
                        "{choice.label}"
                    }
                }
            }
        }
    }
}
