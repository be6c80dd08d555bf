use std::sync::Arc;

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::domain::entities::line_item::{Dataset, LineItem, TotalCostOrigin};
use crate::domain::entities::scenario::{ScenarioParameters, Selection};
use crate::domain::error::EstimatorError;
use crate::domain::schema::CanonicalColumn;
use crate::infra::assets::{BundledAsset, DEFAULT_DATASET_ID};
use crate::infra::cache::DefaultDatasetCache;
use crate::usecase::ports::source::{DatasetSource, UploadedFile};
use crate::usecase::services::export_service::ExportService;
use crate::usecase::services::load_service::LoadService;
use crate::usecase::services::scenario_service::ScenarioService;

fn loader() -> LoadService {
    LoadService::new(
        BundledAsset::default_dataset(),
        Arc::new(DefaultDatasetCache::new(DEFAULT_DATASET_ID)),
    )
}

fn upload(name: &str, body: &str) -> DatasetSource {
    DatasetSource::Uploaded(UploadedFile::new(name, body))
}

fn markup_only(markup: Decimal) -> ScenarioParameters {
    ScenarioParameters {
        markup_pct: markup,
        ..Default::default()
    }
}

#[test]
fn uploaded_csv_reproduces_reference_scenario() {
    let dataset = loader()
        .load(&upload(
            "reference.csv",
            "Item,Category,Quantity,Unit,Unit Price,Supplier\n\
             Duct,HVAC,10,m,5.0,Ductworks\n\
             Pipe,Piping,4,m,12.5,PipeCo\n",
        ))
        .expect("upload should load");

    let result = ScenarioService
        .apply(&dataset, &markup_only(dec!(10)))
        .expect("scenario should compute");

    let costs: Vec<Decimal> = result.rows.iter().map(|r| r.adjusted_cost).collect();
    assert_eq!(costs, vec![dec!(55.0), dec!(55.0)]);
    assert_eq!(result.grand_total, dec!(110.0));
    assert_eq!(
        result.by_category.into_iter().collect::<Vec<_>>(),
        vec![("HVAC".to_string(), dec!(55.0)), ("Piping".to_string(), dec!(55.0))]
    );
}

#[test]
fn upload_without_unit_price_is_rejected() {
    let result = loader().load(&upload(
        "no_price.csv",
        "Item,Category,Quantity,Unit,Supplier\nDuct,HVAC,10,m,Ductworks\n",
    ));

    match result {
        Err(EstimatorError::MissingColumn { columns }) => {
            assert_eq!(columns, vec![CanonicalColumn::UnitPrice]);
        }
        other => panic!("expected MissingColumn, got {other:?}"),
    }
}

#[test]
fn portuguese_upload_with_supplied_totals_flows_through_pipeline() {
    let dataset = loader()
        .load(&upload(
            "orcamento.csv",
            "Item,Categoria,Quantidade,Unidade,Preço Unitário (€),Fornecedor,Custo Total (€)\n\
             Tubo de cobre,Piping,4,m,12.5,PipeCo,48\n\
             Conduta,HVAC,2,m,10,Ductworks,20\n",
        ))
        .expect("upload should load");

    assert_eq!(dataset.total_cost_origin, TotalCostOrigin::Supplied);
    assert_eq!(dataset.items[0].total_cost, dec!(48));

    let result = ScenarioService
        .apply(
            &dataset,
            &ScenarioParameters {
                category_filter: Selection::Only("Piping".into()),
                waste_pct: dec!(10),
                ..Default::default()
            },
        )
        .expect("scenario should compute");

    assert_eq!(result.row_count(), 1);
    assert_eq!(result.rows[0].adjusted_qty, dec!(4.4));
    assert_eq!(result.grand_total, dec!(55));
}

#[test]
fn oversized_supplied_total_loads_but_scenario_reports_overflow() {
    let dataset = loader()
        .load(&upload(
            "big.csv",
            "Item,Category,Quantity,Unit Price,Supplier,Total Cost\n\
             Boiler,HVAC,2,79228162514264337593543950335,Climatec,1\n",
        ))
        .expect("upload should load");

    let result = ScenarioService.apply(&dataset, &markup_only(dec!(10)));

    match result {
        Err(EstimatorError::Overflow { what }) => assert!(what.contains("'Boiler'"), "{what}"),
        other => panic!("expected Overflow, got {other:?}"),
    }
}

#[test]
fn exported_file_can_be_uploaded_again() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let loader = loader();
    let export = ExportService::new("adjusted_BOM.csv");

    let original = loader
        .load(&upload(
            "bom.csv",
            "Item,Category,Quantity,Unit,Unit Price,Supplier,Lead Time\n\
             Duct,HVAC,10,m,5,Ductworks,2 weeks\n\
             Valve,Piping,6,pcs,18.75,PipeCo,\n",
        ))
        .expect("upload should load");
    let result = ScenarioService
        .apply(
            &original,
            &ScenarioParameters {
                markup_pct: dec!(15),
                waste_pct: dec!(5),
                ..Default::default()
            },
        )
        .expect("scenario should compute");

    let path = dir.path().join(export.file_name());
    std::fs::write(&path, export.to_csv(&result).expect("export should succeed"))
        .expect("should write export");

    let file = UploadedFile::from_path(&path).expect("should read export");
    assert_eq!(file.name, "adjusted_BOM.csv");
    let reloaded = loader
        .load(&DatasetSource::Uploaded(file))
        .expect("export should load as a dataset");

    assert_eq!(reloaded.extra_columns, vec!["Lead Time"]);
    assert_eq!(reloaded.total_cost_origin, TotalCostOrigin::Supplied);
    assert_eq!(reloaded.items, original.items);
}

#[test]
fn bundled_dataset_is_shared_between_sessions() {
    let cache = Arc::new(DefaultDatasetCache::new(DEFAULT_DATASET_ID));
    let first_session = LoadService::new(BundledAsset::default_dataset(), cache.clone());
    let second_session = LoadService::new(BundledAsset::default_dataset(), cache.clone());

    let a = first_session
        .load(&DatasetSource::DefaultAsset)
        .expect("default should load");
    let b = second_session
        .load(&DatasetSource::DefaultAsset)
        .expect("default should load");

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(cache.key(), DEFAULT_DATASET_ID);
}

#[test]
fn bundled_dataset_totals_are_consistent() {
    let dataset = loader()
        .load(&DatasetSource::DefaultAsset)
        .expect("default should load");

    let result = ScenarioService
        .apply(&dataset, &markup_only(dec!(10)))
        .expect("scenario should compute");

    assert_eq!(result.row_count(), dataset.len());
    assert_eq!(result.grand_total, result.by_category.values().copied().sum::<Decimal>());
    assert_eq!(result.grand_total, result.by_supplier.values().copied().sum::<Decimal>());
}

const CATEGORIES: [&str; 4] = ["HVAC", "Piping", "Controls", "Insulation"];
const SUPPLIERS: [&str; 3] = ["PipeCo", "Climatec", "Ductworks"];
const UNITS: [&str; 3] = ["m", "pcs", "m2"];

fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..100_000, 0u32..3).prop_map(|(mantissa, scale)| Decimal::new(mantissa, scale))
}

fn line_item() -> impl Strategy<Value = LineItem> {
    (
        "[A-Za-z0-9]{1,12}",
        prop::sample::select(CATEGORIES.to_vec()),
        amount(),
        prop::sample::select(UNITS.to_vec()),
        amount(),
        prop::sample::select(SUPPLIERS.to_vec()),
    )
        .prop_map(|(item, category, quantity, unit, unit_price, supplier)| LineItem {
            item,
            category: category.to_string(),
            quantity,
            unit: unit.to_string(),
            unit_price,
            supplier: supplier.to_string(),
            total_cost: quantity * unit_price,
            extras: Vec::new(),
        })
}

fn dataset() -> impl Strategy<Value = Dataset> {
    prop::collection::vec(line_item(), 0..40).prop_map(|items| Dataset {
        source_name: "generated.csv".into(),
        extra_columns: Vec::new(),
        items,
        total_cost_origin: TotalCostOrigin::Derived,
    })
}

fn selection(labels: &'static [&'static str]) -> impl Strategy<Value = Selection> {
    prop_oneof![
        Just(Selection::All),
        prop::sample::select(labels.to_vec()).prop_map(|label| Selection::Only(label.to_string())),
    ]
}

fn parameters() -> impl Strategy<Value = ScenarioParameters> {
    (selection(&CATEGORIES), selection(&SUPPLIERS), 0u32..=50, 0u32..=20).prop_map(
        |(category_filter, supplier_filter, markup, waste)| ScenarioParameters {
            category_filter,
            supplier_filter,
            markup_pct: Decimal::from(markup),
            waste_pct: Decimal::from(waste),
        },
    )
}

proptest! {
    #[test]
    fn prop_totals_are_mutually_consistent(data in dataset(), params in parameters()) {
        let result = ScenarioService
            .apply(&data, &params)
            .expect("scenario should compute");

        let row_sum: Decimal = result.rows.iter().map(|r| r.adjusted_cost).sum();
        let category_sum: Decimal = result.by_category.values().copied().sum();
        let supplier_sum: Decimal = result.by_supplier.values().copied().sum();
        prop_assert_eq!(result.grand_total, row_sum);
        prop_assert_eq!(result.grand_total, category_sum);
        prop_assert_eq!(result.grand_total, supplier_sum);
    }

    #[test]
    fn prop_unfiltered_keeps_every_row(data in dataset(), markup in 0u32..=50, waste in 0u32..=20) {
        let params = ScenarioParameters {
            markup_pct: Decimal::from(markup),
            waste_pct: Decimal::from(waste),
            ..Default::default()
        };

        let result = ScenarioService
            .apply(&data, &params)
            .expect("scenario should compute");

        prop_assert_eq!(result.row_count(), data.len());
        let kept: Vec<&LineItem> = result.rows.iter().map(|r| &r.line).collect();
        let source: Vec<&LineItem> = data.items.iter().collect();
        prop_assert_eq!(kept, source);
    }

    #[test]
    fn prop_category_filter_keeps_only_matching_rows(
        data in dataset(),
        category in prop::sample::select(CATEGORIES.to_vec()),
    ) {
        let params = ScenarioParameters {
            category_filter: Selection::Only(category.to_string()),
            ..Default::default()
        };

        let result = ScenarioService
            .apply(&data, &params)
            .expect("scenario should compute");

        let expected = data.items.iter().filter(|i| i.category == category).count();
        prop_assert_eq!(result.row_count(), expected);
        prop_assert!(result.rows.iter().all(|r| r.line.category == category));
        prop_assert!(result.by_category.keys().all(|k| k == category));
    }

    #[test]
    fn prop_zero_adjustment_recovers_unadjusted_cost(data in dataset()) {
        let result = ScenarioService
            .apply(&data, &ScenarioParameters::default())
            .expect("scenario should compute");

        for row in &result.rows {
            prop_assert_eq!(row.adjusted_cost, row.line.quantity * row.line.unit_price);
            prop_assert_eq!(row.adjusted_cost, row.line.total_cost);
        }
    }

    #[test]
    fn prop_raising_markup_or_waste_never_lowers_total(
        data in dataset(),
        params in parameters(),
        extra_markup in 0u32..=50,
        extra_waste in 0u32..=20,
    ) {
        let base = ScenarioService
            .apply(&data, &params)
            .expect("scenario should compute");
        let raised = ScenarioService
            .apply(&data, &ScenarioParameters {
                markup_pct: (params.markup_pct + Decimal::from(extra_markup)).min(dec!(50)),
                waste_pct: (params.waste_pct + Decimal::from(extra_waste)).min(dec!(20)),
                ..params.clone()
            })
            .expect("scenario should compute");

        prop_assert!(raised.grand_total >= base.grand_total);
    }

    #[test]
    fn prop_export_reads_back_to_the_same_rows(data in dataset(), params in parameters()) {
        let export = ExportService::new("adjusted_BOM.csv");
        let result = ScenarioService
            .apply(&data, &params)
            .expect("scenario should compute");

        let bytes = export.to_csv(&result).expect("export should succeed");
        let table = export.read_back(&bytes).expect("read back should succeed");

        prop_assert_eq!(table.extra_columns, result.extra_columns);
        prop_assert_eq!(table.rows, result.rows);
    }
}
