use std::fmt;

/// Columns every normalized dataset carries, in export order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CanonicalColumn {
    Item,
    Category,
    Quantity,
    Unit,
    UnitPrice,
    Supplier,
    TotalCost,
}

impl CanonicalColumn {
    pub const ALL: [CanonicalColumn; 7] = [
        CanonicalColumn::Item,
        CanonicalColumn::Category,
        CanonicalColumn::Quantity,
        CanonicalColumn::Unit,
        CanonicalColumn::UnitPrice,
        CanonicalColumn::Supplier,
        CanonicalColumn::TotalCost,
    ];

    /// Columns whose absence rejects the whole upload.
    pub const REQUIRED: [CanonicalColumn; 5] = [
        CanonicalColumn::Item,
        CanonicalColumn::Category,
        CanonicalColumn::Quantity,
        CanonicalColumn::UnitPrice,
        CanonicalColumn::Supplier,
    ];

    pub fn header(self) -> &'static str {
        match self {
            CanonicalColumn::Item => "Item",
            CanonicalColumn::Category => "Category",
            CanonicalColumn::Quantity => "Quantity",
            CanonicalColumn::Unit => "Unit",
            CanonicalColumn::UnitPrice => "Unit Price",
            CanonicalColumn::Supplier => "Supplier",
            CanonicalColumn::TotalCost => "Total Cost",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for CanonicalColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

pub const ADJUSTED_QTY_HEADER: &str = "Adjusted Qty";
pub const FINAL_UNIT_PRICE_HEADER: &str = "Final Unit Price";
pub const ADJUSTED_COST_HEADER: &str = "Adjusted Cost";

pub const DERIVED_HEADERS: [&str; 3] = [
    ADJUSTED_QTY_HEADER,
    FINAL_UNIT_PRICE_HEADER,
    ADJUSTED_COST_HEADER,
];

/// One spreadsheet header vocabulary. `headers` is indexed in
/// [`CanonicalColumn::ALL`] order.
#[derive(Debug, Clone, Copy)]
pub struct HeaderLocale {
    pub language: &'static str,
    pub headers: [&'static [&'static str]; 7],
}

pub const HEADER_LOCALES: &[HeaderLocale] = &[
    HeaderLocale {
        language: "en",
        headers: [
            &["Item", "Description"],
            &["Category"],
            &["Quantity", "Qty"],
            &["Unit", "UoM"],
            &["Unit Price", "Unit Price (€)"],
            &["Supplier", "Vendor"],
            &["Total Cost", "Total Cost (€)"],
        ],
    },
    HeaderLocale {
        language: "pt",
        headers: [
            &["Item", "Descrição"],
            &["Categoria"],
            &["Quantidade"],
            &["Unidade"],
            &["Preço Unitário", "Preço Unitário (€)"],
            &["Fornecedor"],
            &["Custo Total", "Custo Total (€)"],
        ],
    },
    HeaderLocale {
        language: "es",
        headers: [
            &["Artículo", "Descripción"],
            &["Categoría"],
            &["Cantidad"],
            &["Unidad"],
            &["Precio Unitario", "Precio Unitario (€)"],
            &["Proveedor"],
            &["Costo Total", "Costo Total (€)"],
        ],
    },
];

/// Resolves a source header to its canonical column through the locale table.
pub fn canonical_for_header(header: &str) -> Option<CanonicalColumn> {
    let needle = header.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    CanonicalColumn::ALL.into_iter().find(|column| {
        HEADER_LOCALES.iter().any(|locale| {
            locale.headers[column.index()]
                .iter()
                .any(|alias| alias.to_lowercase() == needle)
        })
    })
}

/// Languages whose vocabulary recognizes at least one of `headers`.
pub fn header_languages(headers: &[String]) -> Vec<&'static str> {
    HEADER_LOCALES
        .iter()
        .filter(|locale| {
            headers.iter().any(|header| {
                let needle = header.trim().to_lowercase();
                locale
                    .headers
                    .iter()
                    .flat_map(|aliases| aliases.iter())
                    .any(|alias| alias.to_lowercase() == needle)
            })
        })
        .map(|locale| locale.language)
        .collect()
}

pub fn is_derived_header(header: &str) -> bool {
    let needle = header.trim();
    DERIVED_HEADERS
        .iter()
        .any(|derived| derived.eq_ignore_ascii_case(needle))
}
