use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::entities::scenario::ScenarioResult;

/// `€ 1,234.56`: fixed symbol, two decimals, thousands separated.
pub fn format_currency(symbol: &str, amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded.abs());
    let (integer, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{symbol} {sign}{}.{fraction}", group_thousands(integer))
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

pub fn format_number(value: Decimal) -> String {
    value.normalize().to_string()
}

pub fn format_share(part: Decimal, total: Decimal) -> String {
    if total.is_zero() {
        return "0.0%".to_string();
    }
    let Some(pct) = part
        .checked_div(total)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
    else {
        return "n/a".to_string();
    };
    let pct = pct.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    format!("{pct:.1}%")
}

pub fn status_timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

/// Cell text for the on-screen table, in export column order.
pub fn display_rows(result: &ScenarioResult, symbol: &str) -> Vec<Vec<String>> {
    result
        .rows
        .iter()
        .map(|row| {
            let line = &row.line;
            let mut cells = vec![
                line.item.clone(),
                line.category.clone(),
                format_number(line.quantity),
                line.unit.clone(),
                format_currency(symbol, line.unit_price),
                line.supplier.clone(),
                format_currency(symbol, line.total_cost),
            ];
            cells.extend(line.extras.iter().cloned());
            cells.push(format_number(row.adjusted_qty.round_dp(3)));
            cells.push(format_currency(symbol, row.final_unit_price));
            cells.push(format_currency(symbol, row.adjusted_cost));
            cells
        })
        .collect()
}
