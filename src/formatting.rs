/// Prefix symbols for currencies rendered symbol-first.
const CURRENCY_SYMBOLS: &[(&str, &str)] = &[("BRL", "R$"), ("USD", "US$"), ("EUR", "€")];

fn symbol_for(code: &str) -> Option<&'static str> {
    CURRENCY_SYMBOLS
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(code))
        .map(|(_, symbol)| *symbol)
}

/// Formats a monetary value for the report.
///
/// Known currencies get their symbol as prefix (`R$1,234.50`, `US$1,234.50`),
/// anything else is suffixed with its code (`1,234.50 JPY`). The value is
/// rounded half-even to two decimals and grouped by thousands with commas.
///
/// # Arguments
/// * `value` - Amount to render; `None` renders as an empty string.
/// * `code` - Currency code, case-insensitive for symbol lookup.
pub fn format_currency(value: Option<rust_decimal::Decimal>, code: &str) -> String {
    let Some(value) = value else {
        return String::new();
    };
    let number = group_thousands(value);
    let code = code.trim();

    match symbol_for(code) {
        Some(symbol) => format!("{}{}", symbol, number),
        None if code.is_empty() => number,
        None => format!("{} {}", number, code),
    }
}

/// Renders `value` with two decimals and comma thousands separators.
fn group_thousands(value: rust_decimal::Decimal) -> String {
    let mut rounded = value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointNearestEven);
    rounded.rescale(2);
    let text = rounded.abs().to_string();
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(text.len() + int_part.len() / 3 + 1);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}
