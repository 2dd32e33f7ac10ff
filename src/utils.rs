/// Date-time layouts accepted in input tables, tried in order.
///
/// `%.f` also matches a value without fractional seconds.
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Date-only layouts accepted in input tables, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parses a date or date-time cell from an input table.
///
/// Date-only values are placed at midnight. Empty or unrecognised cells
/// yield `None` instead of an error, so one bad row never stops a run.
///
/// # Arguments
/// * `s` - Raw cell content.
///
/// # Returns
/// * `Option<chrono::NaiveDateTime>` - Parsed value, or `None` if unreadable.
///
/// # Examples
///
/// ```
/// let dt = parse_datetime_lenient("2024-05-10").unwrap();
/// // 2024-05-10 00:00:00
/// ```
pub fn parse_datetime_lenient(s: &str) -> Option<chrono::NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| chrono::NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| chrono::NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parses a decimal cell, accepting plain and scientific notation.
///
/// # Arguments
/// * `s` - Raw text such as `"1234.50"` or `"1.5e-3"`.
///
/// # Returns
/// * `Option<rust_decimal::Decimal>` - Parsed value, or `None` if empty or invalid.
pub fn parse_decimal(s: &str) -> Option<rust_decimal::Decimal> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<rust_decimal::Decimal>()
        .ok()
        .or_else(|| rust_decimal::Decimal::from_scientific(s).ok())
}

/// Normalises a CSV column name: trimmed and lowercased.
pub fn normalize_header(name: &str) -> String {
    name.trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// Normalises a currency cell; blank means unknown.
pub fn normalize_currency(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case("2024-05-10", Some((2024, 5, 10, 0)))]
    #[case(" 2024-05-10 14:30:00 ", Some((2024, 5, 10, 14)))]
    #[case("2024-05-10T09:00:00", Some((2024, 5, 10, 9)))]
    #[case("2024-05-10 09:00", Some((2024, 5, 10, 9)))]
    #[case("2024-05-10T09:00", Some((2024, 5, 10, 9)))]
    #[case("2024/05/10", Some((2024, 5, 10, 0)))]
    #[case("05/10/2024", Some((2024, 5, 10, 0)))]
    #[case("", None)]
    #[case("not a date", None)]
    #[case("2024-13-40", None)]
    fn test_parse_datetime_lenient(#[case] input: &str, #[case] expected: Option<(i32, u32, u32, u32)>) {
        let expected = expected.map(|(y, m, d, h)| {
            chrono::NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, if h == 14 { 30 } else { 0 }, 0)
                .unwrap()
        });
        assert_eq!(parse_datetime_lenient(input), expected);
    }

    #[test]
    fn test_fractional_seconds_with_either_separator() {
        let expected = chrono::NaiveDate::from_ymd_opt(2024, 5, 10)
            .unwrap()
            .and_hms_milli_opt(9, 15, 30, 250)
            .unwrap();
        assert_eq!(parse_datetime_lenient("2024-05-10 09:15:30.250"), Some(expected));
        assert_eq!(parse_datetime_lenient("2024-05-10T09:15:30.250"), Some(expected));
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal(" 1234.50 "), Some(dec!(1234.50)));
        assert_eq!(parse_decimal("5.1518"), Some(dec!(5.1518)));
        assert_eq!(parse_decimal("1.5e-3"), Some(dec!(0.0015)));
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("n/a"), None);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_header("  Codigo_Pedido "), "codigo_pedido");
        assert_eq!(normalize_currency(" usd"), Some("USD".to_string()));
        assert_eq!(normalize_currency("   "), None);
    }
}
