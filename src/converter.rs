//! Conversion of purchase amounts into the reference currency.
//!
//! Rounding: results are rounded to two decimal places with banker's rounding
//! (round half to even), so `0.125` becomes `0.12` and `0.135` becomes `0.14`.

use crate::rate_record;

/// Decimal places kept in converted amounts.
pub const CONVERTED_DECIMAL_PLACES: u32 = 2;

/// A converted amount and the day of the quotation behind it.
///
/// Both fields are `None` when the row could not be converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConversionResult {
    pub converted_amount: Option<rust_decimal::Decimal>,
    pub quotation_date: Option<chrono::NaiveDate>,
}

impl ConversionResult {
    pub fn absent() -> Self {
        Self::default()
    }

    /// Amount already in the reference currency: passed through, no quotation.
    pub fn identity(amount: Option<rust_decimal::Decimal>) -> Self {
        ConversionResult {
            converted_amount: amount,
            quotation_date: None,
        }
    }
}

/// Applies a resolved quotation to `amount`.
///
/// # Arguments
/// * `amount` - Amount in the quotation's currency, if known.
/// * `resolution` - Result of rate resolution; `None` means nothing was resolved.
///
/// # Returns
/// * `ConversionResult` - `amount * rate` rounded half-even to two places,
///   dated with the quotation day; absent when the amount, the quotation or
///   a usable rate is missing.
pub fn convert(
    amount: Option<rust_decimal::Decimal>,
    resolution: Option<&rate_record::Resolution>,
) -> ConversionResult {
    let Some(amount) = amount else {
        return ConversionResult::absent();
    };
    let Some(record) = resolution.and_then(rate_record::Resolution::record) else {
        return ConversionResult::absent();
    };
    let Some(rate) = record.effective_rate() else {
        return ConversionResult::absent();
    };

    let Some(product) = amount.checked_mul(rate) else {
        log::warn!("Overflow converting {} {} at {}", amount, record.currency, rate);
        return ConversionResult::absent();
    };

    ConversionResult {
        converted_amount: Some(product.round_dp_with_strategy(
            CONVERTED_DECIMAL_PLACES,
            rust_decimal::RoundingStrategy::MidpointNearestEven,
        )),
        quotation_date: Some(record.quotation_date()),
    }
}
