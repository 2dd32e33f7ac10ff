use crate::rate_feed;
use crate::rate_record;
use crate::rate_resolver;

/// Resolves each currency once for `date`, showing a progress bar.
///
/// The bar and the logger share stderr, so the bar is suspended while a
/// resolution runs and may log.
///
/// # Arguments
/// * `resolver` - Resolver backed by the run's rate cache.
/// * `currencies` - Distinct, already normalised currency codes.
/// * `date` - Target date of every resolution.
///
/// # Returns
/// * `HashMap<String, Resolution>` - One entry per requested currency.
pub fn resolve_currencies<F: rate_feed::QuoteFeed>(
    resolver: &mut rate_resolver::RateResolver<'_, F>,
    currencies: &[String],
    date: chrono::NaiveDate,
) -> std::collections::HashMap<String, rate_record::Resolution> {
    let pb = indicatif::ProgressBar::new(currencies.len() as u64);
    pb.set_style(
        indicatif::ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| indicatif::ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let mut resolved = std::collections::HashMap::with_capacity(currencies.len());
    for currency in currencies {
        pb.set_message(format!("resolving {}", currency));
        let resolution = pb.suspend(|| resolver.resolve(currency, date));
        resolved.insert(currency.clone(), resolution);
        pb.inc(1);
    }
    pb.finish_and_clear();

    resolved
}
