use crate::rate_cache;
use crate::rate_feed;
use crate::rate_record;

/// Number of consecutive days tried, starting at the target date itself.
pub const DEFAULT_MAX_FALLBACK_DAYS: u32 = 10;

/// Finds the most recent quotation at or before a date, walking backwards
/// one day at a time through the feed.
///
/// Every answer, including `Unavailable`, is memoised in the borrowed
/// [`rate_cache::RateCache`] under the un-shifted query, so the feed is hit
/// at most `max_fallback_days` times per currency and date in a run.
pub struct RateResolver<'a, F: rate_feed::QuoteFeed> {
    feed: F,
    cache: &'a mut rate_cache::RateCache,
    max_fallback_days: u32,
}

impl<'a, F: rate_feed::QuoteFeed> RateResolver<'a, F> {
    pub fn new(feed: F, cache: &'a mut rate_cache::RateCache) -> Self {
        Self::with_max_fallback_days(feed, cache, DEFAULT_MAX_FALLBACK_DAYS)
    }

    pub fn with_max_fallback_days(feed: F, cache: &'a mut rate_cache::RateCache, max_fallback_days: u32) -> Self {
        Self {
            feed,
            cache,
            max_fallback_days,
        }
    }

    /// Resolves `currency` for `date`.
    ///
    /// For offsets `0..max_fallback_days` the feed is asked for the single
    /// day `date - offset`. Feed errors are logged and treated as an empty
    /// day. The first day with a usable quotation wins, and within that day
    /// the quotation with the latest timestamp.
    ///
    /// # Arguments
    /// * `currency` - Currency code, case-insensitive.
    /// * `date` - Target date; quotations after it are never considered.
    ///
    /// # Returns
    /// * `Resolution::Quoted` - the chosen quotation.
    /// * `Resolution::Unavailable` - every offset was empty or failed.
    pub fn resolve(&mut self, currency: &str, date: chrono::NaiveDate) -> rate_record::Resolution {
        let query = rate_record::RateQuery::single_day(currency, date);
        if let Some(cached) = self.cache.get(&query) {
            log::debug!("Cache hit for {}", query);
            return cached.clone();
        }

        let resolution = self.search_backwards(&query);
        match &resolution {
            rate_record::Resolution::Quoted(record) => log::info!(
                "{}: using quotation of {} for {}",
                query.currency,
                record.quoted_at,
                date
            ),
            rate_record::Resolution::Unavailable => log::info!(
                "{}: no quotation within {} day(s) up to {}",
                query.currency,
                self.max_fallback_days,
                date
            ),
        }

        self.cache.put(query, resolution.clone());
        resolution
    }

    fn search_backwards(&self, query: &rate_record::RateQuery) -> rate_record::Resolution {
        for offset in 0..self.max_fallback_days {
            let Some(attempt) = query.shifted_back(offset) else {
                break;
            };

            let records = match self.feed.fetch(&attempt.currency, attempt.start_date, attempt.end_date) {
                Ok(records) => records,
                Err(e) => {
                    log::warn!(
                        "Quotation lookup for {} on {} failed: {}",
                        attempt.currency,
                        attempt.start_date,
                        e
                    );
                    continue;
                }
            };

            if let Some(latest) = latest_usable(records) {
                return rate_record::Resolution::Quoted(latest);
            }
        }

        rate_record::Resolution::Unavailable
    }
}

/// Picks the usable record with the greatest timestamp.
///
/// Ties keep the record that came first from the feed.
fn latest_usable(mut records: Vec<rate_record::RateRecord>) -> Option<rate_record::RateRecord> {
    records.retain(rate_record::RateRecord::is_usable);
    records.sort_by(|a, b| b.quoted_at.cmp(&a.quoted_at));
    records.into_iter().next()
}
