use crate::rate_record;

/// Run-scoped memo of resolved quotations.
///
/// Entries are created on first resolution and live until the cache is
/// dropped at the end of the run. There is no eviction and no refresh.
#[derive(Debug, Default)]
pub struct RateCache {
    entries: std::collections::HashMap<rate_record::RateQuery, rate_record::Resolution>,
}

impl RateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a previous resolution.
    ///
    /// # Returns
    /// * `Some(Resolution::Quoted(_))` - a quotation was found earlier.
    /// * `Some(Resolution::Unavailable)` - an earlier search came up empty.
    /// * `None` - the query was never resolved in this run.
    pub fn get(&self, query: &rate_record::RateQuery) -> Option<&rate_record::Resolution> {
        self.entries.get(query)
    }

    pub fn put(&mut self, query: rate_record::RateQuery, value: rate_record::Resolution) {
        self.entries.insert(query, value);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
