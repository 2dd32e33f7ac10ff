/// Cache key for one quotation lookup: a currency over an inclusive day range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RateQuery {
    pub currency: String,
    pub start_date: chrono::NaiveDate,
    pub end_date: chrono::NaiveDate,
}

impl RateQuery {
    /// Builds a query whose window is the single day `date`.
    ///
    /// The currency code is trimmed and uppercased so that `usd` and `USD`
    /// share a cache slot.
    pub fn single_day(currency: &str, date: chrono::NaiveDate) -> Self {
        RateQuery {
            currency: currency.trim().to_uppercase(),
            start_date: date,
            end_date: date,
        }
    }

    /// Returns the same query with both ends moved `days` calendar days back.
    pub fn shifted_back(&self, days: u32) -> Option<Self> {
        let delta = chrono::Days::new(days as u64);
        Some(RateQuery {
            currency: self.currency.clone(),
            start_date: self.start_date.checked_sub_days(delta)?,
            end_date: self.end_date.checked_sub_days(delta)?,
        })
    }
}

impl std::fmt::Display for RateQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}_{}", self.currency, self.start_date, self.end_date)
    }
}

/// One quotation as published by the feed.
#[derive(Debug, Clone, PartialEq)]
pub struct RateRecord {
    pub currency: String,
    pub quoted_at: chrono::NaiveDateTime,
    pub buy_rate: Option<rust_decimal::Decimal>,
    pub sell_rate: Option<rust_decimal::Decimal>,
}

impl RateRecord {
    /// Rate used for conversion: sell when present, buy otherwise.
    ///
    /// A zero rate is never a real quotation and counts as missing.
    pub fn effective_rate(&self) -> Option<rust_decimal::Decimal> {
        self.sell_rate
            .filter(|r| !r.is_zero())
            .or(self.buy_rate.filter(|r| !r.is_zero()))
    }

    /// A record without any usable rate cannot convert anything.
    pub fn is_usable(&self) -> bool {
        self.effective_rate().is_some()
    }

    pub fn quotation_date(&self) -> chrono::NaiveDate {
        self.quoted_at.date()
    }
}

/// Outcome of resolving a currency for a date.
///
/// `Unavailable` is a regular answer that is cached like any quotation;
/// "never asked" is represented by the absence of a cache entry instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Quoted(RateRecord),
    Unavailable,
}

impl Resolution {
    pub fn record(&self) -> Option<&RateRecord> {
        match self {
            Resolution::Quoted(record) => Some(record),
            Resolution::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Resolution::Quoted(_))
    }
}
