use crate::error::FeedError;
use crate::rate_record;
use crate::utils;

/// Default endpoint of the Banco Central do Brasil PTAX period quotation service.
pub const PTAX_BASE_URL: &str = "https://olinda.bcb.gov.br/olinda/servico/PTAX/versao/v1/odata/CotacaoMoedaPeriodo(moeda=@moeda,dataInicial=@dataInicial,dataFinalCotacao=@dataFinalCotacao)";

/// Currency every PTAX quotation is expressed in.
pub const FEED_QUOTE_CURRENCY: &str = "BRL";

/// Day format the feed expects in its query parameters.
pub const FEED_DATE_FORMAT: &str = "%m-%d-%Y";

/// Source of daily quotations.
///
/// Implementations return every quotation for `currency` published between
/// `start` and `end` (inclusive), in whatever order the source provides.
pub trait QuoteFeed {
    fn fetch(
        &self,
        currency: &str,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    ) -> Result<Vec<rate_record::RateRecord>, FeedError>;
}

impl<F: QuoteFeed + ?Sized> QuoteFeed for &F {
    fn fetch(
        &self,
        currency: &str,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    ) -> Result<Vec<rate_record::RateRecord>, FeedError> {
        (**self).fetch(currency, start, end)
    }
}

#[derive(Debug, serde::Deserialize)]
struct PtaxPayload {
    #[serde(default)]
    value: Vec<PtaxQuote>,
}

#[derive(Debug, serde::Deserialize)]
struct PtaxQuote {
    #[serde(rename = "dataHoraCotacao")]
    quoted_at: String,
    #[serde(rename = "cotacaoCompra", default)]
    buy: Option<serde_json::Number>,
    #[serde(rename = "cotacaoVenda", default)]
    sell: Option<serde_json::Number>,
}

/// Blocking HTTP client for the PTAX OData endpoint.
pub struct PtaxFeed {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl PtaxFeed {
    /// Creates a feed client with a per-request timeout.
    ///
    /// # Arguments
    /// * `base_url` - Endpoint without query string (see [`PTAX_BASE_URL`]).
    /// * `timeout` - Upper bound for a single request, connect included.
    pub fn new(base_url: &str, timeout: std::time::Duration) -> Result<Self, FeedError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FeedError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    /// Builds the OData query URL for one currency and day range.
    ///
    /// Parameters are spliced in literally; the service expects quoted
    /// `@`-prefixed aliases that URL encoding would mangle.
    pub fn build_url(&self, currency: &str, start: chrono::NaiveDate, end: chrono::NaiveDate) -> String {
        format!(
            "{}?@moeda='{}'&@dataInicial='{}'&@dataFinalCotacao='{}'&$format=json",
            self.base_url,
            currency,
            start.format(FEED_DATE_FORMAT),
            end.format(FEED_DATE_FORMAT),
        )
    }
}

impl QuoteFeed for PtaxFeed {
    fn fetch(
        &self,
        currency: &str,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    ) -> Result<Vec<rate_record::RateRecord>, FeedError> {
        let url = self.build_url(currency, start, end);
        log::debug!("GET {}", url);

        let response = self.client.get(&url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        let body = response.text()?;
        parse_payload(currency, &body)
    }
}

/// Decodes a feed response body into rate records.
///
/// Quotations whose timestamp cannot be read are dropped with a warning.
/// Rates are kept exactly as printed in the payload.
pub fn parse_payload(currency: &str, body: &str) -> Result<Vec<rate_record::RateRecord>, FeedError> {
    let payload: PtaxPayload = serde_json::from_str(body)?;

    let records = payload
        .value
        .into_iter()
        .filter_map(|quote| {
            let Some(quoted_at) = parse_quote_timestamp(&quote.quoted_at) else {
                log::warn!(
                    "Dropping {} quotation with unreadable timestamp {:?}",
                    currency,
                    quote.quoted_at
                );
                return None;
            };
            Some(rate_record::RateRecord {
                currency: currency.to_string(),
                quoted_at,
                buy_rate: quote.buy.and_then(|n| utils::parse_decimal(&n.to_string())),
                sell_rate: quote.sell.and_then(|n| utils::parse_decimal(&n.to_string())),
            })
        })
        .collect();

    Ok(records)
}

/// Parses `2024-05-10 13:06:22.123`, with or without fraction, space or `T` separated.
fn parse_quote_timestamp(s: &str) -> Option<chrono::NaiveDateTime> {
    let s = s.trim();
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| chrono::NaiveDateTime::parse_from_str(s, fmt).ok())
}
