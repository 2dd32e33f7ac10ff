use crate::config;

/// Structure representing command-line arguments.
#[derive(Debug)]
pub struct Args {
    pub header: std::path::PathBuf,
    pub items: std::path::PathBuf,
    pub output: std::path::PathBuf,
    pub reference_currency: String,
    pub as_of: Option<chrono::NaiveDate>,
    pub feed_url: String,
    pub timeout_secs: u64,
    pub max_fallback_days: u32,
    pub no_xlsx: bool,
}

/// Builds the clap command with every flag, default and validator.
pub fn command() -> clap::Command {
    clap::Command::new("last-purchase-report")
        .version("0.1.0")
        .about("Report the last purchase price of every material, converted to a reference currency")
        .arg(
            clap::Arg::new("header")
                .long("header")
                .help("Path to the order header CSV (codigo_pedido, data_pedido, moeda)")
                .default_value(config::DEFAULT_HEADER_PATH)
                .num_args(1),
        )
        .arg(
            clap::Arg::new("items")
                .long("items")
                .help("Path to the order items CSV (codigo_pedido, codigo_material, valor_total_item_pedido)")
                .default_value(config::DEFAULT_ITEMS_PATH)
                .num_args(1),
        )
        .arg(
            clap::Arg::new("output")
                .short('o')
                .long("output")
                .help("Directory for the generated report files")
                .default_value(config::DEFAULT_OUTPUT_DIR)
                .num_args(1),
        )
        .arg(
            clap::Arg::new("reference-currency")
                .short('r')
                .long("reference-currency")
                .help("Currency every price is converted to")
                .default_value(config::DEFAULT_REFERENCE_CURRENCY)
                .value_parser(clap::builder::ValueParser::new(parse_currency_code))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("as-of")
                .long("as-of")
                .help("Date whose quotation is used, YYYY-MM-DD (default: today)")
                .value_parser(clap::builder::ValueParser::new(parse_date))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("feed-url")
                .long("feed-url")
                .help("Quotation feed endpoint")
                .default_value(crate::rate_feed::PTAX_BASE_URL)
                .num_args(1),
        )
        .arg(
            clap::Arg::new("timeout")
                .short('t')
                .long("timeout")
                .help("Timeout of a single feed request, in seconds")
                .default_value("15")
                .value_parser(clap::builder::ValueParser::new(parse_u64_positive))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("max-fallback-days")
                .long("max-fallback-days")
                .help("How many days back to look for a quotation, target day included (1-31)")
                .default_value("10")
                .value_parser(clap::builder::ValueParser::new(parse_fallback_days))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("no-xlsx")
                .long("no-xlsx")
                .help("Only write the CSV report")
                .required(false)
                .action(clap::ArgAction::SetTrue),
        )
}

/// Command-line arguments parser using Clap.
impl Args {
    /// Parses the process arguments, exiting with usage on error.
    pub fn parse() -> Self {
        Self::from_matches(&command().get_matches())
    }

    /// Extracts typed values from already validated matches.
    pub fn from_matches(matches: &clap::ArgMatches) -> Self {
        let string_or = |id: &str, default: &str| {
            matches
                .get_one::<String>(id)
                .cloned()
                .unwrap_or_else(|| default.to_string())
        };

        Args {
            header: std::path::PathBuf::from(string_or("header", config::DEFAULT_HEADER_PATH)),
            items: std::path::PathBuf::from(string_or("items", config::DEFAULT_ITEMS_PATH)),
            output: std::path::PathBuf::from(string_or("output", config::DEFAULT_OUTPUT_DIR)),
            reference_currency: string_or("reference-currency", config::DEFAULT_REFERENCE_CURRENCY),
            as_of: matches.get_one::<chrono::NaiveDate>("as-of").cloned(),
            feed_url: string_or("feed-url", crate::rate_feed::PTAX_BASE_URL),
            timeout_secs: matches
                .get_one::<u64>("timeout")
                .cloned()
                .unwrap_or(config::DEFAULT_TIMEOUT_SECS),
            max_fallback_days: matches
                .get_one::<u32>("max-fallback-days")
                .cloned()
                .unwrap_or(crate::rate_resolver::DEFAULT_MAX_FALLBACK_DAYS),
            no_xlsx: matches.get_flag("no-xlsx"),
        }
    }
}

/// Validates a positive integer number of seconds.
fn parse_u64_positive(s: &str) -> Result<u64, String> {
    match s.parse::<u64>() {
        Ok(0) => Err("Must be a positive integer".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("Not a valid number: {}", e)),
    }
}

/// Validates the fallback window, between 1 and 31 days.
fn parse_fallback_days(s: &str) -> Result<u32, String> {
    match s.parse::<u32>() {
        Ok(n) if (1..=31).contains(&n) => Ok(n),
        Ok(_) => Err("Must be between 1 and 31".to_string()),
        Err(e) => Err(format!("Not a valid number: {}", e)),
    }
}

/// Validates the reference currency.
///
/// Quotations are always priced in the feed's quote currency, so that is the
/// only code a conversion can land in.
fn parse_currency_code(s: &str) -> Result<String, String> {
    let code = s.trim();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(format!("Not a three-letter currency code: {:?}", s));
    }
    let code = code.to_uppercase();
    if code != crate::rate_feed::FEED_QUOTE_CURRENCY {
        return Err(format!(
            "Quotations are priced in {}; {} cannot be used as reference currency",
            crate::rate_feed::FEED_QUOTE_CURRENCY,
            code
        ));
    }
    Ok(code)
}

fn parse_date(s: &str) -> Result<chrono::NaiveDate, String> {
    chrono::NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| format!("Expected YYYY-MM-DD: {}", e))
}
