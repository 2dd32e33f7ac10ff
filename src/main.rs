mod cli;
mod config;
mod converter;
mod csv_processor;
mod error;
mod file_processing;
mod formatting;
mod latest_purchase;
mod progress;
mod rate_cache;
mod rate_feed;
mod rate_record;
mod rate_resolver;
mod report;
mod utils;

/// Main entry point of the application.
///
/// This function orchestrates the entire workflow:
/// 1. Parses command-line arguments into a run configuration.
/// 2. Builds the HTTP client for the quotation feed.
/// 3. Loads the order tables and keeps the latest purchase of each material.
/// 4. Resolves one quotation per foreign currency and converts prices.
/// 5. Writes the CSV report and, unless disabled, the spreadsheet.
///
/// # Returns
///
/// * `anyhow::Result<()>` - Success or an error if input or output fails.
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let total_start = std::time::Instant::now();
    let config = config::PipelineConfig::from_args(cli::Args::parse());
    println!(
        "Start report: reference {} as of {}",
        config.reference_currency, config.as_of
    );

    let feed = rate_feed::PtaxFeed::new(&config.feed_url, config.timeout)?;
    let report = report::generate_report(&config, feed)?;

    println!(
        "✅ {} row(s), {} converted, completed in {:?} seconds",
        report.rows.len(),
        report.converted_rows,
        total_start.elapsed().as_secs_f64()
    );
    Ok(())
}
