use crate::cli;

pub const DEFAULT_HEADER_PATH: &str = "data/order_headers.csv";
pub const DEFAULT_ITEMS_PATH: &str = "data/order_items.csv";
pub const DEFAULT_OUTPUT_DIR: &str = "reports";
pub const DEFAULT_REFERENCE_CURRENCY: &str = "BRL";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// File stem shared by the CSV and XLSX outputs.
pub const REPORT_FILE_STEM: &str = "last_purchase_report";

/// Everything one report run needs, resolved from the command line.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub header_path: std::path::PathBuf,
    pub items_path: std::path::PathBuf,
    pub output_dir: std::path::PathBuf,
    pub reference_currency: String,
    pub as_of: chrono::NaiveDate,
    pub feed_url: String,
    pub timeout: std::time::Duration,
    pub max_fallback_days: u32,
    pub write_xlsx: bool,
}

impl PipelineConfig {
    /// Builds the run configuration; a missing `--as-of` means today's local date.
    pub fn from_args(args: cli::Args) -> Self {
        PipelineConfig {
            header_path: args.header,
            items_path: args.items,
            output_dir: args.output,
            reference_currency: args.reference_currency.to_uppercase(),
            as_of: args.as_of.unwrap_or_else(|| chrono::Local::now().date_naive()),
            feed_url: args.feed_url,
            timeout: std::time::Duration::from_secs(args.timeout_secs),
            max_fallback_days: args.max_fallback_days,
            write_xlsx: !args.no_xlsx,
        }
    }

    pub fn csv_output_path(&self) -> std::path::PathBuf {
        self.output_dir.join(REPORT_FILE_STEM).with_extension("csv")
    }

    pub fn xlsx_output_path(&self) -> std::path::PathBuf {
        self.output_dir.join(REPORT_FILE_STEM).with_extension("xlsx")
    }
}
