use crate::config;
use crate::converter;
use crate::csv_processor;
use crate::file_processing;
use crate::formatting;
use crate::latest_purchase;
use crate::progress;
use crate::rate_cache;
use crate::rate_feed;
use crate::rate_resolver;

/// Column headers of the exported report, in output order.
pub const REPORT_COLUMNS: [&str; 7] = [
    "material_code",
    "last_price_converted",
    "last_price_original",
    "order_currency",
    "last_purchase_date",
    "reference_order_code",
    "quotation_date",
];

/// One line of the final report.
///
/// Field names double as CSV headers and must stay in sync with [`REPORT_COLUMNS`].
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ReportRow {
    pub material_code: String,
    pub last_price_converted: String,
    pub last_price_original: String,
    pub order_currency: String,
    pub last_purchase_date: Option<chrono::NaiveDate>,
    pub reference_order_code: String,
    pub quotation_date: Option<chrono::NaiveDate>,
}

/// Report rows plus what the run learned about rate availability.
#[derive(Debug, Default)]
pub struct Report {
    pub rows: Vec<ReportRow>,
    /// Rows converted with a foreign quotation.
    pub converted_rows: usize,
    /// Foreign currencies for which no quotation was found.
    pub unavailable_currencies: Vec<String>,
}

/// Converts every latest purchase into a report row.
///
/// Each foreign currency is resolved once for `as_of`; rows already in the
/// reference currency pass through unchanged and rows without a currency
/// stay unconverted. Missing rates never fail the build, they only leave
/// the converted price and quotation date empty.
///
/// # Arguments
/// * `purchases` - Latest purchase per material.
/// * `reference_currency` - Uppercased target currency.
/// * `as_of` - Date whose quotation is wanted.
/// * `resolver` - Rate resolver for this run.
///
/// # Returns
/// * `Report` - One row per purchase, in input order.
pub fn build_report<F: rate_feed::QuoteFeed>(
    purchases: &[latest_purchase::LatestPurchase],
    reference_currency: &str,
    as_of: chrono::NaiveDate,
    resolver: &mut rate_resolver::RateResolver<'_, F>,
) -> Report {
    let foreign: Vec<String> = purchases
        .iter()
        .filter_map(|p| p.currency.clone())
        .filter(|c| c != reference_currency)
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect();

    let rates = progress::resolve_currencies(resolver, &foreign, as_of);

    let mut report = Report {
        unavailable_currencies: foreign
            .iter()
            .filter(|c| rates.get(*c).is_some_and(|r| !r.is_available()))
            .cloned()
            .collect(),
        ..Report::default()
    };

    for purchase in purchases {
        let conversion = match purchase.currency.as_deref() {
            None => converter::ConversionResult::absent(),
            Some(currency) if currency == reference_currency => {
                converter::ConversionResult::identity(purchase.line_total)
            }
            Some(currency) => converter::convert(purchase.line_total, rates.get(currency)),
        };
        if conversion.quotation_date.is_some() {
            report.converted_rows += 1;
        }

        let currency = purchase.currency.clone().unwrap_or_default();
        report.rows.push(ReportRow {
            material_code: purchase.material_code.clone(),
            last_price_converted: formatting::format_currency(conversion.converted_amount, reference_currency),
            last_price_original: formatting::format_currency(purchase.line_total, &currency),
            order_currency: currency,
            last_purchase_date: purchase.ordered_at.map(|dt| dt.date()),
            reference_order_code: purchase.order_code.clone(),
            quotation_date: conversion.quotation_date,
        });
    }

    report
}

/// Writes report rows as CSV with a header line.
pub fn write_csv<P: AsRef<std::path::Path>>(rows: &[ReportRow], path: P) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path.as_ref())
        .map_err(|e| anyhow::anyhow!("Failed to create {}: {}", path.as_ref().display(), e))?;
    if rows.is_empty() {
        writer.write_record(REPORT_COLUMNS)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    anyhow::Ok(())
}

/// Writes report rows to a spreadsheet with a bold, frozen header row
/// and an autofilter over the data.
pub fn write_xlsx<P: AsRef<std::path::Path>>(rows: &[ReportRow], path: P) -> anyhow::Result<()> {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let worksheet = workbook.add_worksheet();
    let bold = rust_xlsxwriter::Format::new().set_bold();

    for (col, name) in REPORT_COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &bold)?;
    }

    let date_cell = |d: Option<chrono::NaiveDate>| d.map(|d| d.to_string()).unwrap_or_default();
    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        worksheet.write_string(r, 0, row.material_code.as_str())?;
        worksheet.write_string(r, 1, row.last_price_converted.as_str())?;
        worksheet.write_string(r, 2, row.last_price_original.as_str())?;
        worksheet.write_string(r, 3, row.order_currency.as_str())?;
        worksheet.write_string(r, 4, date_cell(row.last_purchase_date))?;
        worksheet.write_string(r, 5, row.reference_order_code.as_str())?;
        worksheet.write_string(r, 6, date_cell(row.quotation_date))?;
    }

    worksheet.set_freeze_panes(1, 0)?;
    worksheet.autofilter(0, 0, rows.len() as u32, (REPORT_COLUMNS.len() - 1) as u16)?;
    worksheet.autofit();

    workbook
        .save(path.as_ref())
        .map_err(|e| anyhow::anyhow!("Failed to save {}: {}", path.as_ref().display(), e))?;
    anyhow::Ok(())
}

/// Runs the whole pipeline: load, aggregate, resolve, convert, export.
///
/// The rate cache lives exactly as long as this call.
///
/// # Arguments
/// * `config` - Run configuration.
/// * `feed` - Quotation source.
///
/// # Returns
/// * `anyhow::Result<Report>` - The report that was written. Only input and
///   output problems are errors; rate lookups never fail the run.
pub fn generate_report<F: rate_feed::QuoteFeed>(config: &config::PipelineConfig, feed: F) -> anyhow::Result<Report> {
    file_processing::check_path(&config.header_path)?;
    file_processing::check_path(&config.items_path)?;
    file_processing::ensure_dir_exists(&config.output_dir)?;

    let tables = csv_processor::load_purchase_tables(&config.header_path, &config.items_path)?;
    println!(
        "📥 Loaded {} order header(s) and {} item(s)",
        tables.headers.len(),
        tables.items.len()
    );

    let purchases = latest_purchase::latest_purchase_per_material(&tables);
    println!("📦 {} distinct material(s)", purchases.len());

    let mut cache = rate_cache::RateCache::new();
    let report = {
        let mut resolver =
            rate_resolver::RateResolver::with_max_fallback_days(feed, &mut cache, config.max_fallback_days);
        build_report(&purchases, &config.reference_currency, config.as_of, &mut resolver)
    };
    log::debug!("Rate cache holds {} entr(ies)", cache.len());

    let csv_path = config.csv_output_path();
    write_csv(&report.rows, &csv_path)?;
    println!("📝 Report written to {}", csv_path.display());

    if config.write_xlsx {
        let xlsx_path = config.xlsx_output_path();
        write_xlsx(&report.rows, &xlsx_path)?;
        println!("📊 Spreadsheet written to {}", xlsx_path.display());
    }

    if !report.unavailable_currencies.is_empty() {
        println!(
            "⚠️ No quotation found for: {}",
            report.unavailable_currencies.join(", ")
        );
    }

    anyhow::Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_resolver::tests::{ScriptedFeed, at, day};
    use rust_decimal_macros::dec;

    fn purchase(material: &str, currency: Option<&str>, total: Option<rust_decimal::Decimal>) -> latest_purchase::LatestPurchase {
        latest_purchase::LatestPurchase {
            material_code: material.to_string(),
            order_code: format!("P-{}", material),
            ordered_at: Some(at(2024, 4, 1, 0)),
            currency: currency.map(str::to_string),
            line_total: total,
        }
    }

    #[test]
    fn test_reference_currency_is_never_resolved() {
        let feed = ScriptedFeed::default();
        let mut cache = rate_cache::RateCache::new();
        let mut resolver = rate_resolver::RateResolver::new(&feed, &mut cache);

        let report = build_report(&[purchase("M1", Some("BRL"), Some(dec!(1234.5)))], "BRL", day(2024, 5, 10), &mut resolver);

        assert_eq!(feed.call_count(), 0);
        assert_eq!(report.rows[0].last_price_converted, "R$1,234.50");
        assert_eq!(report.rows[0].last_price_original, "R$1,234.50");
        assert_eq!(report.rows[0].quotation_date, None);
        assert_eq!(report.converted_rows, 0);
    }

    #[test]
    fn test_each_foreign_currency_resolved_once() {
        let mut feed = ScriptedFeed::default();
        feed.quote("USD", at(2024, 5, 10, 13), Some(dec!(5.10)));
        let mut cache = rate_cache::RateCache::new();
        let mut resolver = rate_resolver::RateResolver::new(&feed, &mut cache);

        let purchases = [
            purchase("M1", Some("USD"), Some(dec!(100))),
            purchase("M2", Some("USD"), Some(dec!(10))),
            purchase("M3", Some("USD"), None),
        ];
        let report = build_report(&purchases, "BRL", day(2024, 5, 10), &mut resolver);

        assert_eq!(feed.call_count(), 1);
        assert_eq!(report.rows[0].last_price_converted, "R$510.00");
        assert_eq!(report.rows[0].last_price_original, "US$100.00");
        assert_eq!(report.rows[1].last_price_converted, "R$51.00");
        assert_eq!(report.rows[2].last_price_converted, "");
        assert_eq!(report.rows[2].quotation_date, None);
        assert_eq!(report.converted_rows, 2);
    }

    #[test]
    fn test_unavailable_and_missing_currency_degrade_gracefully() {
        let feed = ScriptedFeed::default();
        let mut cache = rate_cache::RateCache::new();
        let mut resolver = rate_resolver::RateResolver::new(&feed, &mut cache);

        let purchases = [
            purchase("M1", Some("JPY"), Some(dec!(1000))),
            purchase("M2", None, Some(dec!(7))),
        ];
        let report = build_report(&purchases, "BRL", day(2024, 5, 10), &mut resolver);

        assert_eq!(report.unavailable_currencies, vec!["JPY".to_string()]);
        assert_eq!(report.rows[0].last_price_converted, "");
        assert_eq!(report.rows[0].last_price_original, "1,000.00 JPY");
        assert_eq!(report.rows[1].last_price_converted, "");
        assert_eq!(report.rows[1].last_price_original, "7.00");
        assert_eq!(report.rows[1].order_currency, "");
        assert_eq!(feed.call_count(), 10);
    }

    #[test]
    fn test_end_to_end_run() {
        let dir = tempfile::tempdir().unwrap();
        let header_path = dir.path().join("headers.csv");
        let items_path = dir.path().join("items.csv");
        std::fs::write(
            &header_path,
            "codigo_pedido,data_pedido,moeda\n\
             P1,2024-01-15,BRL\n\
             P2,2024-03-20,USD\n\
             P3,2023-12-01,USD\n",
        )
        .unwrap();
        std::fs::write(
            &items_path,
            "codigo_pedido,codigo_material,valor_total_item_pedido\n\
             P1,M-100,1500.00\n\
             P3,M-200,80.00\n\
             P2,M-200,100.00\n",
        )
        .unwrap();

        // 2024-05-12 is a Sunday; the latest quotation is Friday's.
        let mut feed = ScriptedFeed::default();
        feed.quote("USD", at(2024, 5, 10, 10), Some(dec!(5.05)));
        feed.quote("USD", at(2024, 5, 10, 13), Some(dec!(5.10)));

        let config = config::PipelineConfig {
            header_path,
            items_path,
            output_dir: dir.path().join("out"),
            reference_currency: "BRL".to_string(),
            as_of: day(2024, 5, 12),
            feed_url: String::new(),
            timeout: std::time::Duration::from_secs(1),
            max_fallback_days: 10,
            write_xlsx: true,
        };

        let report = generate_report(&config, &feed).unwrap();
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].quotation_date, None);
        assert_eq!(report.rows[1].reference_order_code, "P2");
        assert_eq!(report.rows[1].last_price_converted, "R$510.00");
        assert_eq!(report.rows[1].quotation_date, Some(day(2024, 5, 10)));
        assert_eq!(feed.call_count(), 3);

        let csv_text = std::fs::read_to_string(config.csv_output_path()).unwrap();
        let mut lines = csv_text.lines();
        assert_eq!(lines.next().unwrap(), REPORT_COLUMNS.join(","));
        assert_eq!(lines.next().unwrap(), "M-100,\"R$1,500.00\",\"R$1,500.00\",BRL,2024-01-15,P1,");
        assert_eq!(lines.next().unwrap(), "M-200,R$510.00,US$100.00,USD,2024-03-20,P2,2024-05-10");
        assert!(config.xlsx_output_path().is_file());
    }

    #[test]
    fn test_empty_report_still_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write_csv(&[], &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap().trim_end(), REPORT_COLUMNS.join(","));
    }
}
