use crate::utils;

/// Raw row of the order header table, every cell kept as text.
#[derive(Debug, serde::Deserialize)]
struct HeaderCsvRecord {
    codigo_pedido: String,
    #[serde(default)]
    data_pedido: String,
    #[serde(default)]
    moeda: String,
}

/// Raw row of the order items table, every cell kept as text.
#[derive(Debug, serde::Deserialize)]
struct ItemCsvRecord {
    codigo_pedido: String,
    codigo_material: String,
    #[serde(default)]
    valor_total_item_pedido: String,
}

/// One purchase order: when it was placed and in which currency.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderHeader {
    pub order_code: String,
    pub ordered_at: Option<chrono::NaiveDateTime>,
    pub currency: Option<String>,
}

/// One line of a purchase order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub order_code: String,
    pub material_code: String,
    pub line_total: Option<rust_decimal::Decimal>,
}

/// Both input tables of a run.
#[derive(Debug, Default)]
pub struct PurchaseTables {
    pub headers: Vec<OrderHeader>,
    pub items: Vec<OrderItem>,
}

/// Replaces the reader's header row with its normalised form.
fn normalize_headers<R: std::io::Read>(reader: &mut csv::Reader<R>) -> anyhow::Result<()> {
    let normalized: csv::StringRecord = reader
        .headers()?
        .iter()
        .map(utils::normalize_header)
        .collect();
    reader.set_headers(normalized);
    anyhow::Ok(())
}

/// Reads order headers from a CSV reader.
///
/// Dates and currencies that cannot be interpreted become `None`;
/// only a structurally broken table (for example no `codigo_pedido`
/// column) is an error.
///
/// # Arguments
/// * `reader` - CSV reader positioned before the header row.
///
/// # Returns
/// * `anyhow::Result<Vec<OrderHeader>>` - Parsed headers in file order.
pub fn process_header_records<R: std::io::Read>(reader: &mut csv::Reader<R>) -> anyhow::Result<Vec<OrderHeader>> {
    normalize_headers(reader)?;

    let mut headers = Vec::new();
    for result in reader.deserialize::<HeaderCsvRecord>() {
        let record = result?;
        let ordered_at = utils::parse_datetime_lenient(&record.data_pedido);
        if ordered_at.is_none() && !record.data_pedido.trim().is_empty() {
            log::debug!(
                "Order {}: unreadable date {:?}",
                record.codigo_pedido.trim(),
                record.data_pedido
            );
        }
        headers.push(OrderHeader {
            order_code: record.codigo_pedido.trim().to_string(),
            ordered_at,
            currency: utils::normalize_currency(&record.moeda),
        });
    }

    anyhow::Ok(headers)
}

/// Reads order items from a CSV reader.
///
/// # Arguments
/// * `reader` - CSV reader positioned before the header row.
///
/// # Returns
/// * `anyhow::Result<Vec<OrderItem>>` - Parsed items in file order; unreadable
///   line totals are `None`.
pub fn process_item_records<R: std::io::Read>(reader: &mut csv::Reader<R>) -> anyhow::Result<Vec<OrderItem>> {
    normalize_headers(reader)?;

    let mut items = Vec::new();
    for result in reader.deserialize::<ItemCsvRecord>() {
        let record = result?;
        items.push(OrderItem {
            order_code: record.codigo_pedido.trim().to_string(),
            material_code: record.codigo_material.trim().to_string(),
            line_total: utils::parse_decimal(&record.valor_total_item_pedido),
        });
    }

    anyhow::Ok(items)
}

/// Reader settings for both input tables.
///
/// Rows shorter than the header are accepted; their missing trailing cells
/// fall back to the record defaults.
fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(true).flexible(true);
    builder
}

fn open_reader<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<csv::Reader<std::fs::File>> {
    let file = std::fs::File::open(path.as_ref())
        .map_err(|e| anyhow::anyhow!("Failed to open {}: {}", path.as_ref().display(), e))?;
    anyhow::Ok(reader_builder().from_reader(file))
}

pub fn read_order_headers<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Vec<OrderHeader>> {
    let mut reader = open_reader(path.as_ref())?;
    process_header_records(&mut reader)
        .map_err(|e| anyhow::anyhow!("Failed to read order headers from {}: {}", path.as_ref().display(), e))
}

pub fn read_order_items<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Vec<OrderItem>> {
    let mut reader = open_reader(path.as_ref())?;
    process_item_records(&mut reader)
        .map_err(|e| anyhow::anyhow!("Failed to read order items from {}: {}", path.as_ref().display(), e))
}

/// Loads the header and item tables side by side on the rayon pool.
///
/// # Arguments
/// * `header_path` - Path to the order header CSV.
/// * `items_path` - Path to the order items CSV.
///
/// # Returns
/// * `anyhow::Result<PurchaseTables>` - Both tables, or the first error encountered.
pub fn load_purchase_tables<P: AsRef<std::path::Path> + Sync>(
    header_path: P,
    items_path: P,
) -> anyhow::Result<PurchaseTables> {
    let (headers, items) = rayon::join(
        || read_order_headers(header_path.as_ref()),
        || read_order_items(items_path.as_ref()),
    );

    anyhow::Ok(PurchaseTables {
        headers: headers?,
        items: items?,
    })
}
