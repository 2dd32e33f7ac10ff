use crate::csv_processor;

/// Most recent purchase of one material, joined with its order header.
#[derive(Debug, Clone, PartialEq)]
pub struct LatestPurchase {
    pub material_code: String,
    pub order_code: String,
    pub ordered_at: Option<chrono::NaiveDateTime>,
    pub currency: Option<String>,
    pub line_total: Option<rust_decimal::Decimal>,
}

impl LatestPurchase {
    /// Ordering used to pick the winner among purchases of one material:
    /// order date first (a missing date loses to any date), then order code.
    fn recency_key(&self) -> (Option<chrono::NaiveDateTime>, &str) {
        (self.ordered_at, self.order_code.as_str())
    }
}

/// Reduces the item table to one row per material: its latest purchase.
///
/// Items are joined to their order header by order code; items whose order
/// is unknown keep an absent date and currency. When several headers share
/// an order code the first one is used. Among equally recent purchases with
/// the same order code the one appearing later in the items table wins.
///
/// # Arguments
/// * `tables` - Header and item tables as read from disk.
///
/// # Returns
/// * `Vec<LatestPurchase>` - One entry per distinct material, sorted by material code.
pub fn latest_purchase_per_material(tables: &csv_processor::PurchaseTables) -> Vec<LatestPurchase> {
    let mut header_by_code: std::collections::HashMap<&str, &csv_processor::OrderHeader> =
        std::collections::HashMap::with_capacity(tables.headers.len());
    for header in &tables.headers {
        header_by_code.entry(header.order_code.as_str()).or_insert(header);
    }

    let mut latest: std::collections::BTreeMap<String, LatestPurchase> = std::collections::BTreeMap::new();
    for item in &tables.items {
        if item.material_code.is_empty() {
            log::debug!("Skipping item of order {} without material code", item.order_code);
            continue;
        }

        let header = header_by_code.get(item.order_code.as_str());
        let candidate = LatestPurchase {
            material_code: item.material_code.clone(),
            order_code: item.order_code.clone(),
            ordered_at: header.and_then(|h| h.ordered_at),
            currency: header.and_then(|h| h.currency.clone()),
            line_total: item.line_total,
        };

        match latest.get_mut(&item.material_code) {
            Some(current) if candidate.recency_key() >= current.recency_key() => *current = candidate,
            Some(_) => {}
            None => {
                latest.insert(item.material_code.clone(), candidate);
            }
        }
    }

    latest.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv_processor::{OrderHeader, OrderItem, PurchaseTables};
    use rust_decimal_macros::dec;

    fn header(code: &str, date: Option<(i32, u32, u32)>, currency: &str) -> OrderHeader {
        OrderHeader {
            order_code: code.to_string(),
            ordered_at: date.map(|(y, m, d)| {
                chrono::NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
            }),
            currency: Some(currency.to_string()),
        }
    }

    fn item(order: &str, material: &str, total: rust_decimal::Decimal) -> OrderItem {
        OrderItem {
            order_code: order.to_string(),
            material_code: material.to_string(),
            line_total: Some(total),
        }
    }

    #[test]
    fn test_latest_order_date_wins() {
        let tables = PurchaseTables {
            headers: vec![
                header("P1", Some((2024, 1, 10)), "BRL"),
                header("P2", Some((2024, 3, 5)), "USD"),
                header("P3", Some((2024, 2, 1)), "EUR"),
            ],
            items: vec![
                item("P1", "M1", dec!(10)),
                item("P2", "M1", dec!(20)),
                item("P3", "M1", dec!(30)),
                item("P1", "M0", dec!(5)),
            ],
        };

        let rows = latest_purchase_per_material(&tables);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].material_code, "M0");
        assert_eq!(rows[1].order_code, "P2");
        assert_eq!(rows[1].currency.as_deref(), Some("USD"));
        assert_eq!(rows[1].line_total, Some(dec!(20)));
    }

    #[test]
    fn test_same_day_ties_break_on_order_code() {
        let tables = PurchaseTables {
            headers: vec![
                header("P9", Some((2024, 3, 5)), "BRL"),
                header("P10", Some((2024, 3, 5)), "BRL"),
            ],
            items: vec![item("P9", "M1", dec!(1)), item("P10", "M1", dec!(2))],
        };

        let rows = latest_purchase_per_material(&tables);
        assert_eq!(rows[0].order_code, "P9");
    }

    #[test]
    fn test_missing_dates_and_orders_lose() {
        let tables = PurchaseTables {
            headers: vec![header("P1", None, "BRL"), header("P2", Some((2020, 1, 1)), "BRL")],
            items: vec![
                item("P2", "M1", dec!(2)),
                item("P1", "M1", dec!(1)),
                item("UNKNOWN", "M2", dec!(3)),
                item("P1", "", dec!(4)),
            ],
        };

        let rows = latest_purchase_per_material(&tables);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].order_code, "P2");
        assert_eq!(rows[1].material_code, "M2");
        assert_eq!(rows[1].ordered_at, None);
        assert_eq!(rows[1].currency, None);
    }
}
