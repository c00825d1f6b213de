//! Price, SKU, and financial aggregate records.

use serde::{Deserialize, Serialize};

/// One flattened price point from the ingested `prices_today` table.
///
/// Every field is guaranteed by ingestion: null prices never reach
/// the table, and `currency` defaults to USD.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceRow {
    pub uuid: String,
    /// `paper` or `mtgo`.
    pub source: String,
    pub provider: String,
    pub currency: String,
    /// `retail` or `buylist`.
    pub category: String,
    /// `normal`, `foil`, or `etched`.
    pub finish: String,
    /// ISO-8601 date.
    pub date: String,
    pub price: f64,
}

/// Aggregate price statistics for one card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceTrend {
    pub min_price: f64,
    pub max_price: f64,
    /// Rounded to two decimal places.
    pub avg_price: f64,
    pub first_date: String,
    pub last_date: String,
    pub data_points: i64,
}

/// Per-name cheapest printing, from the `arg_min` aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheapestPrinting {
    pub name: String,
    pub cheapest_set: String,
    pub cheapest_number: String,
    pub cheapest_uuid: String,
    pub min_price: f64,
}

/// Per-name most expensive printing, from the `arg_max` aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriciestPrinting {
    pub name: String,
    pub priciest_set: String,
    pub priciest_number: String,
    pub priciest_uuid: String,
    pub max_price: f64,
}

/// One printing with its current price, from the cheapest-printing
/// join of `cards` and `prices_today`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintingPrice {
    pub uuid: String,
    pub set_code: String,
    pub number: String,
    pub price: f64,
    pub date: String,
}

/// Aggregate price statistics for one set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub card_count: i64,
    pub total_value: f64,
    pub avg_value: f64,
    pub min_value: f64,
    pub max_value: f64,
    /// The price date the summary was computed over.
    pub date: String,
}

/// One TCGplayer SKU: a purchasable variant of a printing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkuRecord {
    pub uuid: String,
    pub sku_id: i64,
    pub product_id: Option<i64>,
    pub condition: Option<String>,
    pub finish: Option<String>,
    pub language: Option<String>,
    pub printing: Option<String>,
}
