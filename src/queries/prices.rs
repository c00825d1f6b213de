//! Price queries over the ingested `prices_today` table.
//!
//! Prices ship as `AllPricesToday.json.gz` rather than parquet, so on
//! first use the document is stream-flattened and bulk loaded through
//! [`crate::ingest`]. When the file cannot be fetched (offline, never
//! cached) the query surface degrades to empty results rather than
//! failing, matching the rest of the read paths.

use crate::engine::{Engine, Param};
use crate::error::{Error, Result};
use crate::ingest;
use crate::models::{CheapestPrinting, PriceRow, PriceTrend, PriciestPrinting, PrintingPrice};
use serde_json::{Map, Value};
use tracing::warn;

/// Query surface for card prices.
pub struct PriceQuery<'a> {
    engine: &'a Engine,
}

impl<'a> PriceQuery<'a> {
    pub(crate) fn new(engine: &'a Engine) -> Self {
        Self { engine }
    }

    /// Make sure the price table is loaded. Returns false when price
    /// data is unavailable (missing from an offline cache or an empty
    /// document); parse failures propagate.
    fn ensure_loaded(&self) -> Result<bool> {
        if self.engine.has_view(ingest::PRICES_TABLE) {
            return Ok(true);
        }
        let path = match self.engine.cache.borrow_mut().ensure_file("all_prices_today") {
            Ok(path) => path,
            Err(Error::NotCached(name)) => {
                warn!(file = %name, "price data not available");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };
        ingest::load_prices(self.engine, &path)
    }

    /// Full price data for a card, reconstructed into the upstream
    /// nested shape `{source → {provider → {currency, category →
    /// {finish → {date → price}}}}}`. `None` when the card has no
    /// price rows.
    pub fn get(&self, uuid: &str) -> Result<Option<Value>> {
        if !self.ensure_loaded()? {
            return Ok(None);
        }
        let rows: Vec<PriceRow> = self.engine.execute_typed(
            "SELECT * FROM prices_today WHERE uuid = $1 \
             ORDER BY source, provider, category, finish, date",
            &[Param::from(uuid)],
        )?;
        if rows.is_empty() {
            return Ok(None);
        }

        let mut root = Map::new();
        for row in rows {
            let source = root
                .entry(row.source)
                .or_insert_with(|| Value::Object(Map::new()));
            let Some(source) = source.as_object_mut() else { continue };
            let provider = source.entry(row.provider).or_insert_with(|| {
                let mut p = Map::new();
                p.insert("currency".to_string(), Value::String(row.currency.clone()));
                Value::Object(p)
            });
            let Some(provider) = provider.as_object_mut() else { continue };
            let category = provider
                .entry(row.category)
                .or_insert_with(|| Value::Object(Map::new()));
            let Some(category) = category.as_object_mut() else { continue };
            let finish = category
                .entry(row.finish)
                .or_insert_with(|| Value::Object(Map::new()));
            let Some(finish) = finish.as_object_mut() else { continue };
            if let Some(price) = serde_json::Number::from_f64(row.price) {
                finish.insert(row.date, Value::Number(price));
            }
        }
        Ok(Some(Value::Object(root)))
    }

    /// Price rows at the most recent date recorded for the card,
    /// optionally narrowed by provider, finish, and category.
    pub fn today(
        &self,
        uuid: &str,
        provider: Option<&str>,
        finish: Option<&str>,
        category: Option<&str>,
    ) -> Result<Vec<PriceRow>> {
        if !self.ensure_loaded()? {
            return Ok(Vec::new());
        }
        let mut sql = String::from(
            "SELECT * FROM prices_today WHERE uuid = $1 \
             AND date = (SELECT MAX(p2.date) FROM prices_today p2 WHERE p2.uuid = $1)",
        );
        let mut params = vec![Param::from(uuid)];
        append_filter(&mut sql, &mut params, "provider", provider);
        append_filter(&mut sql, &mut params, "finish", finish);
        append_filter(&mut sql, &mut params, "category", category);
        self.engine.execute_typed(&sql, &params)
    }

    /// Price history for a card, oldest first, with optional
    /// provider/finish/category filters and an inclusive date range.
    pub fn history(
        &self,
        uuid: &str,
        provider: Option<&str>,
        finish: Option<&str>,
        category: Option<&str>,
        date_from: Option<&str>,
        date_to: Option<&str>,
    ) -> Result<Vec<PriceRow>> {
        if !self.ensure_loaded()? {
            return Ok(Vec::new());
        }
        let mut sql = String::from("SELECT * FROM prices_today WHERE uuid = $1");
        let mut params = vec![Param::from(uuid)];
        append_filter(&mut sql, &mut params, "provider", provider);
        append_filter(&mut sql, &mut params, "finish", finish);
        append_filter(&mut sql, &mut params, "category", category);
        if let Some(from) = date_from {
            sql.push_str(&format!(" AND date >= ${}", params.len() + 1));
            params.push(Param::from(from));
        }
        if let Some(to) = date_to {
            sql.push_str(&format!(" AND date <= ${}", params.len() + 1));
            params.push(Param::from(to));
        }
        sql.push_str(" ORDER BY date ASC");
        self.engine.execute_typed(&sql, &params)
    }

    /// Min/max/average price and date span for a card within one
    /// category (default callers pass `"retail"`). `None` when no
    /// matching rows exist.
    pub fn price_trend(
        &self,
        uuid: &str,
        provider: Option<&str>,
        finish: Option<&str>,
        category: &str,
    ) -> Result<Option<PriceTrend>> {
        if !self.ensure_loaded()? {
            return Ok(None);
        }
        let mut sql = String::from(
            "SELECT \
               MIN(price) AS min_price, \
               MAX(price) AS max_price, \
               ROUND(AVG(price), 2) AS avg_price, \
               MIN(date) AS first_date, \
               MAX(date) AS last_date, \
               COUNT(*) AS data_points \
             FROM prices_today WHERE uuid = $1 AND category = $2",
        );
        let mut params = vec![Param::from(uuid), Param::from(category)];
        append_filter(&mut sql, &mut params, "provider", provider);
        append_filter(&mut sql, &mut params, "finish", finish);

        let rows = self.engine.execute(&sql, &params)?;
        match rows.into_iter().next() {
            Some(row) if row.get("data_points").and_then(Value::as_i64).unwrap_or(0) > 0 => {
                Ok(Some(serde_json::from_value(Value::Object(row))?))
            }
            _ => Ok(None),
        }
    }

    /// The cheapest printing of a named card, taking each printing at
    /// its own most recent price date.
    pub fn cheapest_printing(
        &self,
        name: &str,
        provider: &str,
        finish: &str,
        category: &str,
    ) -> Result<Option<PrintingPrice>> {
        if !self.ensure_loaded()? {
            return Ok(None);
        }
        self.engine.ensure_views(&["cards"])?;
        let sql = "\
            SELECT c.uuid, c.setCode, c.number, p.price, p.date \
            FROM cards c \
            JOIN prices_today p ON c.uuid = p.uuid \
            WHERE c.name = $1 AND p.provider = $2 \
              AND p.finish = $3 AND p.category = $4 \
              AND p.date = (SELECT MAX(p2.date) FROM prices_today p2 \
                            WHERE p2.uuid = c.uuid AND p2.provider = $2 \
                              AND p2.finish = $3 AND p2.category = $4) \
            ORDER BY p.price ASC \
            LIMIT 1";
        let mut rows: Vec<PrintingPrice> = self.engine.execute_typed(
            sql,
            &[
                Param::from(name),
                Param::from(provider),
                Param::from(finish),
                Param::from(category),
            ],
        )?;
        Ok(if rows.is_empty() { None } else { Some(rows.remove(0)) })
    }

    /// One row per card name with its cheapest printing at the global
    /// latest price date, cheapest names first. Single-pass `arg_min`
    /// aggregation.
    pub fn cheapest_printings(
        &self,
        provider: &str,
        finish: &str,
        category: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<CheapestPrinting>> {
        if !self.ensure_loaded()? {
            return Ok(Vec::new());
        }
        self.engine.ensure_views(&["cards"])?;
        let sql = format!(
            "SELECT c.name, \
               arg_min(c.setCode, p.price) AS cheapest_set, \
               arg_min(c.number, p.price) AS cheapest_number, \
               arg_min(c.uuid, p.price) AS cheapest_uuid, \
               MIN(p.price) AS min_price \
             FROM cards c \
             JOIN prices_today p ON c.uuid = p.uuid \
             WHERE p.provider = $1 AND p.finish = $2 AND p.category = $3 \
               AND p.date = (SELECT MAX(date) FROM prices_today) \
             GROUP BY c.name \
             ORDER BY min_price ASC \
             LIMIT {limit} OFFSET {offset}"
        );
        self.engine.execute_typed(
            &sql,
            &[Param::from(provider), Param::from(finish), Param::from(category)],
        )
    }

    /// One row per card name with its most expensive printing at the
    /// global latest price date, priciest names first.
    pub fn most_expensive_printings(
        &self,
        provider: &str,
        finish: &str,
        category: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<PriciestPrinting>> {
        if !self.ensure_loaded()? {
            return Ok(Vec::new());
        }
        self.engine.ensure_views(&["cards"])?;
        let sql = format!(
            "SELECT c.name, \
               arg_max(c.setCode, p.price) AS priciest_set, \
               arg_max(c.number, p.price) AS priciest_number, \
               arg_max(c.uuid, p.price) AS priciest_uuid, \
               MAX(p.price) AS max_price \
             FROM cards c \
             JOIN prices_today p ON c.uuid = p.uuid \
             WHERE p.provider = $1 AND p.finish = $2 AND p.category = $3 \
               AND p.date = (SELECT MAX(date) FROM prices_today) \
             GROUP BY c.name \
             ORDER BY max_price DESC \
             LIMIT {limit} OFFSET {offset}"
        );
        self.engine.execute_typed(
            &sql,
            &[Param::from(provider), Param::from(finish), Param::from(category)],
        )
    }
}

/// Append `AND column = $N` when the filter is present.
fn append_filter(sql: &mut String, params: &mut Vec<Param>, column: &str, value: Option<&str>) {
    if let Some(value) = value {
        sql.push_str(&format!(" AND {column} = ${}", params.len() + 1));
        params.push(Param::from(value));
    }
}
