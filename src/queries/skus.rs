//! TCGplayer SKU queries over the ingested `tcgplayer_skus` table.
//!
//! Loaded lazily from `TcgplayerSkus.json.gz` through the same
//! streaming NDJSON path as prices.

use crate::engine::{Engine, Param, Row};
use crate::error::{Error, Result};
use crate::ingest;
use crate::models::SkuRecord;
use tracing::warn;

/// Query surface for purchasable card variants (SKUs).
pub struct SkuQuery<'a> {
    engine: &'a Engine,
}

impl<'a> SkuQuery<'a> {
    pub(crate) fn new(engine: &'a Engine) -> Self {
        Self { engine }
    }

    fn ensure_loaded(&self) -> Result<bool> {
        if self.engine.has_view(ingest::SKUS_TABLE) {
            return Ok(true);
        }
        let path = match self.engine.cache.borrow_mut().ensure_file("tcgplayer_skus") {
            Ok(path) => path,
            Err(Error::NotCached(name)) => {
                warn!(file = %name, "SKU data not available");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };
        ingest::load_skus(self.engine, &path)
    }

    /// All SKUs for a card UUID (typically several per printing).
    pub fn get(&self, uuid: &str) -> Result<Vec<SkuRecord>> {
        if !self.ensure_loaded()? {
            return Ok(Vec::new());
        }
        self.engine.execute_typed(
            "SELECT * FROM tcgplayer_skus WHERE uuid = $1",
            &[Param::from(uuid)],
        )
    }

    /// The SKU with the given TCGplayer SKU id, if any.
    pub fn find_by_sku_id(&self, sku_id: i64) -> Result<Option<SkuRecord>> {
        if !self.ensure_loaded()? {
            return Ok(None);
        }
        let mut rows: Vec<SkuRecord> = self.engine.execute_typed(
            "SELECT * FROM tcgplayer_skus WHERE skuId = $1",
            &[Param::from(sku_id)],
        )?;
        Ok(if rows.is_empty() { None } else { Some(rows.remove(0)) })
    }

    /// All SKUs under one TCGplayer product id.
    pub fn find_by_product_id(&self, product_id: i64) -> Result<Vec<SkuRecord>> {
        if !self.ensure_loaded()? {
            return Ok(Vec::new());
        }
        self.engine.execute_typed(
            "SELECT * FROM tcgplayer_skus WHERE productId = $1",
            &[Param::from(product_id)],
        )
    }

    /// Raw SKU rows for a card, for callers that want columns the
    /// typed record does not carry.
    pub fn get_rows(&self, uuid: &str) -> Result<Vec<Row>> {
        if !self.ensure_loaded()? {
            return Ok(Vec::new());
        }
        self.engine.execute(
            "SELECT * FROM tcgplayer_skus WHERE uuid = $1",
            &[Param::from(uuid)],
        )
    }
}
