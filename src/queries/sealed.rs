//! Sealed product queries over the `sealedProduct` column of `sets`.
//!
//! The flat CDN `sets.parquet` does not carry this column, so every
//! method degrades to an empty result when the query fails to bind it.

use crate::engine::{Engine, Param};
use crate::error::{Error, Result};
use crate::query::QueryBuilder;
use serde_json::Value;

/// Query surface for sealed products (booster boxes, bundles, ...).
pub struct SealedQuery<'a> {
    engine: &'a Engine,
}

impl<'a> SealedQuery<'a> {
    pub(crate) fn new(engine: &'a Engine) -> Self {
        Self { engine }
    }

    fn ensure(&self) -> Result<()> {
        self.engine.ensure_views(&["sets"])
    }

    /// Sealed products as JSON objects, each tagged with `setCode` and
    /// `setName`, optionally filtered by set code and product
    /// category. `limit` bounds the number of sets scanned.
    pub fn list(
        &self,
        set_code: Option<&str>,
        category: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Value>> {
        self.ensure()?;
        let mut q = QueryBuilder::new("sets");
        q.select(&["code", "name AS setName", "sealedProduct"]);
        if let Some(code) = set_code {
            q.where_eq("code", code.to_uppercase());
        }
        q.limit(limit);
        let (sql, params) = q.build();

        let rows = match self.engine.execute(&sql, &params) {
            Ok(rows) => rows,
            // sealedProduct is absent from the flat sets.parquet
            Err(Error::Query(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut products = Vec::new();
        for row in rows {
            let Some(Value::Array(sealed)) = row.get("sealedProduct") else {
                continue;
            };
            for product in sealed {
                let Some(product) = product.as_object() else {
                    continue;
                };
                if let Some(wanted) = category {
                    if product.get("category").and_then(Value::as_str) != Some(wanted) {
                        continue;
                    }
                }
                let mut tagged = product.clone();
                if let Some(code) = row.get("code") {
                    tagged.insert("setCode".to_string(), code.clone());
                }
                if let Some(name) = row.get("setName") {
                    tagged.insert("setName".to_string(), name.clone());
                }
                products.push(Value::Object(tagged));
            }
        }
        Ok(products)
    }

    /// One sealed product by its UUID, located server-side via UNNEST
    /// over the nested column. `None` when absent (or when the column
    /// does not exist in this sets source).
    pub fn get(&self, uuid: &str) -> Result<Option<Value>> {
        self.ensure()?;
        let sql = "\
            SELECT sub.code AS setCode, sub.sp AS product \
            FROM (\
              SELECT code, UNNEST(sealedProduct) AS sp \
              FROM sets WHERE sealedProduct IS NOT NULL\
            ) sub \
            WHERE sub.sp.uuid = $1 \
            LIMIT 1";
        let rows = match self.engine.execute(sql, &[Param::from(uuid)]) {
            Ok(rows) => rows,
            Err(Error::Query(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        let Some(row) = rows.into_iter().next() else {
            return Ok(None);
        };
        let Some(Value::Object(mut product)) = row.get("product").cloned() else {
            return Ok(None);
        };
        if let Some(code) = row.get("setCode") {
            product.insert("setCode".to_string(), code.clone());
        }
        Ok(Some(Value::Object(product)))
    }
}
