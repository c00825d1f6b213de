//! Set metadata queries, plus the per-set financial summary.

use crate::engine::{Engine, Param};
use crate::error::Result;
use crate::ingest;
use crate::models::{FinancialSummary, SetSummary};
use crate::query::QueryBuilder;
use serde_json::Value;

/// Filters for [`SetQuery::search`].
#[derive(Debug, Clone, Default)]
pub struct SearchSets {
    /// Substring match on the set name.
    pub name: Option<String>,
    pub set_type: Option<String>,
    /// Substring match on the block name.
    pub block: Option<String>,
    /// Year component of `releaseDate`.
    pub release_year: Option<i32>,
    pub limit: Option<usize>,
}

/// Query surface for MTG sets.
pub struct SetQuery<'a> {
    engine: &'a Engine,
}

impl<'a> SetQuery<'a> {
    pub(crate) fn new(engine: &'a Engine) -> Self {
        Self { engine }
    }

    fn ensure(&self) -> Result<()> {
        self.engine.ensure_views(&["sets"])
    }

    /// Exact lookup by set code; the input is uppercased first.
    pub fn get(&self, code: &str) -> Result<Option<SetSummary>> {
        self.ensure()?;
        let mut rows: Vec<SetSummary> = self.engine.execute_typed(
            "SELECT * FROM sets WHERE code = $1",
            &[Param::from(code.to_uppercase())],
        )?;
        Ok(if rows.is_empty() { None } else { Some(rows.remove(0)) })
    }

    /// List sets newest-first, with optional type and name filters.
    pub fn list(
        &self,
        set_type: Option<&str>,
        name: Option<&str>,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<Vec<SetSummary>> {
        self.ensure()?;
        let mut q = QueryBuilder::new("sets");
        if let Some(t) = set_type {
            q.where_eq("type", t);
        }
        if let Some(n) = name {
            if n.contains('%') {
                q.where_like("name", n);
            } else {
                q.where_eq("name", n);
            }
        }
        q.order_by(&["releaseDate DESC"]);
        q.limit(limit.unwrap_or(1000));
        q.offset(offset.unwrap_or(0));
        let (sql, params) = q.build();
        self.engine.execute_typed(&sql, &params)
    }

    /// Search sets by name/block substring, type, and release year.
    pub fn search(&self, filters: &SearchSets) -> Result<Vec<SetSummary>> {
        self.ensure()?;
        let mut q = QueryBuilder::new("sets");
        if let Some(name) = &filters.name {
            q.where_like("name", &format!("%{name}%"));
        }
        if let Some(t) = &filters.set_type {
            q.where_eq("type", t);
        }
        if let Some(block) = &filters.block {
            q.where_like("block", &format!("%{block}%"));
        }
        if let Some(year) = filters.release_year {
            q.where_clause(
                "EXTRACT(YEAR FROM CAST(releaseDate AS DATE)) = $1",
                vec![Param::from(year)],
            );
        }
        q.order_by(&["releaseDate DESC"]);
        q.limit(filters.limit.unwrap_or(100));
        let (sql, params) = q.build();
        self.engine.execute_typed(&sql, &params)
    }

    /// Total number of sets.
    pub fn count(&self) -> Result<i64> {
        self.ensure()?;
        Ok(self
            .engine
            .execute_scalar("SELECT COUNT(*) FROM sets", &[])?
            .and_then(|v| v.as_i64())
            .unwrap_or(0))
    }

    /// Aggregate price statistics for a set, computed over the latest
    /// price date for the given provider/currency/finish/category.
    ///
    /// Returns `None` when the prices table has not been loaded or no
    /// card of the set has a matching price.
    pub fn get_financial_summary(
        &self,
        set_code: &str,
        provider: &str,
        currency: &str,
        finish: &str,
        category: &str,
    ) -> Result<Option<FinancialSummary>> {
        self.engine.ensure_views(&["cards"])?;
        if !self.engine.has_view(ingest::PRICES_TABLE) {
            return Ok(None);
        }

        let sql = "\
            SELECT \
                COUNT(DISTINCT c.uuid) AS card_count, \
                ROUND(SUM(p.price), 2) AS total_value, \
                ROUND(AVG(p.price), 2) AS avg_value, \
                MIN(p.price) AS min_value, \
                MAX(p.price) AS max_value, \
                MAX(p.date) AS date \
            FROM cards c \
            JOIN prices_today p ON c.uuid = p.uuid \
            WHERE c.setCode = $1 \
              AND p.provider = $2 \
              AND p.currency = $3 \
              AND p.finish = $4 \
              AND p.category = $5 \
              AND p.date = (SELECT MAX(p2.date) FROM prices_today p2)";
        let rows = self.engine.execute(
            sql,
            &[
                Param::from(set_code.to_uppercase()),
                Param::from(provider),
                Param::from(currency),
                Param::from(finish),
                Param::from(category),
            ],
        )?;

        match rows.into_iter().next() {
            Some(row) if row.get("card_count").and_then(Value::as_i64).unwrap_or(0) > 0 => {
                Ok(Some(serde_json::from_value(Value::Object(row))?))
            }
            _ => Ok(None),
        }
    }
}
