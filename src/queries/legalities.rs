//! Format legality queries over the tall `card_legalities` view.

use crate::engine::{Engine, Param};
use crate::error::Result;
use crate::models::{CardPrinting, CardRef};
use serde_json::Value;
use std::collections::HashMap;

/// Query surface for per-format card legality.
pub struct LegalityQuery<'a> {
    engine: &'a Engine,
}

impl<'a> LegalityQuery<'a> {
    pub(crate) fn new(engine: &'a Engine) -> Self {
        Self { engine }
    }

    fn ensure(&self) -> Result<()> {
        self.engine.ensure_views(&["card_legalities"])
    }

    /// Every format status recorded for a card, as format → status
    /// (e.g. `{"modern": "Legal", "vintage": "Restricted"}`).
    pub fn formats_for_card(&self, uuid: &str) -> Result<HashMap<String, String>> {
        self.ensure()?;
        let rows = self.engine.execute(
            "SELECT format, status FROM card_legalities WHERE uuid = $1",
            &[Param::from(uuid)],
        )?;
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let format = row.get("format").and_then(Value::as_str)?.to_string();
                let status = row.get("status").and_then(Value::as_str)?.to_string();
                Some((format, status))
            })
            .collect())
    }

    /// Whether a card has `Legal` status in the given format.
    pub fn is_legal(&self, uuid: &str, format: &str) -> Result<bool> {
        self.ensure()?;
        let count = self
            .engine
            .execute_scalar(
                "SELECT COUNT(*) FROM card_legalities \
                 WHERE uuid = $1 AND format = $2 AND status = 'Legal'",
                &[Param::from(uuid), Param::from(format)],
            )?
            .and_then(|v| v.as_i64())
            .unwrap_or(0);
        Ok(count > 0)
    }

    /// Distinct cards legal in a format, ordered by name.
    pub fn legal_in(&self, format: &str, limit: usize, offset: usize) -> Result<Vec<CardPrinting>> {
        self.engine.ensure_views(&["cards", "card_legalities"])?;
        let sql = format!(
            "SELECT DISTINCT c.* FROM cards c \
             JOIN card_legalities cl ON c.uuid = cl.uuid \
             WHERE cl.format = $1 AND cl.status = 'Legal' \
             ORDER BY c.name ASC \
             LIMIT {limit} OFFSET {offset}"
        );
        self.engine.execute_typed(&sql, &[Param::from(format)])
    }

    fn by_status(
        &self,
        format: &str,
        status: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<CardRef>> {
        self.engine.ensure_views(&["cards", "card_legalities"])?;
        let sql = format!(
            "SELECT c.name, c.uuid FROM cards c \
             JOIN card_legalities cl ON c.uuid = cl.uuid \
             WHERE cl.format = $1 AND cl.status = $2 \
             ORDER BY c.name ASC \
             LIMIT {limit} OFFSET {offset}"
        );
        self.engine
            .execute_typed(&sql, &[Param::from(format), Param::from(status)])
    }

    /// Cards banned in a format, as `{name, uuid}` ordered by name.
    pub fn banned_in(&self, format: &str, limit: usize, offset: usize) -> Result<Vec<CardRef>> {
        self.by_status(format, "Banned", limit, offset)
    }

    /// Cards restricted in a format.
    pub fn restricted_in(&self, format: &str, limit: usize, offset: usize) -> Result<Vec<CardRef>> {
        self.by_status(format, "Restricted", limit, offset)
    }

    /// Cards suspended in a format.
    pub fn suspended_in(&self, format: &str, limit: usize, offset: usize) -> Result<Vec<CardRef>> {
        self.by_status(format, "Suspended", limit, offset)
    }

    /// Cards explicitly not legal in a format.
    pub fn not_legal_in(&self, format: &str, limit: usize, offset: usize) -> Result<Vec<CardRef>> {
        self.by_status(format, "Not Legal", limit, offset)
    }
}
