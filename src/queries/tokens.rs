//! Token lookups and search over the `tokens` view.

use crate::engine::{Engine, Param};
use crate::error::Result;
use crate::models::TokenPrinting;
use crate::query::QueryBuilder;

/// Filters for [`TokenQuery::search`].
#[derive(Debug, Clone, Default)]
pub struct SearchTokens {
    /// Exact name, or LIKE pattern when it contains `%`.
    pub name: Option<String>,
    pub set_code: Option<String>,
    /// Tokens containing all of these colors.
    pub colors: Option<Vec<String>>,
    /// Type line LIKE pattern.
    pub types: Option<String>,
    /// Artist LIKE substring.
    pub artist: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Query surface for token printings.
pub struct TokenQuery<'a> {
    engine: &'a Engine,
}

impl<'a> TokenQuery<'a> {
    pub(crate) fn new(engine: &'a Engine) -> Self {
        Self { engine }
    }

    fn ensure(&self) -> Result<()> {
        self.engine.ensure_views(&["tokens"])
    }

    pub fn get_by_uuid(&self, uuid: &str) -> Result<Option<TokenPrinting>> {
        self.ensure()?;
        let mut rows: Vec<TokenPrinting> = self.engine.execute_typed(
            "SELECT * FROM tokens WHERE uuid = $1",
            &[Param::from(uuid)],
        )?;
        Ok(if rows.is_empty() { None } else { Some(rows.remove(0)) })
    }

    /// Bulk lookup; empty input returns empty without touching the engine.
    pub fn get_by_uuids(&self, uuids: &[&str]) -> Result<Vec<TokenPrinting>> {
        if uuids.is_empty() {
            return Ok(Vec::new());
        }
        self.ensure()?;
        let mut q = QueryBuilder::new("tokens");
        q.where_in("uuid", uuids);
        let (sql, params) = q.build();
        self.engine.execute_typed(&sql, &params)
    }

    pub fn get_by_name(&self, name: &str, set_code: Option<&str>) -> Result<Vec<TokenPrinting>> {
        self.ensure()?;
        let mut q = QueryBuilder::new("tokens");
        q.where_eq("name", name);
        if let Some(code) = set_code {
            q.where_eq("setCode", code);
        }
        let (sql, params) = q.build();
        self.engine.execute_typed(&sql, &params)
    }

    pub fn search(&self, filters: &SearchTokens) -> Result<Vec<TokenPrinting>> {
        self.ensure()?;
        let mut q = QueryBuilder::new("tokens");

        if let Some(name) = &filters.name {
            if name.contains('%') {
                q.where_like("tokens.name", name);
            } else {
                q.where_eq("tokens.name", name.as_str());
            }
        }
        if let Some(code) = &filters.set_code {
            q.where_eq("tokens.setCode", code);
        }
        for color in filters.colors.iter().flatten() {
            q.where_clause("list_contains(tokens.colors, $1)", vec![Param::from(color)]);
        }
        if let Some(types) = &filters.types {
            q.where_like("tokens.type", &format!("%{types}%"));
        }
        if let Some(artist) = &filters.artist {
            q.where_like("tokens.artist", &format!("%{artist}%"));
        }
        q.limit(filters.limit.unwrap_or(100));
        q.offset(filters.offset.unwrap_or(0));

        let (sql, params) = q.build();
        self.engine.execute_typed(&sql, &params)
    }

    /// Every token printed in a set.
    pub fn for_set(&self, set_code: &str) -> Result<Vec<TokenPrinting>> {
        self.search(&SearchTokens {
            set_code: Some(set_code.to_string()),
            limit: Some(1000),
            ..Default::default()
        })
    }

    /// Count tokens matching the given column equality filters.
    pub fn count(&self, filters: &[(&str, Param)]) -> Result<i64> {
        self.ensure()?;
        let mut q = QueryBuilder::new("tokens");
        q.select(&["COUNT(*)"]);
        for (column, value) in filters {
            q.where_eq(column, value.clone());
        }
        let (sql, params) = q.build();
        Ok(self
            .engine
            .execute_scalar(&sql, &params)?
            .and_then(|v| v.as_i64())
            .unwrap_or(0))
    }
}
