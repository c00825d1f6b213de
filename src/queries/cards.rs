//! Card lookups and search over the `cards` view.

use crate::engine::{Engine, Param, Row};
use crate::error::Result;
use crate::models::{CardAtomic, CardPrinting};
use crate::query::QueryBuilder;
use serde_json::Value;

/// Fuzzy-name matches below this Jaro-Winkler score are dropped.
const FUZZY_THRESHOLD: f64 = 0.8;

// ---------------------------------------------------------------------------
// SearchCards
// ---------------------------------------------------------------------------

/// Filters for [`CardQuery::search`]. Unset fields are skipped; set
/// fields combine with AND.
#[derive(Debug, Clone, Default)]
pub struct SearchCards {
    /// Exact name, or LIKE pattern when it contains `%`.
    pub name: Option<String>,
    /// Typo-tolerant name match; results ordered by similarity.
    pub fuzzy_name: Option<String>,
    /// Foreign-language name (joins `card_foreign_data`).
    pub localized_name: Option<String>,
    pub set_code: Option<String>,
    /// Cards containing all of these colors.
    pub colors: Option<Vec<String>>,
    /// Cards whose color identity contains all of these.
    pub color_identity: Option<Vec<String>>,
    /// Type line LIKE pattern.
    pub types: Option<String>,
    pub rarity: Option<String>,
    /// Format name; keeps only cards with `Legal` status there.
    pub legal_in: Option<String>,
    pub mana_value: Option<f64>,
    pub mana_value_lte: Option<f64>,
    pub mana_value_gte: Option<f64>,
    /// Rules text LIKE substring.
    pub text: Option<String>,
    /// Rules text regex.
    pub text_regex: Option<String>,
    pub power: Option<String>,
    pub toughness: Option<String>,
    /// Artist LIKE substring.
    pub artist: Option<String>,
    pub keyword: Option<String>,
    pub is_promo: Option<bool>,
    /// `paper`, `mtgo`, `arena`, ...
    pub availability: Option<String>,
    pub language: Option<String>,
    pub layout: Option<String>,
    /// Set type (joins `sets`).
    pub set_type: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

// ---------------------------------------------------------------------------
// CardQuery
// ---------------------------------------------------------------------------

/// Query surface for card printings.
pub struct CardQuery<'a> {
    engine: &'a Engine,
}

impl<'a> CardQuery<'a> {
    pub(crate) fn new(engine: &'a Engine) -> Self {
        Self { engine }
    }

    fn ensure(&self) -> Result<()> {
        self.engine.ensure_views(&["cards"])
    }

    /// Exact key lookup by MTGJSON UUID.
    pub fn get_by_uuid(&self, uuid: &str) -> Result<Option<CardPrinting>> {
        self.ensure()?;
        let mut rows: Vec<CardPrinting> = self.engine.execute_typed(
            "SELECT * FROM cards WHERE uuid = $1",
            &[Param::from(uuid)],
        )?;
        Ok(if rows.is_empty() { None } else { Some(rows.remove(0)) })
    }

    /// Bulk lookup by UUID in one IN query; rows come back in database
    /// order. An empty input returns empty without touching the engine.
    pub fn get_by_uuids(&self, uuids: &[&str]) -> Result<Vec<CardPrinting>> {
        if uuids.is_empty() {
            return Ok(Vec::new());
        }
        self.ensure()?;
        let mut q = QueryBuilder::new("cards");
        q.where_in("uuid", uuids);
        let (sql, params) = q.build();
        self.engine.execute_typed(&sql, &params)
    }

    /// All printings with an exact name, optionally narrowed by set.
    /// Ordered `setCode DESC, number ASC`.
    pub fn get_by_name(&self, name: &str, set_code: Option<&str>) -> Result<Vec<CardPrinting>> {
        self.ensure()?;
        let mut q = QueryBuilder::new("cards");
        q.where_eq("name", name);
        if let Some(code) = set_code {
            q.where_eq("setCode", code);
        }
        q.order_by(&["setCode DESC", "number ASC"]);
        let (sql, params) = q.build();
        self.engine.execute_typed(&sql, &params)
    }

    /// All printings of a card across all sets.
    pub fn get_printings(&self, name: &str) -> Result<Vec<CardPrinting>> {
        self.get_by_name(name, None)
    }

    /// Multi-filter search; see [`SearchCards`] for the filter set.
    pub fn search(&self, filters: &SearchCards) -> Result<Vec<CardPrinting>> {
        self.ensure()?;
        let mut q = QueryBuilder::new("cards");

        if let Some(name) = &filters.name {
            if name.contains('%') {
                q.where_like("cards.name", name);
            } else {
                q.where_eq("cards.name", name.as_str());
            }
        }
        if let Some(fuzzy) = &filters.fuzzy_name {
            q.where_fuzzy("cards.name", fuzzy, FUZZY_THRESHOLD)?;
        }
        if let Some(code) = &filters.set_code {
            q.where_eq("cards.setCode", code);
        }
        if let Some(rarity) = &filters.rarity {
            q.where_eq("cards.rarity", rarity);
        }
        if let Some(mv) = filters.mana_value {
            q.where_eq("cards.manaValue", mv);
        }
        if let Some(mv) = filters.mana_value_lte {
            q.where_lte("cards.manaValue", mv);
        }
        if let Some(mv) = filters.mana_value_gte {
            q.where_gte("cards.manaValue", mv);
        }
        if let Some(text) = &filters.text {
            q.where_like("cards.text", &format!("%{text}%"));
        }
        if let Some(pattern) = &filters.text_regex {
            q.where_regex("cards.text", pattern);
        }
        if let Some(types) = &filters.types {
            q.where_like("cards.type", &format!("%{types}%"));
        }
        if let Some(power) = &filters.power {
            q.where_eq("cards.power", power);
        }
        if let Some(toughness) = &filters.toughness {
            q.where_eq("cards.toughness", toughness);
        }
        if let Some(artist) = &filters.artist {
            q.where_like("cards.artist", &format!("%{artist}%"));
        }
        if let Some(language) = &filters.language {
            q.where_eq("cards.language", language);
        }
        if let Some(layout) = &filters.layout {
            q.where_eq("cards.layout", layout);
        }
        if let Some(promo) = filters.is_promo {
            q.where_eq("cards.isPromo", promo);
        }
        for color in filters.colors.iter().flatten() {
            q.where_clause("list_contains(cards.colors, $1)", vec![Param::from(color)]);
        }
        for color in filters.color_identity.iter().flatten() {
            q.where_clause(
                "list_contains(cards.colorIdentity, $1)",
                vec![Param::from(color)],
            );
        }
        if let Some(keyword) = &filters.keyword {
            q.where_clause(
                "list_contains(cards.keywords, $1)",
                vec![Param::from(keyword)],
            );
        }
        if let Some(availability) = &filters.availability {
            q.where_clause(
                "list_contains(cards.availability, $1)",
                vec![Param::from(availability)],
            );
        }

        if let Some(localized) = &filters.localized_name {
            self.engine.ensure_views(&["card_foreign_data"])?;
            q.select(&["cards.*"]);
            q.join("JOIN card_foreign_data cfd ON cards.uuid = cfd.uuid");
            if localized.contains('%') {
                q.where_like("cfd.name", localized);
            } else {
                q.where_eq("cfd.name", localized.as_str());
            }
        }
        if let Some(format) = &filters.legal_in {
            self.engine.ensure_views(&["card_legalities"])?;
            q.select(&["cards.*"]);
            q.join("JOIN card_legalities cl ON cards.uuid = cl.uuid");
            q.where_eq("cl.format", format);
            q.where_eq("cl.status", "Legal");
        }
        if let Some(set_type) = &filters.set_type {
            self.engine.ensure_views(&["sets"])?;
            q.select(&["cards.*"]);
            q.join("JOIN sets s ON cards.setCode = s.code");
            q.where_eq("s.type", set_type);
        }

        if let Some(fuzzy) = &filters.fuzzy_name {
            let slot = q.bind(fuzzy.as_str());
            q.order_by(&[
                &format!("jaro_winkler_similarity(cards.name, {slot}) DESC"),
                "cards.number ASC",
            ]);
        } else {
            q.order_by(&["cards.name ASC", "cards.number ASC"]);
        }
        q.limit(filters.limit.unwrap_or(100));
        q.offset(filters.offset.unwrap_or(0));

        let (sql, params) = q.build();
        self.engine.execute_typed(&sql, &params)
    }

    /// Oracle-level rows for a name, de-duplicated by
    /// `(name, faceName)`. When the name matches nothing, retries
    /// against `faceName` so split/adventure/MDFC faces resolve.
    pub fn get_atomic(&self, name: &str) -> Result<Vec<CardAtomic>> {
        self.ensure()?;

        let mut rows = self.atomic_rows("name = $1", name)?;
        if rows.is_empty() {
            rows = self.atomic_rows("CAST(faceName AS VARCHAR) = $1", name)?;
        }

        let mut seen: Vec<(String, Option<String>)> = Vec::new();
        let mut unique = Vec::new();
        for row in rows {
            let key = (
                row.get("name").and_then(Value::as_str).unwrap_or("").to_string(),
                row.get("faceName").and_then(Value::as_str).map(str::to_string),
            );
            if !seen.contains(&key) {
                seen.push(key);
                unique.push(serde_json::from_value(Value::Object(row))?);
            }
        }
        Ok(unique)
    }

    fn atomic_rows(&self, fragment: &str, name: &str) -> Result<Vec<Row>> {
        let mut q = QueryBuilder::new("cards");
        q.select(crate::models::ATOMIC_COLUMNS);
        q.where_clause(fragment, vec![Param::from(name)]);
        // Stable face ordering: real cards before funny/online-only
        // variants, then by side.
        q.order_by(&[
            "isFunny ASC NULLS FIRST",
            "isOnlineOnly ASC NULLS FIRST",
            "side ASC NULLS FIRST",
        ]);
        let (sql, params) = q.build();
        self.engine.execute(&sql, &params)
    }

    /// Cards matching a Scryfall ID (joins `card_identifiers`).
    pub fn find_by_scryfall_id(&self, scryfall_id: &str) -> Result<Vec<CardPrinting>> {
        self.engine.ensure_views(&["cards", "card_identifiers"])?;
        self.engine.execute_typed(
            "SELECT c.* FROM cards c \
             JOIN card_identifiers ci ON c.uuid = ci.uuid \
             WHERE ci.scryfallId = $1",
            &[Param::from(scryfall_id)],
        )
    }

    /// `count` randomly sampled cards.
    pub fn random(&self, count: usize) -> Result<Vec<CardPrinting>> {
        self.ensure()?;
        self.engine
            .execute_typed(&format!("SELECT * FROM cards USING SAMPLE {count}"), &[])
    }

    /// Count cards matching the given column equality filters.
    pub fn count(&self, filters: &[(&str, Param)]) -> Result<i64> {
        self.ensure()?;
        let mut q = QueryBuilder::new("cards");
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
