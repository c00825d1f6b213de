//! Preconstructed deck queries over the cached `DeckList.json`.
//!
//! Deck data is a small JSON array, filtered in memory; no DuckDB
//! involvement. Missing deck data (offline, never cached) yields
//! empty results.

use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::models::DeckSummary;
use serde_json::Value;

/// Query surface for preconstructed decks.
pub struct DeckQuery<'a> {
    engine: &'a Engine,
}

impl<'a> DeckQuery<'a> {
    pub(crate) fn new(engine: &'a Engine) -> Self {
        Self { engine }
    }

    fn load(&self) -> Result<Vec<DeckSummary>> {
        let raw = match self.engine.cache.borrow_mut().load_json("deck_list") {
            Ok(raw) => raw,
            Err(Error::NotCached(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        match raw.get("data") {
            Some(Value::Array(entries)) => Ok(entries
                .iter()
                .filter_map(|d| serde_json::from_value(d.clone()).ok())
                .collect()),
            _ => Ok(Vec::new()),
        }
    }

    /// All decks, optionally filtered by set code and deck type.
    pub fn list(
        &self,
        set_code: Option<&str>,
        deck_type: Option<&str>,
    ) -> Result<Vec<DeckSummary>> {
        let mut decks = self.load()?;
        if let Some(code) = set_code {
            decks.retain(|d| d.code.eq_ignore_ascii_case(code));
        }
        if let Some(kind) = deck_type {
            decks.retain(|d| d.deck_type.as_deref() == Some(kind));
        }
        Ok(decks)
    }

    /// Decks whose name contains `name` (case-insensitive), optionally
    /// narrowed by set code.
    pub fn search(&self, name: &str, set_code: Option<&str>) -> Result<Vec<DeckSummary>> {
        let needle = name.to_lowercase();
        let mut decks = self.load()?;
        decks.retain(|d| d.name.to_lowercase().contains(&needle));
        if let Some(code) = set_code {
            decks.retain(|d| d.code.eq_ignore_ascii_case(code));
        }
        Ok(decks)
    }

    /// Count decks matching the given filters.
    pub fn count(&self, set_code: Option<&str>, deck_type: Option<&str>) -> Result<usize> {
        Ok(self.list(set_code, deck_type)?.len())
    }
}
