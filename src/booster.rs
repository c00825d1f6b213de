//! Booster pack simulation from set booster configuration.
//!
//! Each set's `booster` column maps a booster type name to pack
//! templates and weighted card sheets. Opening a pack is two stages of
//! weighted sampling: pick one template by weight, then fill each of
//! its sheet slots from that sheet's weighted card pool.

use crate::engine::{Engine, Param};
use crate::error::{Error, Result};
use crate::models::CardPrinting;
use crate::query::QueryBuilder;
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Booster configuration for one booster type of a set.
#[derive(Debug, Clone, Deserialize)]
pub struct BoosterConfig {
    /// Pack templates, chosen by weight per opened pack.
    pub boosters: Vec<PackTemplate>,
    /// Sheet name → weighted card pool.
    pub sheets: HashMap<String, Sheet>,
}

/// One pack template: sheet name → number of cards drawn from it.
#[derive(Debug, Clone, Deserialize)]
pub struct PackTemplate {
    /// Sheet slots in document order.
    pub contents: serde_json::Map<String, Value>,
    pub weight: u64,
}

/// A weighted pool of card uuids filling one named slot.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    pub cards: HashMap<String, u64>,
    #[serde(default)]
    pub foil: bool,
    #[serde(default)]
    pub total_weight: u64,
    #[serde(default)]
    pub allow_duplicates: bool,
}

/// Weighted booster pack simulator.
pub struct BoosterSimulator<'a> {
    engine: &'a Engine,
}

impl<'a> BoosterSimulator<'a> {
    pub(crate) fn new(engine: &'a Engine) -> Self {
        Self { engine }
    }

    /// Booster configurations for a set, keyed by booster type.
    ///
    /// `None` when the set is unknown, has no booster data, or this
    /// sets source lacks the `booster` column entirely (the flat CDN
    /// `sets.parquet` does).
    fn config_for(&self, set_code: &str) -> Result<Option<HashMap<String, BoosterConfig>>> {
        self.engine.ensure_views(&["sets"])?;
        let rows = match self.engine.execute(
            "SELECT booster FROM sets WHERE code = $1",
            &[Param::from(set_code.to_uppercase())],
        ) {
            Ok(rows) => rows,
            Err(Error::Query(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        let Some(row) = rows.into_iter().next() else {
            return Ok(None);
        };
        let raw = match row.get("booster") {
            Some(Value::Null) | None => return Ok(None),
            // The column may surface as a struct or as JSON text.
            Some(Value::String(text)) => serde_json::from_str::<Value>(text)?,
            Some(other) => other.clone(),
        };
        match serde_json::from_value::<HashMap<String, BoosterConfig>>(raw) {
            Ok(configs) if !configs.is_empty() => Ok(Some(configs)),
            _ => Ok(None),
        }
    }

    /// Booster type names available for a set, empty when the set has
    /// no booster data.
    pub fn available_types(&self, set_code: &str) -> Result<Vec<String>> {
        let Some(configs) = self.config_for(set_code)? else {
            return Ok(Vec::new());
        };
        let mut types: Vec<String> = configs.into_keys().collect();
        types.sort_unstable();
        Ok(types)
    }

    /// Open one booster pack and return its cards in draw order.
    ///
    /// Uuids on a sheet that are missing from the `cards` view are
    /// silently skipped. Fails with [`Error::InvalidArgument`] listing
    /// the available types when the set/type has no booster data.
    pub fn open_pack(&self, set_code: &str, booster_type: &str) -> Result<Vec<CardPrinting>> {
        let configs = self.config_for(set_code)?;
        let config = configs.as_ref().and_then(|c| c.get(booster_type));
        let Some(config) = config else {
            let mut available: Vec<&String> =
                configs.iter().flat_map(|c| c.keys()).collect();
            available.sort_unstable();
            return Err(Error::InvalidArgument(format!(
                "no booster config for set '{set_code}' type '{booster_type}'; available: {available:?}"
            )));
        };

        let mut rng = thread_rng();
        let template = pick_template(&config.boosters, &mut rng);
        let Some(template) = template else {
            return Ok(Vec::new());
        };

        let mut drawn: Vec<String> = Vec::new();
        for (sheet_name, count) in &template.contents {
            let count = count.as_u64().unwrap_or(0) as usize;
            if count == 0 {
                continue;
            }
            if let Some(sheet) = config.sheets.get(sheet_name) {
                drawn.extend(pick_from_sheet(sheet, count, &mut rng));
            }
        }
        if drawn.is_empty() {
            return Ok(Vec::new());
        }

        // One IN fetch, then emit in draw order (duplicates preserved).
        self.engine.ensure_views(&["cards"])?;
        let mut q = QueryBuilder::new("cards");
        let refs: Vec<&str> = drawn.iter().map(String::as_str).collect();
        q.where_in("uuid", &refs);
        let (sql, params) = q.build();
        let cards: Vec<CardPrinting> = self.engine.execute_typed(&sql, &params)?;

        let by_uuid: HashMap<&str, &CardPrinting> =
            cards.iter().map(|c| (c.uuid.as_str(), c)).collect();
        Ok(drawn
            .iter()
            .filter_map(|uuid| by_uuid.get(uuid.as_str()).map(|c| (*c).clone()))
            .collect())
    }

    /// Open `packs` boosters of one type.
    pub fn open_box(
        &self,
        set_code: &str,
        booster_type: &str,
        packs: usize,
    ) -> Result<Vec<Vec<CardPrinting>>> {
        (0..packs)
            .map(|_| self.open_pack(set_code, booster_type))
            .collect()
    }

    /// The raw `{uuid → weight}` pool of one sheet, or `None` when the
    /// set, type, or sheet is unknown.
    pub fn sheet_contents(
        &self,
        set_code: &str,
        booster_type: &str,
        sheet_name: &str,
    ) -> Result<Option<HashMap<String, u64>>> {
        let Some(mut configs) = self.config_for(set_code)? else {
            return Ok(None);
        };
        Ok(configs
            .remove(booster_type)
            .and_then(|config| config.sheets.get(sheet_name).map(|s| s.cards.clone())))
    }
}

/// Weighted pick of one pack template. `None` only for an empty slice.
fn pick_template<'t, R: Rng>(templates: &'t [PackTemplate], rng: &mut R) -> Option<&'t PackTemplate> {
    if templates.is_empty() {
        return None;
    }
    match WeightedIndex::new(templates.iter().map(|t| t.weight)) {
        Ok(dist) => templates.get(dist.sample(rng)),
        // Degenerate weights (all zero): fall back to uniform.
        Err(_) => templates.choose(rng),
    }
}

/// Draw `count` uuids from a sheet.
///
/// With `allowDuplicates`, samples with replacement proportional to
/// weight. Otherwise, when the request covers the whole pool, returns
/// a uniform random permutation; else samples without replacement by
/// removing each pick from the pool.
fn pick_from_sheet<R: Rng>(sheet: &Sheet, count: usize, rng: &mut R) -> Vec<String> {
    let mut pool: Vec<(&String, u64)> = sheet.cards.iter().map(|(u, w)| (u, *w)).collect();
    // Stable iteration base so runs differ only by sampling.
    pool.sort_unstable_by(|a, b| a.0.cmp(b.0));
    if pool.is_empty() {
        return Vec::new();
    }

    if sheet.allow_duplicates {
        let Ok(dist) = WeightedIndex::new(pool.iter().map(|(_, w)| *w)) else {
            return Vec::new();
        };
        return (0..count).map(|_| pool[dist.sample(rng)].0.clone()).collect();
    }

    if count >= pool.len() {
        let mut all: Vec<String> = pool.into_iter().map(|(u, _)| u.clone()).collect();
        all.shuffle(rng);
        return all;
    }

    let mut picked = Vec::with_capacity(count);
    for _ in 0..count {
        let Ok(choice) = pool.choose_weighted(rng, |(_, w)| *w) else {
            break;
        };
        let uuid = choice.0.clone();
        let idx = pool.iter().position(|(u, _)| **u == uuid);
        if let Some(idx) = idx {
            pool.swap_remove(idx);
        }
        picked.push(uuid);
    }
    picked
}
