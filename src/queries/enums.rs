//! Passthrough readers for the static JSON lookups.

use crate::engine::Engine;
use crate::error::Result;
use serde_json::Value;

/// Query surface for MTGJSON keyword, card-type, and enum data.
pub struct EnumQuery<'a> {
    engine: &'a Engine,
}

impl<'a> EnumQuery<'a> {
    pub(crate) fn new(engine: &'a Engine) -> Self {
        Self { engine }
    }

    fn payload(&self, name: &str) -> Result<Value> {
        let raw = self.engine.cache.borrow_mut().load_json(name)?;
        Ok(match raw {
            Value::Object(mut map) => map.remove("data").unwrap_or(Value::Object(map)),
            other => other,
        })
    }

    /// Keyword categories from `Keywords.json` (`abilityWords`,
    /// `keywordAbilities`, `keywordActions`).
    pub fn keywords(&self) -> Result<Value> {
        self.payload("keywords")
    }

    /// Card type definitions from `CardTypes.json`, with `subTypes`
    /// and `superTypes` per type.
    pub fn card_types(&self) -> Result<Value> {
        self.payload("card_types")
    }

    /// The full enum reference from `EnumValues.json`.
    pub fn enum_values(&self) -> Result<Value> {
        self.payload("enum_values")
    }
}
