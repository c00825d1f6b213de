//! Cross-reference lookups: cards by external identifier.
//!
//! Joins `card_identifiers` with `cards`. A generic [`find_by`]
//! validates the column against the allowlist; one named wrapper
//! exists per known identifier column.
//!
//! [`find_by`]: IdentifierQuery::find_by

use crate::engine::{Engine, Param, Row};
use crate::error::{Error, Result};
use crate::models::CardPrinting;

/// Identifier columns present in the `card_identifiers` table.
pub const KNOWN_ID_COLUMNS: &[&str] = &[
    "cardKingdomEtchedId",
    "cardKingdomFoilId",
    "cardKingdomId",
    "cardsphereFoilId",
    "cardsphereId",
    "mcmId",
    "mcmMetaId",
    "mtgArenaId",
    "mtgoFoilId",
    "mtgoId",
    "multiverseId",
    "scryfallId",
    "scryfallIllustrationId",
    "scryfallOracleId",
    "tcgplayerEtchedProductId",
    "tcgplayerProductId",
];

/// Query surface for external-identifier lookups.
pub struct IdentifierQuery<'a> {
    engine: &'a Engine,
}

impl<'a> IdentifierQuery<'a> {
    pub(crate) fn new(engine: &'a Engine) -> Self {
        Self { engine }
    }

    /// Cards whose identifier `id_type` equals `value`.
    ///
    /// `id_type` must be one of [`KNOWN_ID_COLUMNS`]; anything else is
    /// an [`Error::InvalidArgument`]. Only the allowlisted name ever
    /// reaches the SQL text — the value itself is bound.
    pub fn find_by(&self, id_type: &str, value: &str) -> Result<Vec<CardPrinting>> {
        if !KNOWN_ID_COLUMNS.contains(&id_type) {
            return Err(Error::InvalidArgument(format!(
                "unknown identifier type '{id_type}'; known types: {KNOWN_ID_COLUMNS:?}"
            )));
        }
        self.engine.ensure_views(&["cards", "card_identifiers"])?;
        let sql = format!(
            "SELECT c.* FROM cards c \
             JOIN card_identifiers ci ON c.uuid = ci.uuid \
             WHERE ci.{id_type} = $1"
        );
        self.engine.execute_typed(&sql, &[Param::from(value)])
    }

    /// Every known identifier for a card UUID, or `None`.
    pub fn get_identifiers(&self, uuid: &str) -> Result<Option<Row>> {
        self.engine.ensure_views(&["card_identifiers"])?;
        let rows = self.engine.execute(
            "SELECT * FROM card_identifiers WHERE uuid = $1",
            &[Param::from(uuid)],
        )?;
        Ok(rows.into_iter().next())
    }

    // -- Named wrappers, one per identifier column -------------------------

    /// Find cards by Scryfall UUID.
    pub fn find_by_scryfall_id(&self, value: &str) -> Result<Vec<CardPrinting>> {
        self.find_by("scryfallId", value)
    }

    /// Find cards by Scryfall oracle ID (shared across printings).
    pub fn find_by_scryfall_oracle_id(&self, value: &str) -> Result<Vec<CardPrinting>> {
        self.find_by("scryfallOracleId", value)
    }

    /// Find cards by Scryfall illustration ID (shared across art reprints).
    pub fn find_by_scryfall_illustration_id(&self, value: &str) -> Result<Vec<CardPrinting>> {
        self.find_by("scryfallIllustrationId", value)
    }

    /// Find cards by TCGplayer product ID.
    pub fn find_by_tcgplayer_id(&self, value: &str) -> Result<Vec<CardPrinting>> {
        self.find_by("tcgplayerProductId", value)
    }

    /// Find cards by TCGplayer etched product ID.
    pub fn find_by_tcgplayer_etched_id(&self, value: &str) -> Result<Vec<CardPrinting>> {
        self.find_by("tcgplayerEtchedProductId", value)
    }

    /// Find cards by MTGO catalog ID.
    pub fn find_by_mtgo_id(&self, value: &str) -> Result<Vec<CardPrinting>> {
        self.find_by("mtgoId", value)
    }

    /// Find cards by MTGO foil catalog ID.
    pub fn find_by_mtgo_foil_id(&self, value: &str) -> Result<Vec<CardPrinting>> {
        self.find_by("mtgoFoilId", value)
    }

    /// Find cards by MTG Arena ID.
    pub fn find_by_mtg_arena_id(&self, value: &str) -> Result<Vec<CardPrinting>> {
        self.find_by("mtgArenaId", value)
    }

    /// Find cards by Gatherer multiverse ID.
    pub fn find_by_multiverse_id(&self, value: &str) -> Result<Vec<CardPrinting>> {
        self.find_by("multiverseId", value)
    }

    /// Find cards by Cardmarket (MCM) product ID.
    pub fn find_by_mcm_id(&self, value: &str) -> Result<Vec<CardPrinting>> {
        self.find_by("mcmId", value)
    }

    /// Find cards by Cardmarket (MCM) meta ID.
    pub fn find_by_mcm_meta_id(&self, value: &str) -> Result<Vec<CardPrinting>> {
        self.find_by("mcmMetaId", value)
    }

    /// Find cards by Card Kingdom product ID.
    pub fn find_by_card_kingdom_id(&self, value: &str) -> Result<Vec<CardPrinting>> {
        self.find_by("cardKingdomId", value)
    }

    /// Find cards by Card Kingdom foil product ID.
    pub fn find_by_card_kingdom_foil_id(&self, value: &str) -> Result<Vec<CardPrinting>> {
        self.find_by("cardKingdomFoilId", value)
    }

    /// Find cards by Card Kingdom etched product ID.
    pub fn find_by_card_kingdom_etched_id(&self, value: &str) -> Result<Vec<CardPrinting>> {
        self.find_by("cardKingdomEtchedId", value)
    }

    /// Find cards by Cardsphere ID.
    pub fn find_by_cardsphere_id(&self, value: &str) -> Result<Vec<CardPrinting>> {
        self.find_by("cardsphereId", value)
    }

    /// Find cards by Cardsphere foil ID.
    pub fn find_by_cardsphere_foil_id(&self, value: &str) -> Result<Vec<CardPrinting>> {
        self.find_by("cardsphereFoilId", value)
    }
}
