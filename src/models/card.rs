//! Card-shaped records: printings, oracle cards, tokens.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One physical printing of a card, as returned by the `cards` view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPrinting {
    // Identity
    pub uuid: String,
    pub name: String,
    pub set_code: String,
    pub number: String,
    pub ascii_name: Option<String>,
    pub face_name: Option<String>,
    pub side: Option<String>,
    pub language: Option<String>,

    // Oracle
    #[serde(rename = "type")]
    pub type_line: Option<String>,
    pub types: Option<Vec<String>>,
    pub subtypes: Option<Vec<String>>,
    pub supertypes: Option<Vec<String>>,
    pub mana_cost: Option<String>,
    pub mana_value: Option<f64>,
    pub converted_mana_cost: Option<f64>,
    pub face_mana_value: Option<f64>,
    pub colors: Option<Vec<String>>,
    pub color_identity: Option<Vec<String>>,
    pub color_indicator: Option<Vec<String>>,
    pub produced_mana: Option<Vec<String>>,
    pub text: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub power: Option<String>,
    pub toughness: Option<String>,
    pub loyalty: Option<String>,
    pub defense: Option<String>,
    pub layout: Option<String>,

    // Printing
    pub rarity: Option<String>,
    pub artist: Option<String>,
    pub artist_ids: Option<Vec<String>>,
    pub border_color: Option<String>,
    pub frame_version: Option<String>,
    pub frame_effects: Option<Vec<String>>,
    pub finishes: Option<Vec<String>>,
    pub availability: Option<Vec<String>>,
    pub booster_types: Option<Vec<String>>,
    pub promo_types: Option<Vec<String>>,
    pub watermark: Option<String>,
    pub security_stamp: Option<String>,
    pub flavor_text: Option<String>,
    pub flavor_name: Option<String>,
    pub original_text: Option<String>,
    pub original_type: Option<String>,
    pub printed_name: Option<String>,
    pub printed_text: Option<String>,
    pub printed_type: Option<String>,
    pub original_release_date: Option<String>,

    // Flags
    pub is_promo: Option<bool>,
    pub is_reprint: Option<bool>,
    pub is_reserved: Option<bool>,
    pub is_full_art: Option<bool>,
    pub is_online_only: Option<bool>,
    pub is_oversized: Option<bool>,
    pub is_textless: Option<bool>,
    pub is_alternative: Option<bool>,
    pub is_rebalanced: Option<bool>,
    pub is_story_spotlight: Option<bool>,
    pub is_timeshifted: Option<bool>,
    pub is_funny: Option<bool>,
    pub has_content_warning: Option<bool>,
    pub has_alternative_deck_limit: Option<bool>,

    // Relations and rankings
    pub printings: Option<Vec<String>>,
    pub variations: Option<Vec<String>>,
    pub other_face_ids: Option<Vec<String>>,
    pub card_parts: Option<Vec<String>>,
    pub original_printings: Option<Vec<String>>,
    pub rebalanced_printings: Option<Vec<String>>,
    pub subsets: Option<Vec<String>>,
    pub duel_deck: Option<String>,
    pub edhrec_rank: Option<i64>,
    pub edhrec_saltiness: Option<f64>,

    // Struct-valued columns, navigable as JSON
    pub identifiers: Option<Value>,
    pub legalities: Option<Value>,
    pub leadership_skills: Option<Value>,
    pub purchase_urls: Option<Value>,
    pub related_cards: Option<Value>,
    pub rulings: Option<Value>,
    pub source_products: Option<Value>,
    pub foreign_data: Option<Value>,
}

/// Oracle-level card: the atomic projection, stripped of
/// printing-specific columns and de-duplicated by `(name, faceName)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardAtomic {
    pub name: String,
    pub ascii_name: Option<String>,
    pub face_name: Option<String>,
    #[serde(rename = "type")]
    pub type_line: Option<String>,
    pub types: Option<Vec<String>>,
    pub subtypes: Option<Vec<String>>,
    pub supertypes: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    pub color_identity: Option<Vec<String>>,
    pub color_indicator: Option<Vec<String>>,
    pub produced_mana: Option<Vec<String>>,
    pub mana_cost: Option<String>,
    pub mana_value: Option<f64>,
    pub face_converted_mana_cost: Option<f64>,
    pub face_mana_value: Option<f64>,
    pub text: Option<String>,
    pub layout: Option<String>,
    pub side: Option<String>,
    pub power: Option<String>,
    pub toughness: Option<String>,
    pub loyalty: Option<String>,
    pub defense: Option<String>,
    pub hand: Option<String>,
    pub life: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub is_funny: Option<bool>,
    pub is_reserved: Option<bool>,
    pub is_game_changer: Option<bool>,
    pub has_alternative_deck_limit: Option<bool>,
    pub edhrec_rank: Option<i64>,
    pub edhrec_saltiness: Option<f64>,
    pub subsets: Option<Vec<String>>,
    pub printings: Option<Vec<String>>,
    pub leadership_skills: Option<Value>,
    pub related_cards: Option<Value>,
}

/// Columns of the atomic projection, in SELECT order.
pub(crate) const ATOMIC_COLUMNS: &[&str] = &[
    "name",
    "asciiName",
    "faceName",
    "type",
    "types",
    "subtypes",
    "supertypes",
    "colors",
    "colorIdentity",
    "colorIndicator",
    "producedMana",
    "manaCost",
    "manaValue",
    "faceConvertedManaCost",
    "faceManaValue",
    "text",
    "layout",
    "side",
    "power",
    "toughness",
    "loyalty",
    "defense",
    "hand",
    "life",
    "keywords",
    "isFunny",
    "isReserved",
    "isGameChanger",
    "hasAlternativeDeckLimit",
    "edhrecRank",
    "edhrecSaltiness",
    "subsets",
    "printings",
    "leadershipSkills",
    "relatedCards",
];

/// A token printing from the `tokens` view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPrinting {
    pub uuid: String,
    pub name: String,
    pub set_code: String,
    pub number: Option<String>,
    pub face_name: Option<String>,
    pub side: Option<String>,
    #[serde(rename = "type")]
    pub type_line: Option<String>,
    pub types: Option<Vec<String>>,
    pub subtypes: Option<Vec<String>>,
    pub supertypes: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    pub color_identity: Option<Vec<String>>,
    pub text: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub power: Option<String>,
    pub toughness: Option<String>,
    pub layout: Option<String>,
    pub artist: Option<String>,
    pub artist_ids: Option<Vec<String>>,
    pub finishes: Option<Vec<String>>,
    pub availability: Option<Vec<String>>,
    pub language: Option<String>,
    pub orientation: Option<String>,
    pub reverse_related: Option<Vec<String>>,
    pub related_cards: Option<Value>,
    pub identifiers: Option<Value>,
}

/// Minimal card reference used by the legality status lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardRef {
    pub name: String,
    pub uuid: String,
}
