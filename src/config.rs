//! CDN endpoints, file tables, and cache directory defaults.

use std::path::PathBuf;

/// Base URL of the MTGJSON v5 CDN.
pub const CDN_BASE: &str = "https://mtgjson.com/api/v5";

/// Version metadata endpoint.
pub const META_URL: &str = "https://mtgjson.com/api/v5/Meta.json";

/// Name of the file recording the last successfully downloaded version.
pub const VERSION_FILE: &str = "version.txt";

/// Logical view name → CDN path for the columnar parquet sources.
pub const PARQUET_SOURCES: &[(&str, &str)] = &[
    ("cards", "parquet/cards.parquet"),
    ("tokens", "parquet/tokens.parquet"),
    ("sets", "parquet/sets.parquet"),
    ("card_identifiers", "parquet/cardIdentifiers.parquet"),
    ("card_legalities", "parquet/cardLegalities.parquet"),
    ("card_foreign_data", "parquet/cardForeignData.parquet"),
    ("card_rulings", "parquet/cardRulings.parquet"),
    ("card_purchase_urls", "parquet/cardPurchaseUrls.parquet"),
    ("set_translations", "parquet/setTranslations.parquet"),
    ("token_identifiers", "parquet/tokenIdentifiers.parquet"),
    ("set_booster_content_weights", "parquet/setBoosterContentWeights.parquet"),
    ("set_booster_contents", "parquet/setBoosterContents.parquet"),
    ("set_booster_sheet_cards", "parquet/setBoosterSheetCards.parquet"),
    ("set_booster_sheets", "parquet/setBoosterSheets.parquet"),
    ("all_printings", "parquet/AllPrintings.parquet"),
];

/// Logical name → CDN path for the JSON sources (gzipped or plain).
pub const JSON_SOURCES: &[(&str, &str)] = &[
    ("all_prices_today", "AllPricesToday.json.gz"),
    ("tcgplayer_skus", "TcgplayerSkus.json.gz"),
    ("keywords", "Keywords.json"),
    ("card_types", "CardTypes.json"),
    ("deck_list", "DeckList.json"),
    ("enum_values", "EnumValues.json"),
    ("meta", "Meta.json"),
];

/// Look up the CDN path for a logical file name, parquet or JSON.
pub fn source_path(name: &str) -> Option<&'static str> {
    PARQUET_SOURCES
        .iter()
        .chain(JSON_SOURCES)
        .find(|(n, _)| *n == name)
        .map(|(_, p)| *p)
}

/// Platform-appropriate default cache directory.
///
/// `~/.cache/mtgjson-query` on Linux, `~/Library/Caches/mtgjson-query`
/// on macOS, `%LOCALAPPDATA%\mtgjson-query` on Windows.
pub fn default_cache_dir() -> PathBuf {
    match dirs::cache_dir() {
        Some(base) => base.join("mtgjson-query"),
        None => PathBuf::from(".mtgjson-query-cache"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_path_resolves_both_tables() {
        assert_eq!(source_path("cards"), Some("parquet/cards.parquet"));
        assert_eq!(source_path("meta"), Some("Meta.json"));
        assert_eq!(source_path("no_such_file"), None);
    }
}
