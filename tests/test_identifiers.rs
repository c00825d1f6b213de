//! Identifier cross-reference tests.

#![recursion_limit = "256"]
mod common;

use common::sample_client;
use mtgjson_query::queries::identifiers::KNOWN_ID_COLUMNS;
use mtgjson_query::Error;

#[test]
fn find_by_rejects_unknown_column() {
    let (client, _dir) = sample_client();
    let err = client.identifiers().find_by("favoriteColor", "blue").unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert!(err.to_string().contains("favoriteColor"));
}

#[test]
fn find_by_accepts_every_known_column() {
    let (client, _dir) = sample_client();
    for column in KNOWN_ID_COLUMNS {
        // Unknown value: must run cleanly and return nothing.
        let cards = client.identifiers().find_by(column, "no-such-id");
        match cards {
            Ok(cards) => assert!(cards.is_empty()),
            // Columns absent from the small fixture table still bind
            // in the allowlist check before the query; a missing
            // column is a query error, not InvalidArgument.
            Err(Error::Query(_)) => {}
            Err(other) => panic!("unexpected error for {column}: {other}"),
        }
    }
}

#[test]
fn named_wrappers_resolve_cards() {
    let (client, _dir) = sample_client();
    let ids = client.identifiers();

    let by_scryfall = ids.find_by_scryfall_id("scry-bolt-1").unwrap();
    assert_eq!(by_scryfall.len(), 1);
    assert_eq!(by_scryfall[0].uuid, "u-bolt-a25");

    let by_tcg = ids.find_by_tcgplayer_id("9002").unwrap();
    assert_eq!(by_tcg.len(), 1);
    assert_eq!(by_tcg[0].name, "Counterspell");

    let by_mv = ids.find_by_multiverse_id("100001").unwrap();
    assert_eq!(by_mv.len(), 1);

    let by_oracle = ids.find_by_scryfall_oracle_id("oracle-counter").unwrap();
    assert_eq!(by_oracle.len(), 1);
}

#[test]
fn get_identifiers_full_row_or_none() {
    let (client, _dir) = sample_client();
    let row = client.identifiers().get_identifiers("u-bolt-a25").unwrap().unwrap();
    assert_eq!(row["scryfallId"], "scry-bolt-1");
    assert_eq!(row["tcgplayerProductId"], "9001");

    assert!(client.identifiers().get_identifiers("u-ghost").unwrap().is_none());
}
