//! Shared fixtures: an offline client over a temp cache directory,
//! with small sample tables registered directly on the engine and the
//! static JSON files written into the cache layout.
#![allow(dead_code)]

use mtgjson_query::MtgClient;
use serde_json::{json, Value};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

/// Offline client with an empty cache. Nothing is registered; every
/// data access that needs a file fails with `NotCached`.
pub fn bare_client() -> (MtgClient, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let client = MtgClient::builder()
        .cache_dir(dir.path())
        .offline(true)
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    (client, dir)
}

/// Offline client with the full sample dataset registered.
pub fn sample_client() -> (MtgClient, TempDir) {
    let (client, dir) = bare_client();
    {
        let engine = client.engine();
        engine.register_from_records("cards", &sample_cards()).unwrap();
        engine.register_from_records("sets", &sample_sets()).unwrap();
        engine.register_from_records("tokens", &sample_tokens()).unwrap();
        engine
            .register_from_records("card_identifiers", &sample_identifiers())
            .unwrap();
        engine
            .register_from_records("card_legalities", &sample_legalities())
            .unwrap();
        engine
            .register_from_records("card_foreign_data", &sample_foreign_data())
            .unwrap();
    }
    write_json_fixtures(dir.path());
    (client, dir)
}

/// Register the sample price table as well.
pub fn sample_client_with_prices() -> (MtgClient, TempDir) {
    let (client, dir) = sample_client();
    client
        .engine()
        .register_from_records("prices_today", &sample_prices())
        .unwrap();
    (client, dir)
}

/// Register the sample SKU table as well.
pub fn sample_client_with_skus() -> (MtgClient, TempDir) {
    let (client, dir) = sample_client();
    client
        .engine()
        .register_from_records("tcgplayer_skus", &sample_skus())
        .unwrap();
    (client, dir)
}

fn write_json_fixtures(dir: &std::path::Path) {
    fs::write(
        dir.join("Meta.json"),
        json!({"data": {"version": "5.2.2+20240101", "date": "2024-01-01"}}).to_string(),
    )
    .unwrap();
    fs::write(
        dir.join("DeckList.json"),
        json!({"data": [
            {"code": "A25", "name": "Azorius Control", "type": "Commander Deck",
             "releaseDate": "2018-03-16", "fileName": "AzoriusControl_A25"},
            {"code": "MH2", "name": "Burn Revival", "type": "Theme Deck",
             "releaseDate": "2021-06-18", "fileName": "BurnRevival_MH2"}
        ]})
        .to_string(),
    )
    .unwrap();
    fs::write(
        dir.join("Keywords.json"),
        json!({"data": {
            "abilityWords": ["Landfall"],
            "keywordAbilities": ["Flying", "Trample"],
            "keywordActions": ["Scry"]
        }})
        .to_string(),
    )
    .unwrap();
    fs::write(
        dir.join("CardTypes.json"),
        json!({"data": {"creature": {"subTypes": ["Goblin", "Soldier"], "superTypes": ["Legendary"]}}})
            .to_string(),
    )
    .unwrap();
    fs::write(
        dir.join("EnumValues.json"),
        json!({"data": {"card": {"rarity": ["common", "uncommon", "rare", "mythic"]}}}).to_string(),
    )
    .unwrap();
}

/// Base card row with every atomic-projection column present, so the
/// inferred table schema covers the full SELECT list.
fn card(overrides: Value) -> Value {
    let mut base = json!({
        "uuid": "", "name": "", "setCode": "", "number": "",
        "asciiName": null, "faceName": null, "side": null,
        "type": "Instant", "types": ["Instant"], "subtypes": [],
        "supertypes": [], "colors": [], "colorIdentity": [],
        "colorIndicator": null, "producedMana": null,
        "manaCost": null, "manaValue": 0.0,
        "faceConvertedManaCost": null, "faceManaValue": null,
        "text": null, "layout": "normal", "power": null,
        "toughness": null, "loyalty": null, "defense": null,
        "hand": null, "life": null, "keywords": [],
        "isFunny": false, "isOnlineOnly": false, "isPromo": false,
        "isReserved": false, "isGameChanger": false,
        "hasAlternativeDeckLimit": false,
        "edhrecRank": null, "edhrecSaltiness": null, "subsets": null,
        "printings": null, "leadershipSkills": null, "relatedCards": null,
        "rarity": "common", "artist": null,
        "availability": ["paper"], "finishes": ["nonfoil"],
        "language": "English"
    });
    if let (Value::Object(base_map), Value::Object(extra)) = (&mut base, overrides) {
        for (k, v) in extra {
            base_map.insert(k, v);
        }
    }
    base
}

pub fn sample_cards() -> Vec<Value> {
    vec![
        card(json!({
            "uuid": "u-bolt-a25", "name": "Lightning Bolt", "setCode": "A25",
            "number": "141", "colors": ["R"], "colorIdentity": ["R"],
            "manaCost": "{R}", "manaValue": 1.0, "rarity": "uncommon",
            "text": "Lightning Bolt deals 3 damage to any target.",
            "artist": "Christopher Moeller", "availability": ["paper", "mtgo"],
            "printings": ["A25", "CLB"]
        })),
        card(json!({
            "uuid": "u-bolt-clb", "name": "Lightning Bolt", "setCode": "CLB",
            "number": "187", "colors": ["R"], "colorIdentity": ["R"],
            "manaCost": "{R}", "manaValue": 1.0, "rarity": "uncommon",
            "text": "Lightning Bolt deals 3 damage to any target.",
            "artist": "Anna Podedworna", "availability": ["paper"],
            "printings": ["A25", "CLB"]
        })),
        card(json!({
            "uuid": "u-counter", "name": "Counterspell", "setCode": "A25",
            "number": "50", "colors": ["U"], "colorIdentity": ["U"],
            "manaCost": "{U}{U}", "manaValue": 2.0, "rarity": "uncommon",
            "text": "Counter target spell.", "artist": "Zack Stella",
            "availability": ["paper", "mtgo"], "keywords": []
        })),
        card(json!({
            "uuid": "u-fire", "name": "Fire // Ice", "setCode": "MH2",
            "number": "290", "asciiName": "Fire // Ice", "faceName": "Fire",
            "side": "a", "layout": "split", "colors": ["R"],
            "colorIdentity": ["R", "U"], "manaCost": "{1}{R}", "manaValue": 2.0,
            "rarity": "uncommon", "faceManaValue": 2.0,
            "text": "Fire deals 2 damage divided as you choose.",
            "artist": "Franz Vohwinkel"
        })),
        card(json!({
            "uuid": "u-ice", "name": "Fire // Ice", "setCode": "MH2",
            "number": "290", "asciiName": "Fire // Ice", "faceName": "Ice",
            "side": "b", "layout": "split", "colors": ["U"],
            "colorIdentity": ["R", "U"], "manaCost": "{1}{U}", "manaValue": 2.0,
            "rarity": "uncommon", "faceManaValue": 2.0,
            "text": "Tap target permanent. Draw a card.",
            "artist": "Franz Vohwinkel"
        })),
        card(json!({
            "uuid": "u-grizzly", "name": "Grizzly Bears", "setCode": "MH2",
            "number": "310", "type": "Creature \u{2014} Bear",
            "types": ["Creature"], "subtypes": ["Bear"], "colors": ["G"],
            "colorIdentity": ["G"], "manaCost": "{1}{G}", "manaValue": 2.0,
            "power": "2", "toughness": "2", "keywords": ["Trample"],
            "artist": "Dan Frazier"
        })),
    ]
}

pub fn sample_sets() -> Vec<Value> {
    vec![
        json!({
            "code": "A25", "name": "Masters 25", "type": "masters",
            "releaseDate": "2018-03-16", "block": null,
            "baseSetSize": 249, "totalSetSize": 249,
            "booster": null, "sealedProduct": null
        }),
        json!({
            "code": "MH2", "name": "Modern Horizons 2", "type": "draft_innovation",
            "releaseDate": "2021-06-18", "block": null,
            "baseSetSize": 303, "totalSetSize": 511,
            "booster": null, "sealedProduct": null
        }),
        json!({
            "code": "CLB", "name": "Commander Legends: Battle for Baldur's Gate",
            "type": "commander", "releaseDate": "2022-06-10", "block": null,
            "baseSetSize": 361, "totalSetSize": 686,
            "booster": null, "sealedProduct": null
        }),
        json!({
            "code": "TST", "name": "Simulation Test", "type": "expansion",
            "releaseDate": "2024-05-03", "block": "Test Block",
            "baseSetSize": 4, "totalSetSize": 4,
            "booster": {
                "draft": {
                    "boosters": [
                        {"contents": {"common": 2, "rare": 1, "phantom": 1}, "weight": 1}
                    ],
                    "sheets": {
                        "common": {
                            "cards": {"u-counter": 2, "u-fire": 1, "u-ice": 1},
                            "foil": false, "totalWeight": 4
                        },
                        "rare": {
                            "cards": {"u-bolt-a25": 1},
                            "foil": false, "totalWeight": 1
                        },
                        "phantom": {
                            "cards": {"u-not-in-db": 1},
                            "foil": false, "totalWeight": 1
                        }
                    }
                }
            },
            "sealedProduct": [
                {"uuid": "sealed-box", "name": "Simulation Test Booster Box",
                 "category": "booster_box", "productSize": 36},
                {"uuid": "sealed-bundle", "name": "Simulation Test Bundle",
                 "category": "bundle", "productSize": 1}
            ]
        }),
    ]
}

pub fn sample_tokens() -> Vec<Value> {
    vec![
        json!({
            "uuid": "t-soldier", "name": "Soldier", "setCode": "A25",
            "number": "T1", "type": "Token Creature \u{2014} Soldier",
            "types": ["Creature"], "subtypes": ["Soldier"], "colors": ["W"],
            "colorIdentity": ["W"], "power": "1", "toughness": "1",
            "layout": "token", "artist": "Greg Staples", "availability": ["paper"]
        }),
        json!({
            "uuid": "t-goblin", "name": "Goblin", "setCode": "MH2",
            "number": "T2", "type": "Token Creature \u{2014} Goblin",
            "types": ["Creature"], "subtypes": ["Goblin"], "colors": ["R"],
            "colorIdentity": ["R"], "power": "1", "toughness": "1",
            "layout": "token", "artist": "Karl Kopinski", "availability": ["paper"]
        }),
    ]
}

pub fn sample_identifiers() -> Vec<Value> {
    vec![
        json!({
            "uuid": "u-bolt-a25", "scryfallId": "scry-bolt-1",
            "scryfallOracleId": "oracle-bolt", "tcgplayerProductId": "9001",
            "multiverseId": "100001", "mtgoId": "50001", "mcmId": "70001",
            "cardKingdomId": "80001", "cardsphereId": "90001", "mtgArenaId": "60001"
        }),
        json!({
            "uuid": "u-counter", "scryfallId": "scry-counter-1",
            "scryfallOracleId": "oracle-counter", "tcgplayerProductId": "9002",
            "multiverseId": "100002", "mtgoId": "50002", "mcmId": "70002",
            "cardKingdomId": "80002", "cardsphereId": "90002", "mtgArenaId": "60002"
        }),
    ]
}

/// Legalities in the tall `(uuid, format, status)` shape, as the
/// UNPIVOTed view produces.
pub fn sample_legalities() -> Vec<Value> {
    vec![
        json!({"uuid": "u-bolt-a25", "format": "modern", "status": "Legal"}),
        json!({"uuid": "u-bolt-a25", "format": "legacy", "status": "Legal"}),
        json!({"uuid": "u-bolt-a25", "format": "vintage", "status": "Restricted"}),
        json!({"uuid": "u-bolt-a25", "format": "standard", "status": "Not Legal"}),
        json!({"uuid": "u-bolt-clb", "format": "modern", "status": "Legal"}),
        json!({"uuid": "u-counter", "format": "modern", "status": "Legal"}),
        json!({"uuid": "u-counter", "format": "vintage", "status": "Legal"}),
        json!({"uuid": "u-counter", "format": "historic", "status": "Suspended"}),
        json!({"uuid": "u-fire", "format": "modern", "status": "Banned"}),
        json!({"uuid": "u-grizzly", "format": "modern", "status": "Legal"}),
    ]
}

pub fn sample_foreign_data() -> Vec<Value> {
    vec![
        json!({"uuid": "u-bolt-a25", "language": "German", "name": "Blitzschlag"}),
        json!({"uuid": "u-counter", "language": "German", "name": "Gegenzauber"}),
    ]
}

pub fn sample_prices() -> Vec<Value> {
    let row = |uuid: &str, provider: &str, category: &str, finish: &str, date: &str, price: f64| {
        json!({
            "uuid": uuid, "source": "paper", "provider": provider,
            "currency": "USD", "category": category, "finish": finish,
            "date": date, "price": price
        })
    };
    vec![
        row("u-bolt-a25", "tcgplayer", "retail", "normal", "2024-01-01", 1.0),
        row("u-bolt-a25", "tcgplayer", "retail", "normal", "2024-01-02", 1.5),
        row("u-bolt-a25", "tcgplayer", "retail", "normal", "2024-01-03", 2.0),
        row("u-bolt-a25", "tcgplayer", "retail", "foil", "2024-01-03", 5.0),
        row("u-bolt-a25", "tcgplayer", "buylist", "normal", "2024-01-03", 0.75),
        row("u-bolt-a25", "cardkingdom", "retail", "normal", "2024-01-03", 2.5),
        // CLB bolt only has a stale price, so the bulk endpoints
        // (global max date) exclude it while cheapest_printing
        // (per-printing max date) still sees it.
        row("u-bolt-clb", "tcgplayer", "retail", "normal", "2024-01-02", 0.5),
        row("u-counter", "tcgplayer", "retail", "normal", "2024-01-03", 3.0),
    ]
}

pub fn sample_skus() -> Vec<Value> {
    vec![
        json!({"uuid": "u-bolt-a25", "skuId": 111, "productId": 9001,
               "condition": "NEAR MINT", "finish": "NON FOIL",
               "language": "ENGLISH", "printing": "NON FOIL"}),
        json!({"uuid": "u-bolt-a25", "skuId": 112, "productId": 9001,
               "condition": "NEAR MINT", "finish": "FOIL",
               "language": "ENGLISH", "printing": "FOIL"}),
        json!({"uuid": "u-counter", "skuId": 113, "productId": 9002,
               "condition": "NEAR MINT", "finish": "NON FOIL",
               "language": "ENGLISH", "printing": "NON FOIL"}),
    ]
}
