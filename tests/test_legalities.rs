//! Legality query surface tests over the tall fixture.

#![recursion_limit = "256"]
mod common;

use common::sample_client;

#[test]
fn formats_for_card_builds_status_map() {
    let (client, _dir) = sample_client();
    let formats = client.legalities().formats_for_card("u-bolt-a25").unwrap();
    assert_eq!(formats.len(), 4);
    assert_eq!(formats.get("modern").map(String::as_str), Some("Legal"));
    assert_eq!(formats.get("vintage").map(String::as_str), Some("Restricted"));
    assert_eq!(formats.get("standard").map(String::as_str), Some("Not Legal"));
}

#[test]
fn formats_for_unknown_card_is_empty() {
    let (client, _dir) = sample_client();
    assert!(client.legalities().formats_for_card("u-ghost").unwrap().is_empty());
}

#[test]
fn is_legal_checks_legal_status_only() {
    let (client, _dir) = sample_client();
    let legalities = client.legalities();
    assert!(legalities.is_legal("u-bolt-a25", "modern").unwrap());
    // Restricted is not Legal.
    assert!(!legalities.is_legal("u-bolt-a25", "vintage").unwrap());
    assert!(!legalities.is_legal("u-bolt-a25", "pauper").unwrap());
}

#[test]
fn legal_in_returns_distinct_cards_by_name() {
    let (client, _dir) = sample_client();
    let cards = client.legalities().legal_in("modern", 100, 0).unwrap();
    let names: Vec<&str> = cards.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Counterspell", "Grizzly Bears", "Lightning Bolt", "Lightning Bolt"]);
    // Banned card excluded.
    assert!(!names.contains(&"Fire // Ice"));
}

#[test]
fn legal_in_paginates() {
    let (client, _dir) = sample_client();
    let page = client.legalities().legal_in("modern", 2, 1).unwrap();
    assert_eq!(page.len(), 2);
}

#[test]
fn banned_in_lists_name_uuid_rows() {
    let (client, _dir) = sample_client();
    let banned = client.legalities().banned_in("modern", 100, 0).unwrap();
    assert_eq!(banned.len(), 1);
    assert_eq!(banned[0].name, "Fire // Ice");
    assert_eq!(banned[0].uuid, "u-fire");
}

#[test]
fn restricted_and_suspended_and_not_legal() {
    let (client, _dir) = sample_client();
    let legalities = client.legalities();

    let restricted = legalities.restricted_in("vintage", 100, 0).unwrap();
    assert_eq!(restricted.len(), 1);
    assert_eq!(restricted[0].uuid, "u-bolt-a25");

    let suspended = legalities.suspended_in("historic", 100, 0).unwrap();
    assert_eq!(suspended.len(), 1);
    assert_eq!(suspended[0].uuid, "u-counter");

    let not_legal = legalities.not_legal_in("standard", 100, 0).unwrap();
    assert_eq!(not_legal.len(), 1);
    assert_eq!(not_legal[0].uuid, "u-bolt-a25");
}
