//! SKU query surface tests.
#![recursion_limit = "256"]

mod common;

use common::{bare_client, sample_client_with_skus};

#[test]
fn get_returns_all_skus_for_card() {
    let (client, _dir) = sample_client_with_skus();
    let skus = client.skus().get("u-bolt-a25").unwrap();
    assert_eq!(skus.len(), 2);
    assert!(skus.iter().all(|s| s.uuid == "u-bolt-a25"));
    assert!(skus.iter().all(|s| s.product_id == Some(9001)));
}

#[test]
fn find_by_sku_id_is_exact() {
    let (client, _dir) = sample_client_with_skus();
    let sku = client.skus().find_by_sku_id(113).unwrap().unwrap();
    assert_eq!(sku.uuid, "u-counter");
    assert_eq!(sku.condition.as_deref(), Some("NEAR MINT"));

    assert!(client.skus().find_by_sku_id(999).unwrap().is_none());
}

#[test]
fn find_by_product_id_groups_variants() {
    let (client, _dir) = sample_client_with_skus();
    let skus = client.skus().find_by_product_id(9001).unwrap();
    assert_eq!(skus.len(), 2);
    let finishes: Vec<Option<&str>> = skus.iter().map(|s| s.finish.as_deref()).collect();
    assert!(finishes.contains(&Some("FOIL")));
    assert!(finishes.contains(&Some("NON FOIL")));
}

#[test]
fn missing_sku_data_degrades_gracefully() {
    let (client, _dir) = bare_client();
    assert!(client.skus().get("u1").unwrap().is_empty());
    assert!(client.skus().find_by_sku_id(1).unwrap().is_none());
    assert!(client.skus().find_by_product_id(1).unwrap().is_empty());
}

#[test]
fn get_rows_exposes_raw_columns() {
    let (client, _dir) = sample_client_with_skus();
    let rows = client.skus().get_rows("u-counter").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["skuId"], 113);
    assert_eq!(rows[0]["printing"], "NON FOIL");
}
