//! DataCache behavior: versioning, staleness, corrupt-file self-heal.

use flate2::write::GzEncoder;
use flate2::Compression;
use mtgjson_query::{DataCache, Error};
use std::fs;
use std::io::Write;
use std::time::Duration;

fn offline_cache(dir: &std::path::Path) -> DataCache {
    DataCache::new(Some(dir.to_path_buf()), true, Duration::from_secs(5)).unwrap()
}

#[test]
fn creates_cache_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("nested").join("cache");
    let cache = offline_cache(&dir);
    assert!(dir.exists());
    assert_eq!(cache.dir(), dir);
}

#[test]
fn local_version_reads_version_file() {
    let tmp = tempfile::tempdir().unwrap();
    let cache = offline_cache(tmp.path());
    assert!(cache.local_version().is_none());
    fs::write(tmp.path().join("version.txt"), "5.2.2+20240101\n").unwrap();
    assert_eq!(cache.local_version().as_deref(), Some("5.2.2+20240101"));
}

#[test]
fn stale_without_recorded_version() {
    let tmp = tempfile::tempdir().unwrap();
    let mut cache = offline_cache(tmp.path());
    assert!(cache.is_stale().unwrap());
}

#[test]
fn fresh_when_remote_unobtainable() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(tmp.path().join("version.txt"), "5.2.2").unwrap();
    let mut cache = offline_cache(tmp.path());
    // Offline: the remote version is unobtainable, so nothing
    // actionable — treat as fresh.
    assert!(!cache.is_stale().unwrap());
}

#[test]
fn remote_version_none_when_offline() {
    let tmp = tempfile::tempdir().unwrap();
    let mut cache = offline_cache(tmp.path());
    assert!(cache.remote_version().unwrap().is_none());
}

#[test]
fn ensure_file_offline_and_missing_is_not_cached() {
    let tmp = tempfile::tempdir().unwrap();
    let mut cache = offline_cache(tmp.path());
    let err = cache.ensure_file("cards").unwrap_err();
    assert!(matches!(err, Error::NotCached(_)));
}

#[test]
fn ensure_file_offline_uses_existing_file() {
    let tmp = tempfile::tempdir().unwrap();
    fs::create_dir_all(tmp.path().join("parquet")).unwrap();
    fs::write(tmp.path().join("parquet/cards.parquet"), b"stub").unwrap();
    let mut cache = offline_cache(tmp.path());
    let path = cache.ensure_file("cards").unwrap();
    assert!(path.ends_with("parquet/cards.parquet"));
}

#[test]
fn unknown_logical_name_is_invalid_argument() {
    let tmp = tempfile::tempdir().unwrap();
    let mut cache = offline_cache(tmp.path());
    let err = cache.ensure_file("no_such_table").unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

// The literal scenario: a truncated Meta.json is deleted on parse
// failure and reported as corrupt.
#[test]
fn truncated_json_is_deleted_and_reported_corrupt() {
    let tmp = tempfile::tempdir().unwrap();
    let meta = tmp.path().join("Meta.json");
    fs::write(&meta, r#"{"data": {"#).unwrap();
    let mut cache = offline_cache(tmp.path());

    let err = cache.load_json("meta").unwrap_err();
    assert!(matches!(err, Error::CorruptCache { .. }));
    assert!(!meta.exists(), "corrupt file must be removed");

    // The very next access behaves as if the file was never cached.
    let err = cache.load_json("meta").unwrap_err();
    assert!(matches!(err, Error::NotCached(_)));
}

#[test]
fn bad_gzip_is_deleted_and_reported_corrupt() {
    let tmp = tempfile::tempdir().unwrap();
    let prices = tmp.path().join("AllPricesToday.json.gz");
    fs::write(&prices, b"definitely not gzip").unwrap();
    let mut cache = offline_cache(tmp.path());

    let err = cache.load_json("all_prices_today").unwrap_err();
    assert!(matches!(err, Error::CorruptCache { .. }));
    assert!(!prices.exists());
}

#[test]
fn truncated_gzip_stream_is_corrupt() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("AllPricesToday.json.gz");
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(br#"{"data": {"uuid": {}}}"#).unwrap();
    let full = enc.finish().unwrap();
    // Drop the tail of the gzip stream.
    fs::write(&path, &full[..full.len() - 6]).unwrap();

    let mut cache = offline_cache(tmp.path());
    let err = cache.load_json("all_prices_today").unwrap_err();
    assert!(matches!(err, Error::CorruptCache { .. }));
    assert!(!path.exists());
}

#[test]
fn valid_gzip_round_trips() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("AllPricesToday.json.gz");
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(br#"{"data": {"u1": {}}}"#).unwrap();
    fs::write(&path, enc.finish().unwrap()).unwrap();

    let mut cache = offline_cache(tmp.path());
    let value = cache.load_json("all_prices_today").unwrap();
    assert!(value["data"]["u1"].is_object());
}

#[test]
fn clear_empties_and_recreates_directory() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("cache");
    let cache = offline_cache(&dir);
    fs::write(dir.join("version.txt"), "x").unwrap();
    cache.clear().unwrap();
    assert!(dir.exists());
    assert!(!dir.join("version.txt").exists());
}

#[test]
fn close_is_idempotent() {
    let tmp = tempfile::tempdir().unwrap();
    let mut cache = offline_cache(tmp.path());
    cache.close();
    cache.close();
}
