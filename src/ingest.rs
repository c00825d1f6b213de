//! Streaming flatteners for the nested price and SKU documents.
//!
//! `AllPricesToday.json.gz` and `TcgplayerSkus.json.gz` are deeply
//! nested and large (hundreds of MB uncompressed). Rather than
//! materializing the flattened row set in memory, each row is written
//! as one JSON line to a buffered temp file, which DuckDB then bulk
//! loads in a single pass. Peak memory is one parsed source document
//! plus the write buffer.

use crate::engine::Engine;
use crate::error::Result;
use flate2::read::GzDecoder;
use serde_json::{json, Map, Value};
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

const WRITE_BUF: usize = 1024 * 1024;

/// Name of the ingested price table.
pub const PRICES_TABLE: &str = "prices_today";

/// Name of the ingested SKU table.
pub const SKUS_TABLE: &str = "tcgplayer_skus";

/// Parse a (possibly gzipped) MTGJSON document and return its `data`
/// payload as an object. Non-object payloads flatten to nothing.
fn read_payload(path: &Path) -> Result<Map<String, Value>> {
    let file = fs::File::open(path)?;
    let root: Value = if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        serde_json::from_reader(BufReader::new(GzDecoder::new(BufReader::new(file))))?
    } else {
        serde_json::from_reader(BufReader::new(file))?
    };
    Ok(match root {
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Object(data)) => data,
            _ => Map::new(),
        },
        _ => Map::new(),
    })
}

/// Flatten the nested price document onto `out`, one JSON line per
/// price point. Returns the number of rows written.
///
/// Input shape per uuid:
/// `{source → {provider → {currency, retail|buylist → {finish → {date → price}}}}}`.
/// Output line:
/// `{uuid, source, provider, currency, category, finish, date, price}`.
/// Null prices are dropped; `currency` defaults to `"USD"`.
pub fn flatten_prices<W: Write>(data: &Map<String, Value>, out: &mut W) -> Result<u64> {
    let mut count = 0u64;
    for (uuid, sources) in data {
        let Some(sources) = sources.as_object() else {
            continue;
        };
        for (source, providers) in sources {
            let Some(providers) = providers.as_object() else {
                continue;
            };
            for (provider, price_data) in providers {
                let Some(price_data) = price_data.as_object() else {
                    continue;
                };
                let currency = price_data
                    .get("currency")
                    .and_then(|c| c.as_str())
                    .unwrap_or("USD");
                for category in ["buylist", "retail"] {
                    let Some(finishes) = price_data.get(category).and_then(|c| c.as_object())
                    else {
                        continue;
                    };
                    for (finish, dates) in finishes {
                        let Some(dates) = dates.as_object() else {
                            continue;
                        };
                        for (date, price) in dates {
                            let Some(price) = price.as_f64() else {
                                continue;
                            };
                            let line = json!({
                                "uuid": uuid,
                                "source": source,
                                "provider": provider,
                                "currency": currency,
                                "category": category,
                                "finish": finish,
                                "date": date,
                                "price": price,
                            });
                            serde_json::to_writer(&mut *out, &line)?;
                            out.write_all(b"\n")?;
                            count += 1;
                        }
                    }
                }
            }
        }
    }
    Ok(count)
}

/// Flatten the SKU document onto `out`: each inner record emitted
/// with the outer card `uuid` injected. Returns rows written.
pub fn flatten_skus<W: Write>(data: &Map<String, Value>, out: &mut W) -> Result<u64> {
    let mut count = 0u64;
    for (uuid, skus) in data {
        let Some(skus) = skus.as_array() else {
            continue;
        };
        for sku in skus {
            let Some(sku) = sku.as_object() else {
                continue;
            };
            let mut row = sku.clone();
            row.insert("uuid".to_string(), Value::String(uuid.clone()));
            serde_json::to_writer(&mut *out, &Value::Object(row))?;
            out.write_all(b"\n")?;
            count += 1;
        }
    }
    Ok(count)
}

fn load_ndjson_table<F>(engine: &Engine, table: &str, path: &Path, flatten: F) -> Result<bool>
where
    F: FnOnce(&Map<String, Value>, &mut BufWriter<&mut fs::File>) -> Result<u64>,
{
    let data = read_payload(path)?;

    let mut tmp = tempfile::NamedTempFile::new()?;
    let count = {
        let mut writer = BufWriter::with_capacity(WRITE_BUF, tmp.as_file_mut());
        let count = flatten(&data, &mut writer)?;
        writer.flush()?;
        count
    };
    drop(data);

    if count == 0 {
        return Ok(false);
    }
    engine.register_from_ndjson(table, tmp.path())?;
    debug!(table, rows = count, "ingested table");
    Ok(true)
}

/// Ingest `AllPricesToday` from `path` into the `prices_today` table.
/// Returns false when the document holds no price points.
pub fn load_prices(engine: &Engine, path: &Path) -> Result<bool> {
    load_ndjson_table(engine, PRICES_TABLE, path, |data, out| flatten_prices(data, out))
}

/// Ingest `TcgplayerSkus` from `path` into the `tcgplayer_skus` table.
pub fn load_skus(engine: &Engine, path: &Path) -> Result<bool> {
    load_ndjson_table(engine, SKUS_TABLE, path, |data, out| flatten_skus(data, out))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_prices() -> Map<String, Value> {
        let doc = json!({
            "uuid-1": {
                "paper": {
                    "tcgplayer": {
                        "currency": "USD",
                        "retail": {
                            "normal": {"2024-01-01": 1.0, "2024-01-02": 1.5},
                            "foil": {"2024-01-01": 3.25}
                        },
                        "buylist": {
                            "normal": {"2024-01-01": 0.5, "2024-01-02": null}
                        }
                    },
                    "cardmarket": {
                        "currency": "EUR",
                        "retail": {"normal": {"2024-01-02": 1.1}}
                    }
                },
                "mtgo": {
                    "cardhoarder": {
                        "retail": {"normal": {"2024-01-02": 0.02}}
                    }
                }
            },
            "uuid-2": "not-an-object"
        });
        match doc {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    /// Reference flattener: accumulate every row in memory, the way a
    /// naive implementation would, for equivalence checking.
    fn naive_rows(data: &Map<String, Value>) -> Vec<Value> {
        let mut rows = Vec::new();
        for (uuid, sources) in data {
            let Some(sources) = sources.as_object() else { continue };
            for (source, providers) in sources {
                let Some(providers) = providers.as_object() else { continue };
                for (provider, pd) in providers {
                    let Some(pd) = pd.as_object() else { continue };
                    let currency = pd.get("currency").and_then(|c| c.as_str()).unwrap_or("USD");
                    for category in ["buylist", "retail"] {
                        let Some(fin) = pd.get(category).and_then(|c| c.as_object()) else {
                            continue;
                        };
                        for (finish, dates) in fin {
                            let Some(dates) = dates.as_object() else { continue };
                            for (date, price) in dates {
                                if let Some(price) = price.as_f64() {
                                    rows.push(json!({
                                        "uuid": uuid, "source": source,
                                        "provider": provider, "currency": currency,
                                        "category": category, "finish": finish,
                                        "date": date, "price": price,
                                    }));
                                }
                            }
                        }
                    }
                }
            }
        }
        rows
    }

    fn parse_lines(buf: &[u8]) -> Vec<Value> {
        std::str::from_utf8(buf)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn streaming_matches_naive_flattener() {
        let data = sample_prices();
        let mut buf = Vec::new();
        let count = flatten_prices(&data, &mut buf).unwrap();

        let mut streamed = parse_lines(&buf);
        let mut naive = naive_rows(&data);
        assert_eq!(count as usize, naive.len());

        let key = |v: &Value| serde_json::to_string(v).unwrap();
        streamed.sort_by_key(key);
        naive.sort_by_key(key);
        assert_eq!(streamed, naive);
    }

    #[test]
    fn null_prices_are_dropped() {
        let data = sample_prices();
        let mut buf = Vec::new();
        flatten_prices(&data, &mut buf).unwrap();
        for row in parse_lines(&buf) {
            assert!(row["price"].as_f64().is_some(), "row with null price: {row}");
        }
    }

    #[test]
    fn currency_defaults_to_usd() {
        let data = sample_prices();
        let mut buf = Vec::new();
        flatten_prices(&data, &mut buf).unwrap();
        let rows = parse_lines(&buf);
        let cardhoarder: Vec<_> = rows
            .iter()
            .filter(|r| r["provider"] == "cardhoarder")
            .collect();
        assert!(!cardhoarder.is_empty());
        assert!(cardhoarder.iter().all(|r| r["currency"] == "USD"));
        assert!(rows
            .iter()
            .filter(|r| r["provider"] == "cardmarket")
            .all(|r| r["currency"] == "EUR"));
    }

    #[test]
    fn skus_inject_outer_uuid() {
        let doc = json!({
            "uuid-1": [
                {"skuId": 101, "productId": 9, "condition": "NEAR MINT"},
                {"skuId": 102, "productId": 9, "condition": "LIGHTLY PLAYED"}
            ],
            "uuid-2": "garbage"
        });
        let Value::Object(data) = doc else { unreachable!() };
        let mut buf = Vec::new();
        let count = flatten_skus(&data, &mut buf).unwrap();
        assert_eq!(count, 2);
        let rows = parse_lines(&buf);
        assert!(rows.iter().all(|r| r["uuid"] == "uuid-1"));
        assert_eq!(rows[0]["skuId"], 101);
    }
}
