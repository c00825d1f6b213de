//! DuckDB engine: lazy view catalog, query execution, materializers.
//!
//! One [`Engine`] owns one in-memory DuckDB database. Views over the
//! cached parquet files are registered on first demand (the schema is
//! introspected from the parquet footer and adapted via
//! [`crate::views`]); large JSON payloads are ingested as native
//! tables. Results materialize in four shapes: row maps, a JSON array
//! string, typed records, or Arrow record batches.

use crate::cache::DataCache;
use crate::error::{Error, Result};
use crate::views;
use duckdb::arrow::record_batch::RecordBatch;
use duckdb::types::{TimeUnit, ToSqlOutput, Value as DuckValue};
use duckdb::Connection;
use serde::de::DeserializeOwned;
use serde_json::Value as Json;
use std::cell::{Ref, RefCell};
use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// One result row: column name → JSON value, in column order.
pub type Row = serde_json::Map<String, Json>;

// ---------------------------------------------------------------------------
// Param
// ---------------------------------------------------------------------------

/// A bound query parameter.
///
/// Every user-supplied value travels through one of these slots; no
/// value is ever concatenated into SQL text.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl duckdb::ToSql for Param {
    fn to_sql(&self) -> duckdb::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::Owned(match self {
            Param::Null => DuckValue::Null,
            Param::Bool(b) => DuckValue::Boolean(*b),
            Param::Int(i) => DuckValue::BigInt(*i),
            Param::Float(f) => DuckValue::Double(*f),
            Param::Text(s) => DuckValue::Text(s.clone()),
        }))
    }
}

impl From<&str> for Param {
    fn from(v: &str) -> Self {
        Param::Text(v.to_string())
    }
}

impl From<String> for Param {
    fn from(v: String) -> Self {
        Param::Text(v)
    }
}

impl From<&String> for Param {
    fn from(v: &String) -> Self {
        Param::Text(v.clone())
    }
}

impl From<bool> for Param {
    fn from(v: bool) -> Self {
        Param::Bool(v)
    }
}

impl From<i64> for Param {
    fn from(v: i64) -> Self {
        Param::Int(v)
    }
}

impl From<i32> for Param {
    fn from(v: i32) -> Self {
        Param::Int(v as i64)
    }
}

impl From<usize> for Param {
    fn from(v: usize) -> Self {
        Param::Int(v as i64)
    }
}

impl From<f64> for Param {
    fn from(v: f64) -> Self {
        Param::Float(v)
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Embedded DuckDB database with a lazily-registered view catalog.
pub struct Engine {
    conn: RefCell<Option<Connection>>,
    pub(crate) cache: RefCell<DataCache>,
    registered: RefCell<BTreeSet<String>>,
}

impl Engine {
    /// Open an in-memory database backed by the given cache.
    pub fn new(cache: DataCache) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: RefCell::new(Some(conn)),
            cache: RefCell::new(cache),
            registered: RefCell::new(BTreeSet::new()),
        })
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let guard = self.conn.borrow();
        let conn = guard.as_ref().ok_or(Error::NotConnected)?;
        f(conn)
    }

    /// The underlying DuckDB connection, for advanced use.
    pub fn raw(&self) -> Result<Ref<'_, Connection>> {
        Ref::filter_map(self.conn.borrow(), |c| c.as_ref()).map_err(|_| Error::NotConnected)
    }

    // -- View registry -----------------------------------------------------

    /// Idempotently register views, downloading their files if needed.
    pub fn ensure_views(&self, names: &[&str]) -> Result<()> {
        for name in names {
            if !self.has_view(name) {
                self.register_parquet_view(name)?;
            }
        }
        Ok(())
    }

    /// Whether a view or ingested table is registered.
    pub fn has_view(&self, name: &str) -> bool {
        self.registered.borrow().contains(name)
    }

    /// Sorted names of all registered views and tables.
    pub fn views(&self) -> Vec<String> {
        self.registered.borrow().iter().cloned().collect()
    }

    /// Forget every registration so the next access re-materializes.
    pub fn reset_views(&self) {
        self.registered.borrow_mut().clear();
    }

    /// Register one parquet-backed view, introspecting its schema and
    /// synthesizing the adapted view SQL.
    fn register_parquet_view(&self, name: &str) -> Result<()> {
        let path = self.cache.borrow_mut().ensure_file(name)?;
        let path = path.to_string_lossy().replace('\\', "/");

        let schema = self.describe_parquet(&path)?;
        let sql = if name == "card_legalities" {
            let columns: Vec<String> = schema.into_iter().map(|(c, _)| c).collect();
            views::legalities_view_sql(&path, &columns)
        } else {
            views::parquet_view_sql(name, &path, &schema)
        };

        self.with_conn(|conn| conn.execute_batch(&sql).map_err(Error::from))?;
        self.registered.borrow_mut().insert(name.to_string());
        debug!(view = name, %path, "registered view");
        Ok(())
    }

    /// `(column, type)` pairs from the parquet footer. No data scan.
    fn describe_parquet(&self, path: &str) -> Result<Vec<(String, String)>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT column_name, column_type FROM \
                 (DESCRIBE SELECT * FROM read_parquet('{path}'))"
            ))?;
            let mut rows = stmt.query([])?;
            let mut schema = Vec::new();
            while let Some(row) = rows.next()? {
                schema.push((row.get::<_, String>(0)?, row.get::<_, String>(1)?));
            }
            Ok(schema)
        })
    }

    // -- Table ingestion ---------------------------------------------------

    /// Load a small in-memory record list as a native table.
    ///
    /// Spills the records to a temporary JSON array file and lets
    /// DuckDB infer the schema. No-op for an empty slice.
    pub fn register_from_records(&self, name: &str, records: &[Json]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let mut tmp = tempfile::NamedTempFile::new()?;
        serde_json::to_writer(&mut tmp, records)?;
        tmp.flush()?;
        let path = tmp.path().to_string_lossy().replace('\\', "/");
        self.with_conn(|conn| {
            conn.execute_batch(&format!(
                "DROP TABLE IF EXISTS {name}; \
                 CREATE TABLE {name} AS SELECT * FROM read_json_auto('{path}')"
            ))
            .map_err(Error::from)
        })?;
        self.registered.borrow_mut().insert(name.to_string());
        Ok(())
    }

    /// Load a newline-delimited JSON file as a native table,
    /// autodetecting columns. DuckDB streams the file in one pass, so
    /// the row set never materializes in process memory.
    pub fn register_from_ndjson(&self, name: &str, path: &Path) -> Result<()> {
        let path = path.to_string_lossy().replace('\\', "/");
        self.with_conn(|conn| {
            conn.execute_batch(&format!(
                "DROP TABLE IF EXISTS {name}; \
                 CREATE TABLE {name} AS \
                 SELECT * FROM read_json_auto('{path}', format='newline_delimited')"
            ))
            .map_err(Error::from)
        })?;
        self.registered.borrow_mut().insert(name.to_string());
        debug!(table = name, "loaded NDJSON table");
        Ok(())
    }

    // -- Materializers -----------------------------------------------------

    /// Execute SQL and return rows as ordered column → value maps.
    ///
    /// Date, time, and timestamp scalars — including ones nested
    /// inside LIST and STRUCT cells — come back as ISO-8601 text, the
    /// single portable representation promised to callers.
    pub fn execute(&self, sql: &str, params: &[Param]) -> Result<Vec<Row>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let bound: Vec<&dyn duckdb::ToSql> =
                params.iter().map(|p| p as &dyn duckdb::ToSql).collect();
            let mut rows = stmt.query(bound.as_slice())?;

            let names: Vec<String> = match rows.as_ref() {
                Some(st) => st.column_names().into_iter().map(|s| s.to_string()).collect(),
                None => return Ok(Vec::new()),
            };

            let mut out = Vec::new();
            while let Some(row) = rows.next()? {
                let mut map = Row::new();
                for (i, name) in names.iter().enumerate() {
                    let value: DuckValue = row.get(i)?;
                    map.insert(name.clone(), duck_to_json(value));
                }
                out.push(map);
            }
            Ok(out)
        })
    }

    /// Execute SQL and return a single JSON array string.
    ///
    /// Wraps the query with DuckDB's own row-to-JSON aggregation and
    /// returns the backend serialization unchanged; `"[]"` when the
    /// result set is empty.
    pub fn execute_json(&self, sql: &str, params: &[Param]) -> Result<String> {
        let wrapped = format!("SELECT to_json(list(sub)) FROM ({sql}) sub");
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&wrapped)?;
            let bound: Vec<&dyn duckdb::ToSql> =
                params.iter().map(|p| p as &dyn duckdb::ToSql).collect();
            let mut rows = stmt.query(bound.as_slice())?;
            if let Some(row) = rows.next()? {
                if let DuckValue::Text(s) = row.get::<_, DuckValue>(0)? {
                    return Ok(s);
                }
            }
            Ok("[]".to_string())
        })
    }

    /// Execute SQL and decode rows straight into `T`.
    ///
    /// Rides [`execute_json`](Self::execute_json), so deserialization
    /// skips the intermediate value tree — markedly faster than the
    /// row-map path on large results.
    pub fn execute_typed<T: DeserializeOwned>(&self, sql: &str, params: &[Param]) -> Result<Vec<T>> {
        let json = self.execute_json(sql, params)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Execute SQL and return the first column of the first row.
    pub fn execute_scalar(&self, sql: &str, params: &[Param]) -> Result<Option<Json>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let bound: Vec<&dyn duckdb::ToSql> =
                params.iter().map(|p| p as &dyn duckdb::ToSql).collect();
            let mut rows = stmt.query(bound.as_slice())?;
            match rows.next()? {
                Some(row) => Ok(Some(duck_to_json(row.get::<_, DuckValue>(0)?))),
                None => Ok(None),
            }
        })
    }

    /// Execute SQL and return DuckDB's native Arrow export.
    pub fn execute_arrow(&self, sql: &str, params: &[Param]) -> Result<Vec<RecordBatch>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let bound: Vec<&dyn duckdb::ToSql> =
                params.iter().map(|p| p as &dyn duckdb::ToSql).collect();
            let batches: Vec<RecordBatch> = stmt.query_arrow(bound.as_slice())?.collect();
            Ok(batches)
        })
    }

    // -- Export and lifecycle ----------------------------------------------

    /// Materialize every registered view as a table in a standalone
    /// database file at `path` (overwritten if present). The result is
    /// readable by any DuckDB client, no SDK required.
    pub fn export_db(&self, path: &Path) -> Result<()> {
        self.with_conn(|conn| {
            if path.exists() {
                fs::remove_file(path)?;
            }
            let target = path.to_string_lossy().replace('\\', "/").replace('\'', "''");
            conn.execute_batch(&format!("ATTACH '{target}' AS export_db"))?;
            let copied = (|| -> Result<()> {
                for view in self.views() {
                    conn.execute_batch(&format!(
                        "CREATE TABLE export_db.{view} AS SELECT * FROM {view}"
                    ))?;
                }
                Ok(())
            })();
            let detached = conn.execute_batch("DETACH export_db");
            copied?;
            detached?;
            Ok(())
        })
    }

    /// Close the database, releasing all views and ingested tables.
    ///
    /// Idempotent; any later call on this engine returns
    /// [`Error::NotConnected`].
    pub fn close(&self) -> Result<()> {
        if let Some(conn) = self.conn.borrow_mut().take() {
            conn.close().map_err(|(_, e)| Error::Query(e))?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Value conversion
// ---------------------------------------------------------------------------

fn unit_to_micros(unit: &TimeUnit, raw: i64) -> i64 {
    match unit {
        TimeUnit::Second => raw.saturating_mul(1_000_000),
        TimeUnit::Millisecond => raw.saturating_mul(1_000),
        TimeUnit::Microsecond => raw,
        TimeUnit::Nanosecond => raw / 1_000,
    }
}

fn f64_to_json(f: f64) -> Json {
    serde_json::Number::from_f64(f).map(Json::Number).unwrap_or(Json::Null)
}

/// Convert one DuckDB value to JSON, recursing through LIST and
/// STRUCT cells so temporal scalars at any depth become ISO-8601 text.
fn duck_to_json(value: DuckValue) -> Json {
    match value {
        DuckValue::Null => Json::Null,
        DuckValue::Boolean(b) => Json::Bool(b),
        DuckValue::TinyInt(n) => Json::from(n),
        DuckValue::SmallInt(n) => Json::from(n),
        DuckValue::Int(n) => Json::from(n),
        DuckValue::BigInt(n) => Json::from(n),
        DuckValue::UTinyInt(n) => Json::from(n),
        DuckValue::USmallInt(n) => Json::from(n),
        DuckValue::UInt(n) => Json::from(n),
        DuckValue::UBigInt(n) => Json::from(n),
        DuckValue::HugeInt(n) => match i64::try_from(n) {
            Ok(v) => Json::from(v),
            Err(_) => Json::String(n.to_string()),
        },
        DuckValue::Float(f) => f64_to_json(f as f64),
        DuckValue::Double(f) => f64_to_json(f),
        DuckValue::Decimal(d) => match d.to_string().parse::<f64>() {
            Ok(f) => f64_to_json(f),
            Err(_) => Json::String(d.to_string()),
        },
        DuckValue::Text(s) => Json::String(s),
        DuckValue::Blob(bytes) => {
            let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
            Json::String(hex)
        }
        DuckValue::Date32(days) => Json::String(iso::date(days)),
        DuckValue::Time64(unit, raw) => Json::String(iso::time(unit_to_micros(&unit, raw))),
        DuckValue::Timestamp(unit, raw) => {
            Json::String(iso::timestamp(unit_to_micros(&unit, raw)))
        }
        DuckValue::List(items) => Json::Array(items.into_iter().map(duck_to_json).collect()),
        DuckValue::Enum(s) => Json::String(s),
        DuckValue::Struct(fields) => {
            let mut map = Row::new();
            for (k, v) in fields.iter() {
                map.insert(k.clone(), duck_to_json(v.clone()));
            }
            Json::Object(map)
        }
        DuckValue::Map(entries) => {
            let mut map = Row::new();
            for (k, v) in entries.iter() {
                let key = match duck_to_json(k.clone()) {
                    Json::String(s) => s,
                    other => other.to_string(),
                };
                map.insert(key, duck_to_json(v.clone()));
            }
            Json::Object(map)
        }
        _ => Json::Null,
    }
}

/// ISO-8601 rendering for DuckDB's raw temporal encodings.
mod iso {
    /// Days-since-epoch to (year, month, day). Proleptic Gregorian.
    fn civil_from_days(days: i64) -> (i64, u32, u32) {
        let z = days + 719_468;
        let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
        let doe = z - era * 146_097;
        let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
        let y = yoe + era * 400;
        let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
        let mp = (5 * doy + 2) / 153;
        let d = doy - (153 * mp + 2) / 5 + 1;
        let m = if mp < 10 { mp + 3 } else { mp - 9 };
        (if m <= 2 { y + 1 } else { y }, m as u32, d as u32)
    }

    pub fn date(days: i32) -> String {
        let (y, m, d) = civil_from_days(days as i64);
        format!("{y:04}-{m:02}-{d:02}")
    }

    pub fn time(micros: i64) -> String {
        let secs = micros.div_euclid(1_000_000);
        let frac = micros.rem_euclid(1_000_000);
        let (h, min, s) = (secs / 3_600, (secs / 60) % 60, secs % 60);
        if frac == 0 {
            format!("{h:02}:{min:02}:{s:02}")
        } else {
            format!("{h:02}:{min:02}:{s:02}.{frac:06}")
        }
    }

    pub fn timestamp(micros: i64) -> String {
        let days = micros.div_euclid(86_400_000_000);
        let within = micros.rem_euclid(86_400_000_000);
        let (y, m, d) = civil_from_days(days);
        format!("{y:04}-{m:02}-{d:02}T{}", time(within))
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn epoch_date() {
            assert_eq!(date(0), "1970-01-01");
        }

        #[test]
        fn known_dates() {
            assert_eq!(date(19_725), "2024-01-03");
            assert_eq!(date(-1), "1969-12-31");
        }

        #[test]
        fn timestamp_with_and_without_fraction() {
            assert_eq!(timestamp(0), "1970-01-01T00:00:00");
            assert_eq!(
                timestamp(19_725 * 86_400_000_000 + 3_661_000_001),
                "2024-01-03T01:01:01.000001"
            );
        }

        #[test]
        fn negative_timestamp_rolls_back_a_day() {
            assert_eq!(timestamp(-1_000_000), "1969-12-31T23:59:59");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_conversions() {
        assert_eq!(Param::from("x"), Param::Text("x".into()));
        assert_eq!(Param::from(3usize), Param::Int(3));
        assert_eq!(Param::from(1.5), Param::Float(1.5));
        assert_eq!(Param::from(true), Param::Bool(true));
    }
}
