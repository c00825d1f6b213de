//! Embedded, read-only query engine for the MTGJSON dataset.
//!
//! Data is fetched from the MTGJSON CDN as parquet and JSON files,
//! cached locally with version tracking, and queried in-process via
//! DuckDB. Views are registered lazily on first use, with dynamic
//! schema adaptation (CSV-encoded list columns become arrays, JSON
//! text columns become navigable JSON, the wide legalities table is
//! UNPIVOTed). The large price and SKU documents are stream-flattened
//! into native tables.
//!
//! # Quick start
//!
//! ```no_run
//! use mtgjson_query::MtgClient;
//!
//! let client = MtgClient::builder().build().unwrap();
//!
//! let bolts = client.cards().get_by_name("Lightning Bolt", None).unwrap();
//! let pack = client.booster().open_pack("MH3", "draft").unwrap();
//! ```

#[cfg(feature = "async")]
pub mod async_client;
pub mod booster;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod models;
pub mod queries;
pub mod query;
mod views;

#[cfg(feature = "async")]
pub use async_client::AsyncMtgClient;
pub use cache::{DataCache, ProgressFn};
pub use engine::{Engine, Param, Row};
pub use error::{Error, Result};
pub use query::QueryBuilder;

use duckdb::arrow::record_batch::RecordBatch;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

// ---------------------------------------------------------------------------
// MtgClientBuilder
// ---------------------------------------------------------------------------

/// Configures and constructs an [`MtgClient`].
pub struct MtgClientBuilder {
    cache_dir: Option<PathBuf>,
    offline: bool,
    timeout: Duration,
    on_progress: Option<ProgressFn>,
}

impl Default for MtgClientBuilder {
    fn default() -> Self {
        Self {
            cache_dir: None,
            offline: false,
            timeout: Duration::from_secs(120),
            on_progress: None,
        }
    }
}

impl MtgClientBuilder {
    /// Use a custom cache directory instead of the platform default.
    pub fn cache_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.cache_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Never touch the network; only previously cached files are used.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// HTTP timeout for CDN downloads (default 120 s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Per-chunk download progress callback
    /// `(file name, bytes so far, total bytes if known)`.
    pub fn on_progress(mut self, f: impl Fn(&str, u64, Option<u64>) + Send + 'static) -> Self {
        self.on_progress = Some(Box::new(f));
        self
    }

    /// Build the client. May check the CDN version (unless offline)
    /// but downloads no data eagerly; files are fetched on first query.
    pub fn build(self) -> Result<MtgClient> {
        let mut cache = DataCache::new(self.cache_dir, self.offline, self.timeout)?;
        if let Some(f) = self.on_progress {
            cache = cache.with_progress(f);
        }
        let engine = Engine::new(cache)?;
        Ok(MtgClient { engine })
    }
}

// ---------------------------------------------------------------------------
// MtgClient
// ---------------------------------------------------------------------------

/// Entry point: owns one [`DataCache`] and one [`Engine`], and hands
/// out the per-domain query surfaces.
///
/// The core is synchronous and single-threaded; callers needing
/// concurrency use one client per thread or the `async` feature's
/// thread-pool adapter.
pub struct MtgClient {
    engine: Engine,
}

impl MtgClient {
    pub fn builder() -> MtgClientBuilder {
        MtgClientBuilder::default()
    }

    // -- Domain query surfaces ---------------------------------------------

    /// Card printings: lookup, search, atomic projection.
    pub fn cards(&self) -> queries::cards::CardQuery<'_> {
        queries::cards::CardQuery::new(&self.engine)
    }

    /// Set metadata and per-set financial summary.
    pub fn sets(&self) -> queries::sets::SetQuery<'_> {
        queries::sets::SetQuery::new(&self.engine)
    }

    /// Token printings.
    pub fn tokens(&self) -> queries::tokens::TokenQuery<'_> {
        queries::tokens::TokenQuery::new(&self.engine)
    }

    /// Card prices (triggers ingestion of `AllPricesToday` on first use).
    pub fn prices(&self) -> queries::prices::PriceQuery<'_> {
        queries::prices::PriceQuery::new(&self.engine)
    }

    /// TCGplayer SKUs (triggers ingestion of `TcgplayerSkus` on first use).
    pub fn skus(&self) -> queries::skus::SkuQuery<'_> {
        queries::skus::SkuQuery::new(&self.engine)
    }

    /// Cards by external identifier (Scryfall, TCGplayer, MCM, ...).
    pub fn identifiers(&self) -> queries::identifiers::IdentifierQuery<'_> {
        queries::identifiers::IdentifierQuery::new(&self.engine)
    }

    /// Per-format legality.
    pub fn legalities(&self) -> queries::legalities::LegalityQuery<'_> {
        queries::legalities::LegalityQuery::new(&self.engine)
    }

    /// Preconstructed decks from `DeckList.json`.
    pub fn decks(&self) -> queries::decks::DeckQuery<'_> {
        queries::decks::DeckQuery::new(&self.engine)
    }

    /// Sealed products nested in set data.
    pub fn sealed(&self) -> queries::sealed::SealedQuery<'_> {
        queries::sealed::SealedQuery::new(&self.engine)
    }

    /// Keywords, card types, and enum values.
    pub fn enums(&self) -> queries::enums::EnumQuery<'_> {
        queries::enums::EnumQuery::new(&self.engine)
    }

    /// Booster pack simulator.
    pub fn booster(&self) -> booster::BoosterSimulator<'_> {
        booster::BoosterSimulator::new(&self.engine)
    }

    // -- Metadata and raw access -------------------------------------------

    /// MTGJSON build metadata (`Meta.json`), downloading if needed.
    pub fn meta(&self) -> Result<serde_json::Value> {
        self.engine.cache.borrow_mut().load_json("meta")
    }

    /// Names of the currently registered views and ingested tables.
    /// Grows as query surfaces are first used.
    pub fn views(&self) -> Vec<String> {
        self.engine.views()
    }

    /// Raw SQL with `$N` positional parameters, materialized as row maps.
    pub fn sql(&self, query: &str, params: &[Param]) -> Result<Vec<Row>> {
        self.engine.execute(query, params)
    }

    /// Raw SQL materialized as a single JSON array string.
    pub fn sql_json(&self, query: &str, params: &[Param]) -> Result<String> {
        self.engine.execute_json(query, params)
    }

    /// Raw SQL materialized as Arrow record batches.
    pub fn sql_arrow(&self, query: &str, params: &[Param]) -> Result<Vec<RecordBatch>> {
        self.engine.execute_arrow(query, params)
    }

    /// The engine, for typed raw queries and advanced use.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    // -- Lifecycle ----------------------------------------------------------

    /// Pick up a new MTGJSON release in a long-running process.
    ///
    /// When the cache reports stale, the view registry is cleared so
    /// every domain surface re-materializes from fresh files on next
    /// use. Returns true iff a reset happened. Not safe to call
    /// concurrently with in-flight queries.
    pub fn refresh(&self) -> Result<bool> {
        if !self.engine.cache.borrow_mut().is_stale()? {
            return Ok(false);
        }
        self.engine.reset_views();
        info!("MTGJSON data is stale; view registry reset");
        Ok(true)
    }

    /// Export all registered views to a standalone DuckDB file at
    /// `path` (overwritten if present), readable by any DuckDB client.
    pub fn export_db<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.engine.export_db(path.as_ref())
    }

    /// Release the database and HTTP resources. Idempotent; dropping
    /// the client does the same implicitly.
    pub fn close(&self) -> Result<()> {
        self.engine.close()?;
        self.engine.cache.borrow_mut().close();
        Ok(())
    }
}

impl fmt::Display for MtgClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.engine.cache.borrow();
        write!(
            f,
            "MtgClient(cache_dir={}, views=[{}], offline={})",
            cache.dir().display(),
            self.views().join(", "),
            cache.offline()
        )
    }
}
