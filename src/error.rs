//! Error kinds surfaced by the query engine.

/// All failure modes of the crate.
///
/// I/O and engine errors propagate with their original message; the
/// crate performs no retries. The one self-heal is the cache deleting
/// a corrupt file before returning [`Error::CorruptCache`], so the
/// next call re-downloads.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A data file is not in the local cache and downloading is
    /// disallowed (offline mode).
    #[error("not cached: {0} (offline mode is enabled)")]
    NotCached(String),

    /// Transport failure, HTTP error status, or timeout while
    /// fetching from the CDN.
    #[error("download failed: {0}")]
    DownloadFailed(#[from] reqwest::Error),

    /// A cached file failed to parse. The file has already been
    /// removed; retrying will re-download it.
    #[error("cache file '{file}' was corrupt and has been removed ({detail}); retry to re-download")]
    CorruptCache { file: String, detail: String },

    /// DuckDB rejected or failed to execute the SQL.
    #[error("query error: {0}")]
    Query(#[from] duckdb::Error),

    /// A caller-supplied value failed a precondition.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation attempted on a closed engine.
    #[error("engine is closed")]
    NotConnected,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
