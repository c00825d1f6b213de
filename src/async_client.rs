//! Async adapter over [`MtgClient`] for Tokio runtimes.
//!
//! The core is synchronous; this wrapper dispatches every operation
//! onto the blocking thread pool via [`tokio::task::spawn_blocking`],
//! keeping the event loop free. No async vocabulary leaks into the
//! core.
//!
//! ```no_run
//! use mtgjson_query::AsyncMtgClient;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = AsyncMtgClient::builder().build().await.unwrap();
//!     let sets = client.run(|c| c.sets().list(None, None, None, None)).await.unwrap();
//! }
//! ```

use crate::engine::{Param, Row};
use crate::error::{Error, Result};
use crate::MtgClient;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Configures and constructs an [`AsyncMtgClient`].
pub struct AsyncMtgClientBuilder {
    cache_dir: Option<PathBuf>,
    offline: bool,
    timeout: Duration,
}

impl Default for AsyncMtgClientBuilder {
    fn default() -> Self {
        Self {
            cache_dir: None,
            offline: false,
            timeout: Duration::from_secs(120),
        }
    }
}

impl AsyncMtgClientBuilder {
    pub fn cache_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.cache_dir = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build on the blocking pool (construction may hit the network
    /// for the version check).
    pub async fn build(self) -> Result<AsyncMtgClient> {
        tokio::task::spawn_blocking(move || {
            let mut builder = MtgClient::builder().offline(self.offline).timeout(self.timeout);
            if let Some(dir) = self.cache_dir {
                builder = builder.cache_dir(dir);
            }
            Ok(AsyncMtgClient {
                inner: Arc::new(Mutex::new(builder.build()?)),
            })
        })
        .await
        .map_err(|e| Error::InvalidArgument(format!("task join error: {e}")))?
    }
}

/// Thread-pool adapter over the synchronous [`MtgClient`].
///
/// A `Mutex` serializes access, matching the engine's single-writer
/// connection; use multiple clients for real parallelism.
pub struct AsyncMtgClient {
    inner: Arc<Mutex<MtgClient>>,
}

impl AsyncMtgClient {
    pub fn builder() -> AsyncMtgClientBuilder {
        AsyncMtgClientBuilder::default()
    }

    /// Run any sync client operation on the blocking pool.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&MtgClient) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let client = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = client
                .lock()
                .map_err(|_| Error::InvalidArgument("client lock poisoned".into()))?;
            f(&guard)
        })
        .await
        .map_err(|e| Error::InvalidArgument(format!("task join error: {e}")))?
    }

    /// Raw SQL, materialized as row maps.
    pub async fn sql(&self, query: &str, params: &[Param]) -> Result<Vec<Row>> {
        let query = query.to_string();
        let params = params.to_vec();
        self.run(move |c| c.sql(&query, &params)).await
    }

    /// MTGJSON build metadata.
    pub async fn meta(&self) -> Result<serde_json::Value> {
        self.run(|c| c.meta()).await
    }

    /// Check for a newer release; see [`MtgClient::refresh`].
    pub async fn refresh(&self) -> Result<bool> {
        self.run(|c| c.refresh()).await
    }

    /// Currently registered view names.
    pub async fn views(&self) -> Result<Vec<String>> {
        self.run(|c| Ok(c.views())).await
    }

    /// Release all resources.
    pub async fn close(&self) -> Result<()> {
        self.run(|c| c.close()).await
    }
}
