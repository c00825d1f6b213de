//! Version-aware CDN download and local file store.
//!
//! `DataCache` owns one flat directory of MTGJSON data files plus a
//! `version.txt` recording the last successfully downloaded upstream
//! version. Files are fetched lazily on first access and re-fetched
//! when the recorded version no longer matches `Meta.json` on the CDN.

use crate::config;
use crate::error::{Error, Result};
use flate2::read::GzDecoder;
use reqwest::blocking::Client;
use std::fs;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Download progress callback: `(file name, bytes so far, total bytes if known)`.
pub type ProgressFn = Box<dyn Fn(&str, u64, Option<u64>) + Send>;

const CHUNK_SIZE: usize = 64 * 1024;

/// Version-keyed downloader and local file store for MTGJSON data.
pub struct DataCache {
    dir: PathBuf,
    offline: bool,
    timeout: Duration,
    client: Option<Client>,
    remote_ver: Option<String>,
    on_progress: Option<ProgressFn>,
}

impl DataCache {
    /// Create a cache rooted at `dir` (platform default when `None`),
    /// creating the directory if needed.
    pub fn new(dir: Option<PathBuf>, offline: bool, timeout: Duration) -> Result<Self> {
        let dir = dir.unwrap_or_else(config::default_cache_dir);
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            offline,
            timeout,
            client: None,
            remote_ver: None,
            on_progress: None,
        })
    }

    /// Install a per-chunk download progress callback.
    pub fn with_progress(mut self, f: ProgressFn) -> Self {
        self.on_progress = Some(f);
        self
    }

    /// The cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether the cache operates without network access.
    pub fn offline(&self) -> bool {
        self.offline
    }

    fn client(&mut self) -> Result<&Client> {
        if self.client.is_none() {
            self.client = Some(
                Client::builder()
                    .timeout(self.timeout)
                    .redirect(reqwest::redirect::Policy::limited(10))
                    .build()?,
            );
        }
        Ok(self.client.as_ref().unwrap())
    }

    /// The version recorded by the last successful download, if any.
    pub fn local_version(&self) -> Option<String> {
        fs::read_to_string(self.dir.join(config::VERSION_FILE))
            .ok()
            .map(|s| s.trim().to_string())
    }

    fn save_version(&self, version: &str) {
        let _ = fs::write(self.dir.join(config::VERSION_FILE), version);
    }

    /// Current upstream version from `Meta.json`, memoized per instance.
    ///
    /// `None` when offline or the CDN is unreachable.
    pub fn remote_version(&mut self) -> Result<Option<String>> {
        if self.remote_ver.is_some() {
            return Ok(self.remote_ver.clone());
        }
        if self.offline {
            return Ok(None);
        }
        let client = self.client()?.clone();
        let fetched = client
            .get(config::META_URL)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.json::<serde_json::Value>());
        match fetched {
            Ok(meta) => {
                self.remote_ver = meta
                    .pointer("/data/version")
                    .or_else(|| meta.pointer("/meta/version"))
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string());
                Ok(self.remote_ver.clone())
            }
            Err(e) => {
                warn!(error = %e, "failed to fetch MTGJSON version from CDN");
                Ok(None)
            }
        }
    }

    /// Whether the local cache is out of date against the CDN.
    ///
    /// True when no local version is recorded or the CDN reports a
    /// different version; false when the remote version cannot be
    /// obtained (nothing actionable either way).
    pub fn is_stale(&mut self) -> Result<bool> {
        let Some(local) = self.local_version() else {
            return Ok(true);
        };
        Ok(match self.remote_version()? {
            Some(remote) => local != remote,
            None => false,
        })
    }

    /// Local path to a data file, downloading it when absent or stale.
    ///
    /// `name` is a logical name from the config tables (`"cards"`,
    /// `"all_prices_today"`, `"meta"`, ...). Fails with
    /// [`Error::NotCached`] when offline and the file is missing.
    pub fn ensure_file(&mut self, name: &str) -> Result<PathBuf> {
        let rel = config::source_path(name)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown data file: '{name}'")))?;
        let local = self.dir.join(rel);

        if !local.exists() || self.is_stale()? {
            if self.offline {
                if local.exists() {
                    return Ok(local);
                }
                return Err(Error::NotCached(rel.to_string()));
            }
            self.download(rel, &local)?;
            if let Some(version) = self.remote_version()? {
                self.save_version(&version);
            }
        }
        Ok(local)
    }

    /// Stream a CDN file to `<dest>.tmp`, then rename over `dest`.
    ///
    /// An interrupted or failed download never leaves a partial file:
    /// the tmp sibling is removed on any error and the rename is the
    /// only step that makes the file visible.
    fn download(&mut self, rel: &str, dest: &Path) -> Result<()> {
        let url = format!("{}/{}", config::CDN_BASE, rel);
        info!(%url, "downloading");

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = dest.with_file_name(format!(
            "{}.tmp",
            dest.file_name().and_then(|n| n.to_str()).unwrap_or("download")
        ));

        let client = self.client()?.clone();
        let result = (|| -> Result<()> {
            let mut resp = client.get(&url).send()?.error_for_status()?;
            let total = resp.content_length();
            let mut out = BufWriter::new(fs::File::create(&tmp)?);
            let mut buf = [0u8; CHUNK_SIZE];
            let mut seen: u64 = 0;
            loop {
                let n = resp.read(&mut buf).map_err(Error::Io)?;
                if n == 0 {
                    break;
                }
                out.write_all(&buf[..n])?;
                seen += n as u64;
                if let Some(cb) = &self.on_progress {
                    cb(rel, seen, total);
                }
            }
            out.flush()?;
            drop(out);
            fs::rename(&tmp, dest)?;
            Ok(())
        })();

        if result.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        result
    }

    /// Load and parse a JSON file, transparently decoding `.gz`.
    ///
    /// On any parse failure (bad gzip, truncated stream, invalid JSON
    /// or text encoding, I/O error) the corrupt file is deleted and
    /// [`Error::CorruptCache`] returned, so the next call re-downloads.
    pub fn load_json(&mut self, name: &str) -> Result<serde_json::Value> {
        let path = self.ensure_file(name)?;

        let parsed = (|| -> std::result::Result<serde_json::Value, String> {
            let file = fs::File::open(&path).map_err(|e| e.to_string())?;
            if path.extension().and_then(|e| e.to_str()) == Some("gz") {
                let decoder = GzDecoder::new(BufReader::new(file));
                serde_json::from_reader(BufReader::new(decoder)).map_err(|e| e.to_string())
            } else {
                serde_json::from_reader(BufReader::new(file)).map_err(|e| e.to_string())
            }
        })();

        parsed.map_err(|detail| {
            let file = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("unknown")
                .to_string();
            warn!(%file, %detail, "corrupt cache file, removing");
            let _ = fs::remove_file(&path);
            Error::CorruptCache { file, detail }
        })
    }

    /// Remove all cached files and recreate the cache directory.
    pub fn clear(&self) -> Result<()> {
        if self.dir.exists() {
            fs::remove_dir_all(&self.dir)?;
            fs::create_dir_all(&self.dir)?;
        }
        Ok(())
    }

    /// Release the HTTP client and its sockets. Idempotent.
    pub fn close(&mut self) {
        self.client = None;
    }
}

impl std::fmt::Debug for DataCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataCache")
            .field("dir", &self.dir)
            .field("offline", &self.offline)
            .finish_non_exhaustive()
    }
}
