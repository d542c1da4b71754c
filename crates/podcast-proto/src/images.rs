//! On-disk image cache for station logos and podcast artwork.
//!
//! Files are keyed by a hash of their full URL, so a second request for the
//! same artwork is served from disk without touching the network, and two
//! URLs that merely share a file name never collide.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::StatusCode;
use sha2::{Digest, Sha256};
use tracing::{debug, error};

use super::api::ApiError;
use super::platform;

#[derive(Clone)]
pub struct ImageCache {
    dir: PathBuf,
    http: reqwest::Client,
}

impl ImageCache {
    pub fn new(dir: PathBuf, http: reqwest::Client) -> Self {
        Self { dir, http }
    }

    /// Cache under `platform::cache_dir()/images`.
    pub fn with_default_dir(http: reqwest::Client) -> Self {
        Self::new(platform::cache_dir().join("images"), http)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where `url` is (or would be) stored.
    pub fn path_for(&self, url: &str) -> PathBuf {
        self.dir.join(file_name_for(url))
    }

    /// Return the cached file for `url`, downloading it first if needed.
    pub async fn fetch(&self, url: &str) -> Result<PathBuf, ApiError> {
        let path = self.path_for(url);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            debug!("image cache hit: {}", path.display());
            return Ok(path);
        }

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.to_string(),
                source,
            })?;
        if response.status() != StatusCode::OK {
            return Err(ApiError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        let bytes = response.bytes().await.map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;

        let io_err = |source: std::io::Error| ApiError::Io {
            path: path.clone(),
            source,
        };
        tokio::fs::create_dir_all(&self.dir).await.map_err(io_err)?;
        // Readers only ever see complete files; concurrent fetches of one URL
        // each write their own partial file and the last rename wins.
        let partial = self.partial_path(url);
        tokio::fs::write(&partial, &bytes).await.map_err(io_err)?;
        if let Err(e) = tokio::fs::rename(&partial, &path).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(io_err(e));
        }
        debug!("image cached: {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }

    fn partial_path(&self, url: &str) -> PathBuf {
        static SEQ: AtomicU64 = AtomicU64::new(0);
        let seq = SEQ.fetch_add(1, Ordering::Relaxed);
        self.dir
            .join(format!("{}.{}-{}.part", file_name_for(url), std::process::id(), seq))
    }

    /// Never-fail variant: logs and returns `None` on any error.
    pub async fn fetch_or_none(&self, url: &str) -> Option<PathBuf> {
        match self.fetch(url).await {
            Ok(p) => Some(p),
            Err(e) => {
                error!("Unable to download and save image from {} [{}]: {}", url, e.kind(), e);
                None
            }
        }
    }
}

/// First 16 hex digits of the SHA-256 of the whole URL, plus the extension of
/// its last path segment when it has a short alphanumeric one.
pub fn file_name_for(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    let key = hex::encode(&digest[..8]);
    match extension_of(url) {
        Some(ext) => format!("{}.{}", key, ext),
        None => key,
    }
}

fn extension_of(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or("");
    let path = path.split_once("://").map_or(path, |(_, rest)| rest);
    let (_, segment) = path.trim_end_matches('/').rsplit_once('/')?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.len() > 5 {
        return None;
    }
    if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
