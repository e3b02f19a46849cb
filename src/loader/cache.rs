//! On-disk cache of the raw ontology source
//!
//! The cache is a single file keyed by the version found in the source's own
//! header. Writes go to a temp file in the same directory and are renamed
//! into place, so readers never observe a partial file.

use super::LoadResult;
use crate::obo::sniff_data_version;
use bytes::Bytes;
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Header bytes inspected when looking for `data-version`
const HEADER_SCAN_BYTES: usize = 64 * 1024;

/// Version key of a raw source: its `data-version`, or a content digest
pub fn version_key(bytes: &[u8]) -> String {
    let head = &bytes[..bytes.len().min(HEADER_SCAN_BYTES)];
    if let Some(version) = sniff_data_version(&String::from_utf8_lossy(head)) {
        return version;
    }
    content_digest(bytes)
}

fn content_digest(bytes: &[u8]) -> String {
    format!("sha256:{}", hex::encode(Sha256::digest(bytes)))
}

/// Write `bytes` to `path` through a temp file plus rename
pub fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Handle on the cache file
#[derive(Debug, Clone)]
pub struct SourceCache {
    path: PathBuf,
}

impl SourceCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cached bytes, or `None` when no cache file exists
    pub async fn read(&self) -> LoadResult<Option<Bytes>> {
        match tokio::fs::read(&self.path).await {
            Ok(data) => {
                debug!("Cache hit: {} ({} bytes)", self.path.display(), data.len());
                Ok(Some(Bytes::from(data)))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Version key of the cached file, if there is a readable one
    pub async fn version(&self) -> Option<String> {
        match self.read().await {
            Ok(Some(bytes)) => Some(version_key(&bytes)),
            _ => None,
        }
    }

    /// Atomically replace the cache file
    pub async fn write(&self, bytes: Bytes) -> LoadResult<()> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomic(&path, &bytes)).await??;
        info!("Cached ontology source at {}", self.path.display());
        Ok(())
    }
}
