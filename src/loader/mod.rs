//! Graph source loader
//!
//! Cache-then-fetch: a readable, parseable cache file wins. Otherwise the
//! source is fetched (bounded by a timeout), parsed, and written back to the
//! cache atomically. When neither path yields a graph the load fails with
//! [`LoadError::SourceUnavailable`]; an empty graph is never substituted.

pub mod cache;
pub mod fetch;
pub mod service;

pub use cache::{version_key, SourceCache};
pub use fetch::{fetcher_for, FileFetcher, HttpFetcher, SourceFetcher};
pub use service::{OntologyService, RefreshOutcome};

use crate::config::EngineConfig;
use crate::obo::{self, ParseError};
use crate::ontology::{Ontology, OntologyBuilder, TermId};
use bytes::Bytes;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Loader errors. Cloneable so one failed load can be handed to every
/// caller that waited on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// Neither the cache nor the remote source produced a graph. Fatal.
    #[error("Ontology source unavailable ({source_ref}): {reason}")]
    SourceUnavailable { source_ref: String, reason: String },

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Fetch timed out after {0:?}")]
    Timeout(Duration),

    #[error("Background task failed: {0}")]
    Task(String),
}

pub type LoadResult<T> = Result<T, LoadError>;

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::Io(e.to_string())
    }
}

impl From<ParseError> for LoadError {
    fn from(e: ParseError) -> Self {
        LoadError::Parse(e.to_string())
    }
}

impl From<reqwest::Error> for LoadError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LoadError::Http(format!("request timed out: {}", e))
        } else {
            LoadError::Http(e.to_string())
        }
    }
}

impl From<tokio::task::JoinError> for LoadError {
    fn from(e: tokio::task::JoinError) -> Self {
        LoadError::Task(e.to_string())
    }
}

/// Result of a remote re-check
#[derive(Debug)]
pub enum Refreshed {
    /// Remote version equals both the cache and the caller's graph
    Unchanged { version: String },
    /// A newly built graph
    Updated(Ontology),
}

/// Loads an [`Ontology`] from a cache file and a fetcher
pub struct SourceLoader {
    fetcher: Arc<dyn SourceFetcher>,
    cache: SourceCache,
    timeout: Duration,
    root: TermId,
}

impl fmt::Debug for SourceLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceLoader")
            .field("source", &self.fetcher.source_ref())
            .field("cache", &self.cache.path())
            .field("timeout", &self.timeout)
            .field("root", &self.root)
            .finish()
    }
}

impl SourceLoader {
    pub fn new(
        fetcher: Arc<dyn SourceFetcher>,
        cache: SourceCache,
        timeout: Duration,
        root: impl Into<TermId>,
    ) -> Self {
        Self {
            fetcher,
            cache,
            timeout,
            root: root.into(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> LoadResult<Self> {
        let fetcher = fetcher_for(&config.source_url, config.fetch_timeout())?;
        Ok(Self::new(
            fetcher,
            SourceCache::new(config.cache_path.clone()),
            config.fetch_timeout(),
            config.root_term.as_str(),
        ))
    }

    pub fn source_ref(&self) -> String {
        self.fetcher.source_ref()
    }

    pub fn cache(&self) -> &SourceCache {
        &self.cache
    }

    /// Load the graph: cache first, remote source second
    pub async fn load(&self) -> LoadResult<Ontology> {
        match self.cache.read().await {
            Ok(Some(bytes)) => match self.build(bytes).await {
                Ok(ontology) => {
                    info!("Loaded ontology from cache {}", self.cache.path().display());
                    return Ok(ontology);
                }
                Err(e) => warn!("Cached source {} is unusable: {}", self.cache.path().display(), e),
            },
            Ok(None) => info!("No cached source at {}", self.cache.path().display()),
            Err(e) => warn!("Cannot read cache {}: {}", self.cache.path().display(), e),
        }

        let bytes = self.fetch_remote().await.map_err(|e| self.unavailable(e))?;
        let ontology = self.build(bytes.clone()).await.map_err(|e| self.unavailable(e))?;
        self.persist(bytes).await;
        Ok(ontology)
    }

    /// Re-fetch the source and rebuild if its version differs from
    /// `current_version` or from the cached file
    pub async fn refresh(&self, current_version: Option<&str>) -> LoadResult<Refreshed> {
        let bytes = self.fetch_remote().await.map_err(|e| self.unavailable(e))?;
        let remote_version = version_key(&bytes);
        let cache_current = self.cache.version().await.as_deref() == Some(remote_version.as_str());

        if cache_current && current_version == Some(remote_version.as_str()) {
            info!("Ontology source unchanged at version {}", remote_version);
            return Ok(Refreshed::Unchanged {
                version: remote_version,
            });
        }

        let ontology = self.build(bytes.clone()).await.map_err(|e| self.unavailable(e))?;
        if !cache_current {
            self.persist(bytes).await;
        }
        Ok(Refreshed::Updated(ontology))
    }

    /// Fetch through the configured fetcher, bounded by the timeout
    pub async fn fetch_remote(&self) -> LoadResult<Bytes> {
        info!("Fetching ontology source {}", self.fetcher.source_ref());
        match tokio::time::timeout(self.timeout, self.fetcher.fetch()).await {
            Ok(result) => result,
            Err(_) => Err(LoadError::Timeout(self.timeout)),
        }
    }

    /// Parse and build off the async runtime
    async fn build(&self, bytes: Bytes) -> LoadResult<Ontology> {
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || -> LoadResult<Ontology> {
            let doc = obo::parse_bytes(&bytes)?;
            let version = doc
                .header
                .data_version
                .clone()
                .unwrap_or_else(|| version_key(&bytes));
            Ok(OntologyBuilder::from_document(&doc)
                .with_root(root)
                .with_version(version)
                .build())
        })
        .await?
    }

    /// A graph is already in hand, so a failed cache write only warns
    async fn persist(&self, bytes: Bytes) {
        if let Err(e) = self.cache.write(bytes).await {
            warn!("Failed to cache ontology source at {}: {}", self.cache.path().display(), e);
        }
    }

    fn unavailable(&self, reason: LoadError) -> LoadError {
        match reason {
            LoadError::SourceUnavailable { .. } => reason,
            other => LoadError::SourceUnavailable {
                source_ref: self.fetcher.source_ref(),
                reason: other.to_string(),
            },
        }
    }
}
