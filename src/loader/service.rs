//! Process-wide ontology service
//!
//! Owns the current graph and single-flights every (re)load: while one load
//! runs, other callers wait on the load lock and then share its outcome,
//! success or failure, instead of fetching again.

use super::{LoadError, LoadResult, Refreshed, SourceLoader};
use crate::config::EngineConfig;
use crate::ontology::Ontology;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Outcome of [`OntologyService::refresh`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RefreshOutcome {
    /// Source version matches the loaded graph; nothing replaced
    Unchanged { version: String },
    /// A new graph was built and swapped in
    Updated {
        previous: Option<String>,
        current: Option<String>,
    },
}

#[derive(Default)]
struct LoadState {
    last_error: Option<LoadError>,
}

/// Holds the shared graph and guards its construction
pub struct OntologyService {
    loader: SourceLoader,
    current: RwLock<Option<Arc<Ontology>>>,
    load_lock: Mutex<LoadState>,
    /// Completed load attempts; lets waiters tell that a load finished while they queued
    completed: AtomicU64,
}

impl OntologyService {
    pub fn new(loader: SourceLoader) -> Self {
        Self {
            loader,
            current: RwLock::new(None),
            load_lock: Mutex::new(LoadState::default()),
            completed: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &EngineConfig) -> LoadResult<Self> {
        Ok(Self::new(SourceLoader::from_config(config)?))
    }

    pub fn loader(&self) -> &SourceLoader {
        &self.loader
    }

    /// Currently loaded graph, without triggering a load
    pub fn current(&self) -> Option<Arc<Ontology>> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// The graph, loading it on first use. Concurrent first callers trigger
    /// exactly one load.
    pub async fn get(&self) -> LoadResult<Arc<Ontology>> {
        if let Some(ontology) = self.current() {
            return Ok(ontology);
        }

        let seen = self.completed.load(Ordering::SeqCst);
        let mut state = self.load_lock.lock().await;

        if let Some(ontology) = self.current() {
            return Ok(ontology);
        }
        // A load finished while we queued and it failed: share that failure
        if self.completed.load(Ordering::SeqCst) != seen {
            if let Some(err) = state.last_error.clone() {
                return Err(err);
            }
        }

        let result = self.loader.load().await;
        self.completed.fetch_add(1, Ordering::SeqCst);

        match result {
            Ok(ontology) => {
                let ontology = Arc::new(ontology);
                self.install(ontology.clone());
                state.last_error = None;
                Ok(ontology)
            }
            Err(e) => {
                warn!("Ontology load failed: {}", e);
                state.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Re-check the source and swap in a new graph when its version changed.
    /// On failure the current graph stays in place.
    pub async fn refresh(&self) -> LoadResult<RefreshOutcome> {
        let mut state = self.load_lock.lock().await;
        let previous = self.current();
        let previous_version = previous.as_ref().and_then(|o| o.version().map(str::to_string));

        let refreshed = self.loader.refresh(previous_version.as_deref()).await;
        self.completed.fetch_add(1, Ordering::SeqCst);

        match refreshed {
            Ok(Refreshed::Unchanged { version }) => Ok(RefreshOutcome::Unchanged { version }),
            Ok(Refreshed::Updated(ontology)) => {
                let current = ontology.version().map(str::to_string);
                info!(
                    "Ontology refreshed: {} -> {}",
                    previous_version.as_deref().unwrap_or("none"),
                    current.as_deref().unwrap_or("none")
                );
                self.install(Arc::new(ontology));
                state.last_error = None;
                Ok(RefreshOutcome::Updated {
                    previous: previous_version,
                    current,
                })
            }
            Err(e) => {
                warn!("Ontology refresh failed, keeping the current graph: {}", e);
                if previous.is_none() {
                    state.last_error = Some(e.clone());
                }
                Err(e)
            }
        }
    }

    fn install(&self, ontology: Arc<Ontology>) {
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = Some(ontology);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{SourceCache, SourceFetcher};
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::time::Duration;

    struct Versioned(std::sync::Mutex<&'static str>);

    #[async_trait]
    impl SourceFetcher for Versioned {
        fn source_ref(&self) -> String {
            "memory://versioned".to_string()
        }

        async fn fetch(&self) -> LoadResult<Bytes> {
            let text = *self.0.lock().unwrap();
            Ok(Bytes::from_static(text.as_bytes()))
        }
    }

    const V1: &str = "data-version: v1\n\n[Term]\nid: R:1\n";
    const V2: &str = "data-version: v2\n\n[Term]\nid: R:1\n\n[Term]\nid: R:2\nis_a: R:1\n";

    #[tokio::test]
    async fn test_refresh_swaps_only_on_version_change() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(Versioned(std::sync::Mutex::new(V1)));
        let loader = SourceLoader::new(
            fetcher.clone(),
            SourceCache::new(dir.path().join("hp.obo")),
            Duration::from_secs(5),
            "R:1",
        );
        let service = OntologyService::new(loader);

        let first = service.get().await.unwrap();
        assert_eq!(first.version(), Some("v1"));

        let outcome = service.refresh().await.unwrap();
        assert_eq!(outcome, RefreshOutcome::Unchanged { version: "v1".to_string() });
        assert!(Arc::ptr_eq(&first, &service.current().unwrap()));

        *fetcher.0.lock().unwrap() = V2;
        let outcome = service.refresh().await.unwrap();
        assert_eq!(
            outcome,
            RefreshOutcome::Updated {
                previous: Some("v1".to_string()),
                current: Some("v2".to_string()),
            }
        );
        let second = service.get().await.unwrap();
        assert_eq!(second.len(), 2);
        // Old snapshot is still intact for whoever holds it
        assert_eq!(first.len(), 1);
        assert_eq!(service.loader().cache().version().await.as_deref(), Some("v2"));
    }
}
