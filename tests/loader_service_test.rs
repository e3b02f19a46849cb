use async_trait::async_trait;
use bytes::Bytes;
use phenograph::loader::{LoadError, LoadResult, SourceCache, SourceFetcher, SourceLoader};
use phenograph::{EngineConfig, OntologyService};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const MINI_HP: &str = include_str!("fixtures/mini_hp.obo");

/// In-memory fetcher that counts calls and can be slow or broken
struct FakeFetcher {
    body: Option<&'static str>,
    delay: Duration,
    calls: AtomicUsize,
}

impl FakeFetcher {
    fn serving(body: &'static str) -> Arc<Self> {
        Arc::new(Self {
            body: Some(body),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
    }

    fn slow(body: Option<&'static str>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            body,
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceFetcher for FakeFetcher {
    fn source_ref(&self) -> String {
        "memory://hp.obo".to_string()
    }

    async fn fetch(&self) -> LoadResult<Bytes> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match self.body {
            Some(body) => Ok(Bytes::from_static(body.as_bytes())),
            None => Err(LoadError::Http("503 Service Unavailable".to_string())),
        }
    }
}

fn service(
    fetcher: Arc<FakeFetcher>,
    dir: &tempfile::TempDir,
    timeout: Duration,
) -> OntologyService {
    let loader = SourceLoader::new(
        fetcher,
        SourceCache::new(dir.path().join("ontologies/hp.obo")),
        timeout,
        "HP:0000118",
    );
    OntologyService::new(loader)
}

#[tokio::test]
async fn test_concurrent_first_calls_load_once() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = FakeFetcher::slow(Some(MINI_HP), Duration::from_millis(50));
    let service = service(fetcher.clone(), &dir, Duration::from_secs(5));

    let results = futures::future::join_all((0..8).map(|_| service.get())).await;

    assert_eq!(fetcher.calls(), 1);
    let first = results[0].as_ref().unwrap();
    for result in &results {
        assert!(Arc::ptr_eq(first, result.as_ref().unwrap()));
    }
    assert!(dir.path().join("ontologies/hp.obo").exists());

    // Later calls are served from memory
    service.get().await.unwrap();
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn test_concurrent_callers_share_failure() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = FakeFetcher::slow(None, Duration::from_millis(20));
    let service = service(fetcher.clone(), &dir, Duration::from_secs(5));

    let results = futures::future::join_all((0..4).map(|_| service.get())).await;

    assert_eq!(fetcher.calls(), 1);
    for result in results {
        assert!(matches!(result, Err(LoadError::SourceUnavailable { .. })));
    }
    assert!(service.current().is_none());

    // A fresh call after the failure tries again
    assert!(service.get().await.is_err());
    assert_eq!(fetcher.calls(), 2);
}

#[tokio::test]
async fn test_fetch_timeout_is_source_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = FakeFetcher::slow(Some(MINI_HP), Duration::from_secs(10));
    let service = service(fetcher, &dir, Duration::from_millis(50));

    match service.get().await {
        Err(LoadError::SourceUnavailable { reason, .. }) => assert!(reason.contains("timed out")),
        other => panic!("expected SourceUnavailable, got {:?}", other.map(|o| o.len())),
    }
    assert!(!dir.path().join("ontologies/hp.obo").exists());
}

#[tokio::test]
async fn test_cache_is_used_on_restart() {
    let dir = tempfile::tempdir().unwrap();
    let online = FakeFetcher::serving(MINI_HP);
    let first = service(online.clone(), &dir, Duration::from_secs(5));
    let version = first.get().await.unwrap().version().map(str::to_string);

    // Remote is down now, the cached copy still loads
    let offline = FakeFetcher::slow(None, Duration::ZERO);
    let second = service(offline.clone(), &dir, Duration::from_secs(5));
    let ontology = second.get().await.unwrap();

    assert_eq!(ontology.version().map(str::to_string), version);
    assert_eq!(offline.calls(), 0);
}

#[tokio::test]
async fn test_failed_refresh_keeps_current_graph() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ontologies/hp.obo");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, MINI_HP).unwrap();

    let fetcher = FakeFetcher::slow(None, Duration::ZERO);
    let service = service(fetcher, &dir, Duration::from_secs(5));
    let before = service.get().await.unwrap();

    let refreshed = service.refresh().await;
    assert!(matches!(refreshed, Err(LoadError::SourceUnavailable { .. })));
    assert!(Arc::ptr_eq(&before, &service.get().await.unwrap()));
}

#[tokio::test]
async fn test_service_from_local_path_config() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source.obo");
    std::fs::write(&source, MINI_HP).unwrap();

    let config = EngineConfig {
        source_url: source.display().to_string(),
        cache_path: dir.path().join("cache/hp.obo"),
        ..EngineConfig::default()
    };
    let service = OntologyService::from_config(&config).unwrap();
    let ontology = service.get().await.unwrap();

    assert_eq!(ontology.root().as_str(), "HP:0000118");
    assert_eq!(ontology.depth("HP:0001250"), Some(3));
    assert!(config.cache_path.exists());
}
