//! Remote and local source fetchers

use super::{LoadError, LoadResult};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Source of raw ontology bytes
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Locator used in logs and error messages
    fn source_ref(&self) -> String;

    /// Fetch the whole source
    async fn fetch(&self) -> LoadResult<Bytes>;
}

/// Fetches over HTTP(S)
pub struct HttpFetcher {
    url: String,
    client: Client,
}

impl HttpFetcher {
    pub fn new(url: impl Into<String>, timeout: Duration) -> LoadResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LoadError::Http(e.to_string()))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait]
impl SourceFetcher for HttpFetcher {
    fn source_ref(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> LoadResult<Bytes> {
        debug!("GET {}", self.url);
        let resp = self.client.get(&self.url).send().await?;

        if !resp.status().is_success() {
            return Err(LoadError::Http(format!(
                "{} returned status {}",
                self.url,
                resp.status()
            )));
        }

        Ok(resp.bytes().await?)
    }
}

/// Reads a local file, for sources given as a path or `file://` URL
pub struct FileFetcher {
    path: PathBuf,
}

impl FileFetcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SourceFetcher for FileFetcher {
    fn source_ref(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> LoadResult<Bytes> {
        let data = tokio::fs::read(&self.path).await?;
        Ok(Bytes::from(data))
    }
}

/// Pick a fetcher for a source locator
pub fn fetcher_for(source_ref: &str, timeout: Duration) -> LoadResult<Arc<dyn SourceFetcher>> {
    if source_ref.starts_with("http://") || source_ref.starts_with("https://") {
        Ok(Arc::new(HttpFetcher::new(source_ref, timeout)?))
    } else {
        let path = source_ref.strip_prefix("file://").unwrap_or(source_ref);
        Ok(Arc::new(FileFetcher::new(path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_file_fetcher() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"format-version: 1.2\n").unwrap();

        let fetcher = FileFetcher::new(file.path());
        let bytes = fetcher.fetch().await.unwrap();
        assert_eq!(&bytes[..], b"format-version: 1.2\n");
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let fetcher = FileFetcher::new("/nonexistent/phenograph/hp.obo");
        assert!(matches!(fetcher.fetch().await, Err(LoadError::Io(_))));
    }

    #[test]
    fn test_fetcher_for_selects_by_scheme() {
        let timeout = Duration::from_secs(1);
        let http = fetcher_for("https://example.org/hp.obo", timeout).unwrap();
        assert_eq!(http.source_ref(), "https://example.org/hp.obo");

        let file = fetcher_for("file:///tmp/hp.obo", timeout).unwrap();
        assert_eq!(file.source_ref(), "/tmp/hp.obo");
    }
}
