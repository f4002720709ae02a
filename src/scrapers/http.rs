use crate::error::ScrapeError;
use crate::scrapers::traits::PageSource;
use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Fetches server-rendered listing pages with a plain GET
pub struct StaticPageSource {
    client: Client,
}

impl StaticPageSource {
    pub fn new(user_agent: &str) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for StaticPageSource {
    async fn fetch_html(&self, url: &str) -> Result<String, ScrapeError> {
        info!("Fetching URL: {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("{} returned status: {}", url, status);
            return Err(ScrapeError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let html = response.text().await?;
        debug!("Downloaded {} bytes of HTML", html.len());
        Ok(html)
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}

/// Re-reads a saved page snapshot instead of going to the network.
///
/// The URL argument is ignored; every fetch returns the same file.
pub struct FilePageSource {
    path: PathBuf,
}

impl FilePageSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PageSource for FilePageSource {
    async fn fetch_html(&self, url: &str) -> Result<String, ScrapeError> {
        info!("Reading saved page {} in place of {}", self.path.display(), url);
        Ok(tokio::fs::read_to_string(&self.path).await?)
    }

    fn source_name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_source_reads_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, "<html><body>saved</body></html>").unwrap();

        let source = FilePageSource::new(&path);
        let html = source.fetch_html("https://example.com").await.unwrap();
        assert!(html.contains("saved"));
    }

    #[tokio::test]
    async fn test_file_source_missing_file_is_io_error() {
        let source = FilePageSource::new("/nonexistent/page.html");
        let err = source.fetch_html("https://example.com").await.unwrap_err();
        assert!(matches!(err, ScrapeError::Io(_)));
    }

    #[test]
    fn test_static_source_builds() {
        let source = StaticPageSource::new("apartment-scout-test").unwrap();
        assert_eq!(source.source_name(), "http");
    }
}
