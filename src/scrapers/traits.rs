use crate::error::ScrapeError;
use async_trait::async_trait;

/// Something that can hand back the final HTML of a listing page.
///
/// Implementations own whatever resources they need (a browser, an HTTP
/// client) and must release them before `fetch_html` returns.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Produce the listing page HTML for `url`.
    async fn fetch_html(&self, url: &str) -> Result<String, ScrapeError>;

    /// Get the name of the page source, for logs
    fn source_name(&self) -> &'static str;
}
