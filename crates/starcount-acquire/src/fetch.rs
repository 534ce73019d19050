use crate::error::{FetchError, PipelineError};
use crate::normalize::normalize_count;
use scraper::{Html, Selector};
use starcount_model::STARS_UNKNOWN;
use std::future::Future;
use std::time::Duration;

/// Selector of the star counter on a GitHub repository page.
pub const DEFAULT_STAR_SELECTOR: &str = "#repo-stars-counter-star";

/// Something that can return the body of a project page.
pub trait PageSource {
    fn fetch_page(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Fetches pages over HTTP, one GET per call, no retries.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, PipelineError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(PipelineError::Client)?;
        Ok(Self { client })
    }
}

impl PageSource for HttpSource {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;

        // The body is parsed whatever the status; an error page simply has no widget.
        tracing::debug!(url = %url, status = %response.status(), "Received response");

        Ok(response.text().await?)
    }
}

/// Locates the star counter element in a page.
#[derive(Debug, Clone)]
pub struct StarWidget {
    selector: Selector,
}

impl StarWidget {
    pub fn new(selector: &str) -> Result<Self, PipelineError> {
        let parsed = Selector::parse(selector).map_err(|e| PipelineError::Selector {
            selector: selector.to_string(),
            reason: format!("{e:?}"),
        })?;
        Ok(Self { selector: parsed })
    }

    /// Trimmed text of the first matching element, or `None` if the page has none.
    pub fn extract(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        document
            .select(&self.selector)
            .next()
            .map(|element| element.text().collect::<String>().trim().to_string())
    }
}

/// Outcome of a successful page fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarCount {
    Counted(i64),
    /// The page had no star counter element.
    WidgetMissing,
}

impl StarCount {
    /// Value stored on the entry.
    pub fn value(self) -> i64 {
        match self {
            StarCount::Counted(n) => n,
            StarCount::WidgetMissing => STARS_UNKNOWN,
        }
    }
}

/// Fetch `url`, pull out the star counter text and normalize it.
pub async fn fetch_count<S: PageSource>(
    source: &S,
    widget: &StarWidget,
    url: &str,
) -> Result<StarCount, FetchError> {
    let html = source.fetch_page(url).await?;
    tracing::debug!(url = %url, bytes = html.len(), "Received HTML");

    match widget.extract(&html) {
        // Only empty text maps to the sentinel; a parsed negative count is rejected.
        Some(text) => match normalize_count(&text)? {
            count if count < 0 && !text.is_empty() => {
                Err(FetchError::NegativeCount { text, count })
            }
            count => Ok(StarCount::Counted(count)),
        },
        None => {
            tracing::warn!(url = %url, "Star counter widget not found");
            Ok(StarCount::WidgetMissing)
        }
    }
}
