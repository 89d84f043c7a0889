//! Headline search against NewsAPI `/v2/everything`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::data_source::SourceError;
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::UtcDateTime;

const EVERYTHING_ENDPOINT: &str = "https://newsapi.org/v2/everything";

/// Query used when the caller supplies none.
pub const DEFAULT_QUERY: &str = "investing";

/// Most articles returned by one fetch.
pub const MAX_ARTICLES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewsArticle {
    pub title: String,
    pub description: Option<String>,
    pub published_at: UtcDateTime,
    pub url: String,
}

#[derive(Clone)]
pub struct NewsClient {
    http_client: Arc<dyn HttpClient>,
    api_key: String,
}

impl NewsClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()), api_key)
    }

    pub fn with_http_client(http_client: Arc<dyn HttpClient>, api_key: impl Into<String>) -> Self {
        Self {
            http_client,
            api_key: api_key.into(),
        }
    }

    /// Up to [`MAX_ARTICLES`] articles for `query`, newest first.
    ///
    /// Any failure is logged and yields an empty list.
    pub async fn fetch(&self, query: &str) -> Vec<NewsArticle> {
        match self.try_fetch(query).await {
            Ok(articles) => articles,
            Err(error) => {
                warn!(query, error = %error, "news fetch failed");
                Vec::new()
            }
        }
    }

    /// Like [`NewsClient::fetch`] but surfaces the failure.
    pub async fn try_fetch(&self, query: &str) -> Result<Vec<NewsArticle>, SourceError> {
        let query = match query.trim() {
            "" => DEFAULT_QUERY,
            trimmed => trimmed,
        };
        let endpoint = format!(
            "{EVERYTHING_ENDPOINT}?q={}&sortBy=publishedAt&language=en&pageSize=20",
            urlencoding::encode(query)
        );

        let request = HttpRequest::get(endpoint)
            .with_header("x-api-key", self.api_key.as_str())
            .with_timeout_ms(10_000);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| {
                SourceError::transport(format!("newsapi transport error: {}", e.message()))
            })?;

        // NewsAPI sends a JSON error envelope with non-2xx statuses too.
        let payload: EverythingResponse = serde_json::from_str(&response.body).map_err(|e| {
            if response.is_success() {
                SourceError::malformed(format!("failed to parse newsapi response: {e}"))
            } else {
                SourceError::transport(format!("newsapi returned status {}", response.status))
            }
        })?;

        if payload.status != "ok" || !response.is_success() {
            return Err(SourceError::invalid_request(format!(
                "newsapi error {}: {}",
                payload.code.as_deref().unwrap_or("unknown"),
                payload.message.as_deref().unwrap_or("no message"),
            )));
        }

        let total = payload.articles.len();
        let mut articles = payload
            .articles
            .into_iter()
            .filter_map(RawArticle::into_article)
            .collect::<Vec<_>>();

        articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        articles.truncate(MAX_ARTICLES);
        debug!(query, total, returned = articles.len(), "news fetched");

        Ok(articles)
    }
}

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    status: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArticle {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    published_at: Option<String>,
}

impl RawArticle {
    fn into_article(self) -> Option<NewsArticle> {
        let published_at = UtcDateTime::coerce(self.published_at.as_deref()?).ok()?;
        Some(NewsArticle {
            title: self.title.filter(|title| !title.trim().is_empty())?,
            description: self.description.filter(|text| !text.trim().is_empty()),
            published_at,
            url: self.url?,
        })
    }
}
