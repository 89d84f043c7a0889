//! Behavior tests for the news fetcher's degrade-to-empty contract.

mod support;

use std::sync::Arc;

use finlearn_core::http_client::{HttpError, HttpResponse, ScriptedHttpClient};
use finlearn_core::news::MAX_ARTICLES;
use finlearn_core::{NewsClient, SourceErrorKind};
use serde_json::json;
use support::NEWSAPI_HOST;

fn articles_payload(count: usize) -> String {
    let articles = (0..count)
        .map(|i| {
            json!({
                "source": { "id": null, "name": "Wire" },
                "title": format!("Headline {i}"),
                "description": "Markets moved.",
                "url": format!("https://news.example/{i}"),
                // Out of order on purpose; day 1..=count
                "publishedAt": format!("2024-01-{:02}T12:00:00Z", (i * 7) % count + 1),
            })
        })
        .collect::<Vec<_>>();
    json!({ "status": "ok", "totalResults": count, "articles": articles }).to_string()
}

#[tokio::test]
async fn when_api_key_is_malformed_fetch_returns_empty_list() {
    // Given: NewsAPI rejects the key
    let body = json!({
        "status": "error",
        "code": "apiKeyInvalid",
        "message": "Your API key is invalid or incorrect.",
    })
    .to_string();
    let client = Arc::new(
        ScriptedHttpClient::new().respond(NEWSAPI_HOST, HttpResponse::with_status(401, body)),
    );
    let news = NewsClient::with_http_client(client.clone(), "not-a-key");

    // When: headlines are fetched
    let articles = news.fetch("investing").await;

    // Then: no error escapes and the list is empty
    assert!(articles.is_empty());
    assert_eq!(client.request_count(), 1);

    // And: the underlying failure is still classifiable
    let error = news.try_fetch("investing").await.expect_err("rejected");
    assert_eq!(error.kind(), SourceErrorKind::InvalidRequest);
    assert!(error.message().contains("apiKeyInvalid"));
}

#[tokio::test]
async fn when_transport_fails_fetch_returns_empty_list() {
    let client = Arc::new(
        ScriptedHttpClient::new().fail(NEWSAPI_HOST, HttpError::new("request timeout")),
    );
    let news = NewsClient::with_http_client(client, "key");

    assert!(news.fetch("rates").await.is_empty());
}

#[tokio::test]
async fn results_are_capped_and_newest_first() {
    // Given: more dated articles than are shown, in arbitrary order
    let client = Arc::new(
        ScriptedHttpClient::new().respond(NEWSAPI_HOST, HttpResponse::ok_json(articles_payload(9))),
    );
    let news = NewsClient::with_http_client(client, "key");

    // When: headlines are fetched
    let articles = news.fetch("investing").await;

    // Then: at most five come back, most recent first
    assert_eq!(articles.len(), MAX_ARTICLES);
    assert_eq!(articles[0].published_at.format_date(), "2024-01-09");
    assert!(articles
        .windows(2)
        .all(|pair| pair[0].published_at > pair[1].published_at));
}
