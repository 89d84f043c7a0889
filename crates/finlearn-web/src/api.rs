// =============================================================================
// JSON API: Axum 0.7
// =============================================================================
//
// Every endpoint is public and stateless; each request makes its own provider
// calls. Failures are returned as `{ "error": "..." }`.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use finlearn_core::chart::candlestick_figure;
use finlearn_core::{
    fetch_market_overview, ConfigError, Feature, FetchError, Interval, MarketDataFetcher,
    MarketOverview, NewsArticle, NewsClient, Period, Secrets, Symbol, ValidationError, Window,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Shared handler state.
pub struct AppState {
    pub fetcher: MarketDataFetcher,
    /// `None` when no news key is configured.
    pub news: Option<NewsClient>,
}

impl AppState {
    pub fn from_secrets(secrets: &Secrets) -> Self {
        Self {
            fetcher: MarketDataFetcher::from_secrets(secrets),
            news: secrets.api_key(Feature::News).map(NewsClient::new),
        }
    }
}

// =============================================================================
// Router construction
// =============================================================================

/// Build the API router with permissive CORS and request tracing.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/market-overview", get(market_overview))
        .route("/api/stocks/:ticker/chart", get(stock_chart))
        .route("/api/news", get(news))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    InvalidInput(#[from] ValidationError),
    #[error(transparent)]
    Unavailable(#[from] FetchError),
    #[error(transparent)]
    NotConfigured(#[from] ConfigError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::Unavailable(_) | Self::NotConfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            warn!(error = %self, "request failed");
        }
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

// =============================================================================
// Health
// =============================================================================

async fn health() -> Json<Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// =============================================================================
// Market overview (SPY, 1mo, daily)
// =============================================================================

async fn market_overview(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MarketOverview>, ApiError> {
    Ok(Json(fetch_market_overview(&state.fetcher).await?))
}

// =============================================================================
// Stock chart
// =============================================================================

#[derive(Debug, Deserialize)]
struct ChartParams {
    period: Option<String>,
    interval: Option<String>,
}

#[derive(Serialize)]
struct ChartResponse {
    symbol: String,
    provider: &'static str,
    interval: &'static str,
    figure: Value,
}

async fn stock_chart(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    Query(params): Query<ChartParams>,
) -> Result<Json<ChartResponse>, ApiError> {
    let symbol = Symbol::parse(&ticker)?;
    let period = params
        .period
        .as_deref()
        .map_or(Ok(Period::SevenDays), str::parse)?;
    let interval = params
        .interval
        .as_deref()
        .map_or(Ok(Interval::OneHour), str::parse)?;

    let series = state
        .fetcher
        .fetch(&symbol, Window::new(period, interval))
        .await?;

    Ok(Json(ChartResponse {
        symbol: series.symbol().to_string(),
        provider: series.provider().as_str(),
        interval: series.interval().as_str(),
        figure: candlestick_figure(&series),
    }))
}

// =============================================================================
// News
// =============================================================================

#[derive(Debug, Deserialize)]
struct NewsParams {
    q: Option<String>,
}

#[derive(Serialize)]
struct NewsResponse {
    articles: Vec<NewsArticle>,
}

async fn news(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NewsParams>,
) -> Result<Json<NewsResponse>, ApiError> {
    let Some(client) = &state.news else {
        return Err(ConfigError::Missing {
            feature: Feature::News,
            env_var: Feature::News.env_var(),
        }
        .into());
    };

    let articles = client.fetch(params.q.as_deref().unwrap_or_default()).await;
    Ok(Json(NewsResponse { articles }))
}
